//! Model parser: load math model documents into [`MathModelConfig`]
//!
//! Documents are JSON or YAML. Every configuration invariant the engine
//! relies on is checked here, so a model that loads never fails at spin time.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let parser = ModelParser::new();
//! let model = parser.load_file("models/lair_of_riches.json")?;
//! ```

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::{BetLimits, FeatureDefinition, MathModelConfig};
use crate::duel::DuelTables;
use crate::error::ModelError;
use crate::paytable::{PayTable, Payline};
use crate::symbols::{ReelSet, SymbolDef, SymbolId, SymbolKind};
use crate::weighted::WeightTable;

/// Model parser
pub struct ModelParser {
    /// Validation limits
    pub limits: ModelLimits,
}

/// Size limits for model documents
#[derive(Debug, Clone)]
pub struct ModelLimits {
    pub max_name_length: usize,
    pub max_symbols: usize,
    pub max_paylines: usize,
    pub max_reels: usize,
    pub max_rows: usize,
    pub max_strip_length: usize,
}

impl Default for ModelLimits {
    fn default() -> Self {
        Self {
            max_name_length: 256,
            max_symbols: 64,
            max_paylines: 100,
            max_reels: 10,
            max_rows: 10,
            max_strip_length: 10_000,
        }
    }
}

impl ModelParser {
    pub fn new() -> Self {
        Self {
            limits: ModelLimits::default(),
        }
    }

    pub fn with_limits(limits: ModelLimits) -> Self {
        Self { limits }
    }

    pub fn parse_json(&self, json: &str) -> Result<MathModelConfig, ModelError> {
        let doc: ModelDocument = serde_json::from_str(json)?;
        self.build(doc)
    }

    pub fn parse_yaml(&self, yaml: &str) -> Result<MathModelConfig, ModelError> {
        let doc: ModelDocument = serde_yml::from_str(yaml)?;
        self.build(doc)
    }

    /// Load a `.json`, `.yaml` or `.yml` model file
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<MathModelConfig, ModelError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "json" => self.parse_json(&text),
            "yaml" | "yml" => self.parse_yaml(&text),
            other => Err(ModelError::UnsupportedFormat(other.to_string())),
        }
    }

    fn build(&self, doc: ModelDocument) -> Result<MathModelConfig, ModelError> {
        self.validate(&doc)?;
        let model = self.to_model(doc)?;
        info!(
            "Loaded model '{}': {} reel sets, {} paylines, {} features",
            model.name,
            model.reel_sets.len(),
            model.paylines.len(),
            model.features.len()
        );
        Ok(model)
    }

    /// Validate a model document
    pub fn validate(&self, doc: &ModelDocument) -> Result<(), ModelError> {
        let invalid = |msg: String| Err(ModelError::Validation(msg));

        if doc.name.len() > self.limits.max_name_length {
            return invalid(format!(
                "Model name too long: {} > {}",
                doc.name.len(),
                self.limits.max_name_length
            ));
        }
        if doc.min_bet == 0 || doc.min_bet > doc.max_bet {
            return invalid(format!(
                "Invalid bet limits: [{}, {}]",
                doc.min_bet, doc.max_bet
            ));
        }
        if doc.base_bet == 0 {
            return invalid("Base bet must be positive".into());
        }
        if let Some(cap) = doc.max_win_cap_multiplier {
            if !cap.is_finite() || cap <= 0.0 {
                return invalid(format!("Invalid win cap multiplier: {cap}"));
            }
        }

        // Symbols
        if doc.symbols.is_empty() || doc.symbols.len() > self.limits.max_symbols {
            return invalid(format!("Symbol count out of range: {}", doc.symbols.len()));
        }
        for (i, sym) in doc.symbols.iter().enumerate() {
            if doc.symbols[..i].iter().any(|s| s.id == sym.id) {
                return invalid(format!("Duplicate symbol id: {}", sym.id));
            }
            if sym.pays.values().any(|p| !p.is_finite() || *p < 0.0) {
                return invalid(format!("Invalid pay on symbol {}", sym.id));
            }
        }
        let kind_count = |kind: SymbolKind| doc.symbols.iter().filter(|s| s.kind == kind).count();
        if kind_count(SymbolKind::Wild) != 1 {
            return invalid("Exactly one wild symbol is required".into());
        }
        if kind_count(SymbolKind::Scatter) > 1 {
            return invalid("At most one scatter symbol is allowed".into());
        }
        if kind_count(SymbolKind::Expanding) > 1 {
            return invalid("At most one expanding symbol is allowed".into());
        }
        let defined = |id: SymbolId| doc.symbols.iter().any(|s| s.id == id);

        // Reel sets
        if doc.reel_sets.is_empty() {
            return invalid("No reel sets defined".into());
        }
        let columns = doc.reel_sets[0].reels.len();
        let rows = doc.reel_sets[0].rows_visible;
        if columns == 0 || columns > self.limits.max_reels {
            return invalid(format!("Reel count out of range: {columns}"));
        }
        if rows == 0 || rows > self.limits.max_rows {
            return invalid(format!("Visible rows out of range: {rows}"));
        }
        for (i, rs) in doc.reel_sets.iter().enumerate() {
            if doc.reel_sets[..i].iter().any(|other| other.id == rs.id) {
                return invalid(format!("Duplicate reel set id: {}", rs.id));
            }
            if rs.reels.len() != columns || rs.rows_visible != rows {
                return invalid(format!(
                    "Reel set '{}' is {}x{}, expected {}x{}",
                    rs.id,
                    rs.reels.len(),
                    rs.rows_visible,
                    columns,
                    rows
                ));
            }
            for (col, strip) in rs.reels.iter().enumerate() {
                if strip.is_empty() || strip.len() > self.limits.max_strip_length {
                    return invalid(format!(
                        "Reel set '{}' strip {} length out of range: {}",
                        rs.id,
                        col,
                        strip.len()
                    ));
                }
                if let Some(bad) = strip.iter().find(|&&s| !defined(s)) {
                    return invalid(format!(
                        "Reel set '{}' strip {} uses undefined symbol {}",
                        rs.id, col, bad
                    ));
                }
            }
        }
        for id in [&doc.base_reel_set, &doc.boost_reel_set, &doc.bonus_reel_set] {
            if !doc.reel_sets.iter().any(|rs| &rs.id == id) {
                return invalid(format!("Reel set '{id}' is not defined"));
            }
        }

        // Paylines
        if doc.paylines.is_empty() || doc.paylines.len() > self.limits.max_paylines {
            return invalid(format!("Payline count out of range: {}", doc.paylines.len()));
        }
        for (i, line) in doc.paylines.iter().enumerate() {
            if line.len() != columns || line.iter().any(|&r| r >= rows) {
                return invalid(format!("Payline {} does not fit a {columns}x{rows} grid", i + 1));
            }
        }

        // Features
        if doc.scatter_trigger_count == 0 {
            return invalid("Scatter trigger count must be positive".into());
        }
        for feature in &doc.features {
            if !defined(feature.trigger.symbol) {
                return invalid(format!(
                    "Feature '{}' triggers on undefined symbol {}",
                    feature.id, feature.trigger.symbol
                ));
            }
            if feature.guaranteed_wild_columns() > columns {
                return invalid(format!(
                    "Feature '{}' guarantees more wild columns than reels",
                    feature.id
                ));
            }
        }

        // Duel tables
        for (name, table) in [("base", &doc.duel.base), ("bonus", &doc.duel.bonus)] {
            if table.multipliers.len() != table.weights.len() {
                return invalid(format!("Duel table '{name}' is not parallel"));
            }
            if table.multipliers.contains(&0) {
                return invalid(format!("Duel table '{name}' has a zero multiplier"));
            }
        }

        Ok(())
    }

    fn to_model(&self, doc: ModelDocument) -> Result<MathModelConfig, ModelError> {
        let paytable = PayTable::new(doc.symbols, doc.base_bet)
            .ok_or_else(|| ModelError::Validation("No wild symbol".into()))?;

        let rows = doc.reel_sets[0].rows_visible;
        let paylines = doc
            .paylines
            .iter()
            .enumerate()
            .map(|(i, shape)| Payline::from_rows(i, shape, rows))
            .collect();

        let reel_sets = doc
            .reel_sets
            .into_iter()
            .map(|rs| ReelSet {
                ways: rs.ways,
                ..ReelSet::from_symbols(rs.id, rs.rows_visible, rs.reels)
            })
            .collect();

        let duel = DuelTables {
            base: doc.duel.base.into_table("base")?,
            bonus: doc.duel.bonus.into_table("bonus")?,
        };

        Ok(MathModelConfig {
            name: doc.name,
            denomination: doc.denomination,
            bets: BetLimits {
                min: doc.min_bet,
                max: doc.max_bet,
            },
            max_win_cap_multiplier: doc.max_win_cap_multiplier,
            paytable,
            paylines,
            reel_sets,
            base_reel_set: doc.base_reel_set,
            boost_reel_set: doc.boost_reel_set,
            bonus_reel_set: doc.bonus_reel_set,
            scatter_trigger_count: doc.scatter_trigger_count,
            features: doc.features,
            duel,
        })
    }
}

impl Default for ModelParser {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DOCUMENT
// ═══════════════════════════════════════════════════════════════════════════════

/// Model document structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDocument {
    pub name: String,
    #[serde(default = "default_denomination")]
    pub denomination: u32,
    pub min_bet: u64,
    pub max_bet: u64,
    #[serde(default)]
    pub max_win_cap_multiplier: Option<f64>,
    /// Bet the paytable is calibrated at
    #[serde(default = "default_base_bet")]
    pub base_bet: u64,
    pub symbols: Vec<SymbolDef>,
    /// Row index per column, one entry per payline
    pub paylines: Vec<Vec<usize>>,
    pub reel_sets: Vec<ReelSetDocument>,
    #[serde(default = "default_base_reel_set")]
    pub base_reel_set: String,
    #[serde(default = "default_boost_reel_set")]
    pub boost_reel_set: String,
    #[serde(default = "default_bonus_reel_set")]
    pub bonus_reel_set: String,
    #[serde(default = "default_scatter_trigger")]
    pub scatter_trigger_count: usize,
    #[serde(default)]
    pub features: Vec<FeatureDefinition>,
    pub duel: DuelDocument,
}

fn default_denomination() -> u32 {
    1
}

fn default_base_bet() -> u64 {
    10
}

fn default_base_reel_set() -> String {
    "default".to_string()
}

fn default_boost_reel_set() -> String {
    "default_boost".to_string()
}

fn default_bonus_reel_set() -> String {
    "bonus".to_string()
}

fn default_scatter_trigger() -> usize {
    3
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReelSetDocument {
    pub id: String,
    pub rows_visible: usize,
    #[serde(default)]
    pub ways: bool,
    pub reels: Vec<Vec<SymbolId>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuelDocument {
    pub base: DuelTableDocument,
    pub bonus: DuelTableDocument,
}

/// Multipliers with float weights, scaled to integers at load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuelTableDocument {
    pub multipliers: Vec<u32>,
    pub weights: Vec<f64>,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl DuelTableDocument {
    fn into_table(self, name: &str) -> Result<WeightTable, ModelError> {
        let table = WeightTable::scaled(self.multipliers, &self.weights, self.scale)?;
        // the decoy draw excludes the winner and needs something left
        if table.distinct_values() < 2 {
            return Err(ModelError::Validation(format!(
                "Duel table '{name}' needs at least two distinct multipliers"
            )));
        }
        if let Some(winner) = table
            .drawable_values()
            .into_iter()
            .find(|&v| table.weight_excluding(v) == 0)
        {
            return Err(ModelError::Validation(format!(
                "Duel table '{name}' leaves no decoy weight when {winner} wins"
            )));
        }
        Ok(table)
    }
}
