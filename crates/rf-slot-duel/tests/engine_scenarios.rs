//! End-to-end spin scenarios against small hand-built models

use approx::assert_relative_eq;
use serde_json::{Value, json};

use rf_slot_duel::{
    DuelSlotEngine, EngineError, ModelParser, SpinMode, SpinRequest, build_grid,
};

const FLAT_LINE: [usize; 5] = [0, 0, 0, 0, 0];

fn document(base: Vec<Vec<u32>>, bonus: Vec<Vec<u32>>, cap: Option<f64>) -> Value {
    json!({
        "name": "scenario",
        "min_bet": 10,
        "max_bet": 1000,
        "max_win_cap_multiplier": cap,
        "symbols": [
            {"id": 0, "name": "wild", "kind": "wild", "pays": {"5": 100}},
            {"id": 1, "name": "scatter", "kind": "scatter"},
            {"id": 2, "name": "ace", "kind": "low", "pays": {"3": 1, "4": 5, "5": 10}},
            {"id": 3, "name": "king", "kind": "low", "pays": {"3": 1, "4": 5, "5": 10}},
            {"id": 4, "name": "deer", "kind": "high", "pays": {"3": 20, "4": 50, "5": 100}},
            {"id": 8, "name": "expanding", "kind": "expanding", "pays": {"3": 10, "4": 30, "5": 60}}
        ],
        "paylines": [FLAT_LINE],
        "reel_sets": [
            {"id": "default", "rows_visible": 5, "reels": base.clone()},
            {"id": "default_boost", "rows_visible": 5, "reels": base},
            {"id": "bonus", "rows_visible": 5, "reels": bonus}
        ],
        "features": [
            {"id": "fs_3", "kind": "free_spins", "trigger": {"symbol": 1, "min": 3}, "payload": {"spins": 10}},
            {"id": "fs_4", "kind": "free_spins", "trigger": {"symbol": 1, "min": 4},
             "payload": {"guaranteed_wild_columns": 1}}
        ],
        "duel": {
            "base": {"multipliers": [5, 3], "weights": [1, 1]},
            "bonus": {"multipliers": [5, 3], "weights": [1, 1]}
        }
    })
}

fn engine(doc: Value) -> DuelSlotEngine {
    let model = ModelParser::new().parse_json(&doc.to_string()).unwrap();
    DuelSlotEngine::new(model)
}

/// Constant strips: every stop shows the same column
fn constant(columns: &[u32]) -> Vec<Vec<u32>> {
    columns.iter().map(|&s| vec![s]).collect()
}

fn quiet_bonus() -> Vec<Vec<u32>> {
    vec![vec![2, 3, 4, 8, 3, 2, 4, 3, 2, 4]; 5]
}

#[test]
fn test_bet_out_of_range_is_rejected() {
    let engine = engine(document(constant(&[2, 2, 2, 3, 4]), quiet_bonus(), None));
    let err = engine.spin(&SpinRequest::new(5)).unwrap_err();
    assert_eq!(
        err,
        EngineError::BetOutOfRange {
            bet: 5,
            min: 10,
            max: 1000
        }
    );
    assert!(engine.spin(&SpinRequest::new(1001)).is_err());
}

#[test]
fn test_three_low_symbols_on_first_line() {
    let engine = engine(document(constant(&[2, 2, 2, 3, 4]), quiet_bonus(), None));
    let result = engine.spin(&SpinRequest::new(10)).unwrap();

    assert!(result.win);
    assert_eq!(result.details.len(), 1);
    let win = &result.details[0];
    assert_eq!(win.symbol, 2);
    let line = &win.matches[0];
    assert_eq!(line.line_index, 1);
    assert_eq!(line.count, 3);
    assert_eq!(line.positions, vec![(0, 0), (0, 1), (0, 2)]);
    assert_relative_eq!(line.payout, 1.0);
    assert_eq!(line.multiplier, 1);
    assert_relative_eq!(result.payout, 1.0);
    assert!(result.wild_positions.is_empty());
}

#[test]
fn test_unit_stake_scales_with_bet() {
    let engine = engine(document(constant(&[2, 2, 2, 3, 4]), quiet_bonus(), None));
    let result = engine.spin(&SpinRequest::new(50)).unwrap();
    assert_relative_eq!(result.payout, 5.0);
}

#[test]
fn test_two_symbol_run_never_pays() {
    let engine = engine(document(constant(&[2, 0, 3, 3, 4]), quiet_bonus(), None));
    let result = engine.spin(&SpinRequest::new(10)).unwrap();
    assert!(!result.win);
    assert!(result.details.is_empty());
    assert_eq!(result.payout, 0.0);
}

#[test]
fn test_expanding_column_applies_duel_winner() {
    let engine = engine(document(constant(&[2, 2, 8, 3, 4]), quiet_bonus(), None));
    for i in 0..20 {
        let result = engine
            .spin(&SpinRequest::new(10).with_seed(format!("duel-{i}")))
            .unwrap();
        assert_eq!(result.wild_positions.len(), 1);
        let wild = result.wild_positions[0];
        assert_eq!(wild.column, 2);
        let [winner, decoy] = wild.multiplier;
        assert_ne!(winner, decoy);

        let line = &result.details[0].matches[0];
        assert_eq!(line.count, 3);
        assert_eq!(line.multiplier, winner);
        assert_relative_eq!(result.payout, f64::from(winner));
        // column 2 is evaluated as wild on every row
        assert!((0..5).all(|row| result.grid.get(row, 2) == 0));
    }
}

#[test]
fn test_win_cap_clamps_payout() {
    let engine = engine(document(constant(&[2, 2, 2, 2, 2]), quiet_bonus(), Some(0.5)));
    let result = engine.spin(&SpinRequest::new(10)).unwrap();
    assert!(result.win);
    assert_relative_eq!(result.details[0].total_payout, 10.0);
    assert_relative_eq!(result.payout, 5.0);
    assert!(result.capped);
}

#[test]
fn test_four_scatters_trigger_wild_guaranteed_free_spins() {
    let engine = engine(document(constant(&[1, 1, 1, 1, 2]), quiet_bonus(), Some(15_000.0)));
    let result = engine
        .spin(&SpinRequest::new(10).with_seed("fs4"))
        .unwrap();

    assert_eq!(result.scatter_counts, 20);
    assert!(!result.win);
    let feature = result.feature.as_ref().unwrap();
    assert_eq!(feature.id, "fs_4");
    assert_eq!(feature.spins, 10);
    assert_eq!(feature.guaranteed_wild_columns, 1);
    assert_eq!(result.bonus_rounds.len(), 10);

    let mut total = 0.0;
    for round in &result.bonus_rounds {
        assert_eq!(round.reel_set_id, "bonus");
        let wild_column = (0..5).any(|c| (0..5).all(|r| round.grid.get(r, c) == 0));
        assert!(wild_column);
        total += round.payout;
    }
    assert_relative_eq!(result.payout, total);
}

#[test]
fn test_three_scatters_select_base_feature() {
    let engine = engine(document(constant(&[1, 1, 2, 3, 3]), quiet_bonus(), None));
    // 10 scatters on the grid still pick the highest reachable tier
    let result = engine.spin(&SpinRequest::new(10)).unwrap();
    assert_eq!(result.feature.as_ref().unwrap().id, "fs_4");

    // one scatter on each of the first three columns
    let lone = vec![1, 2, 2, 2, 2];
    let plain = vec![2, 3, 2, 3, 2];
    let base = vec![lone.clone(), lone.clone(), lone, plain.clone(), plain];
    let result = self::engine(document(base, quiet_bonus(), None))
        .spin(&SpinRequest::new(10))
        .unwrap();
    assert_eq!(result.scatter_counts, 3);
    let feature = result.feature.as_ref().unwrap();
    assert_eq!(feature.id, "fs_3");
    assert_eq!(feature.guaranteed_wild_columns, 0);
    assert_eq!(result.bonus_rounds.len(), 10);
}

#[test]
fn test_four_scatters_default_to_single_wild_guarantee() {
    // fs_3 is the only tier and leaves the guarantee unset
    let mut doc = document(constant(&[1, 1, 1, 1, 2]), quiet_bonus(), None);
    doc["features"].as_array_mut().unwrap().remove(1);
    let result = self::engine(doc)
        .spin(&SpinRequest::new(10).with_seed("fs3-wide"))
        .unwrap();

    assert_eq!(result.scatter_counts, 20);
    let feature = result.feature.as_ref().unwrap();
    assert_eq!(feature.id, "fs_3");
    assert_eq!(feature.guaranteed_wild_columns, 1);
    assert_eq!(result.bonus_rounds.len(), 10);
    for round in &result.bonus_rounds {
        let wild_column = (0..5).any(|c| (0..5).all(|r| round.grid.get(r, c) == 0));
        assert!(wild_column);
    }
}

#[test]
fn test_win_cap_stops_free_spins_early() {
    let engine = engine(document(
        constant(&[1, 1, 1, 1, 2]),
        constant(&[4, 4, 4, 4, 4]),
        Some(25.0),
    ));
    let result = engine.spin(&SpinRequest::new(10)).unwrap();

    // each free spin pays 100 against a 250 cap
    assert_eq!(result.bonus_rounds.len(), 3);
    for round in &result.bonus_rounds {
        assert_relative_eq!(round.payout, 100.0);
    }
    assert_relative_eq!(result.payout, 250.0);
    assert!(result.capped);
}

#[test]
fn test_bonus_buy_places_requested_scatters() {
    let engine = DuelSlotEngine::lair_of_riches().unwrap();
    let bonus = engine.model().reel_set("bonus").unwrap();
    for (mode, required) in [(SpinMode::Bonus3, 3), (SpinMode::Bonus4, 4)] {
        for i in 0..25 {
            let result = engine
                .spin(&SpinRequest::new(10).with_mode(mode).with_seed(format!("{required}-{i}")))
                .unwrap();
            let raw = build_grid(bonus, &result.stop_index);
            assert!(raw.count(1) >= 3);
            assert_eq!(raw.columns_containing(1).len(), required);
        }
    }
}

#[test]
fn test_seeded_spins_replay_exactly() {
    let engine = DuelSlotEngine::lair_of_riches().unwrap();
    for mode in [SpinMode::Normal, SpinMode::BonusBoost, SpinMode::Bonus3, SpinMode::Bonus4] {
        let request = SpinRequest::new(100).with_mode(mode).with_seed("replay");
        let first = engine.spin(&request).unwrap();
        let second = engine.spin(&request).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}

#[test]
fn test_result_wire_format() {
    let engine = engine(document(constant(&[1, 1, 1, 1, 2]), quiet_bonus(), None));
    let result = engine.spin(&SpinRequest::new(10).with_seed("wire")).unwrap();
    let json = serde_json::to_value(&result).unwrap();
    for key in [
        "win",
        "details",
        "amount",
        "payout",
        "scatterCounts",
        "wildPositions",
        "stopIndex",
        "bonusRounds",
    ] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    assert_eq!(json["bonusRounds"].as_array().unwrap().len(), 10);
    assert_eq!(json["rng"]["type"], "seeded");
}
