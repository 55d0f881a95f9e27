use std::path::PathBuf;
use std::time::Instant;

use poker_table_client::betting::{BetIntent, BettingPhase};
use poker_table_client::calibration::{CalibrationController, CalibrationEffect, PointerEvent};
use poker_table_client::layout::{
	Anchor, LayoutConfig, LayoutEngine, LayoutMode, MarkerKey, OverrideMap, Point, automatic_position,
};
use poker_table_client::net::protocol::{ActionKind, OutboundFrame, decode_frame};
use poker_table_client::reducer::StateReducer;
use poker_table_client::storage::{CUSTOM_POSITIONS_KEY, PersistedCalibration, Storage};

fn scratch_dir(label: &str) -> PathBuf {
	let dir = std::env::temp_dir().join(format!("poker-table-client-it-{}-{}", label, std::process::id()));
	let _ = std::fs::remove_dir_all(&dir);
	dir
}

fn apply(reducer: &mut StateReducer, json: &str) {
	let frame = decode_frame(json).expect("well-formed frame");
	reducer.apply(frame, Instant::now());
}

#[test]
fn test_two_player_preflop_decisions() {
	let mut ana = StateReducer::new("ana");
	let mut bia = StateReducer::new("bia");

	let joined = r#"{"type":"state","players":["ana","bia"],"started":false,"stacks":{"ana":500,"bia":500}}"#;
	apply(&mut ana, joined);
	apply(&mut bia, joined);
	assert_eq!(ana.snapshot().seat_of("ana"), Some(1));
	assert_eq!(ana.snapshot().seat_of("bia"), Some(2));
	assert_eq!(ana.betting().phase(), BettingPhase::Idle);

	let preflop = r#"{"type":"state","players":["ana","bia"],"started":true,"street":"preflop","toAct":"ana","callAmount":0,"minRaise":20,"stacks":{"ana":500,"bia":500}}"#;
	apply(&mut ana, preflop);
	apply(&mut bia, preflop);

	let actions = ana.betting().actions();
	assert!(actions.fold);
	assert!(actions.check);
	assert!(actions.raise);
	assert!(!actions.call, "call collapses to check when nothing is owed");
	assert_eq!(ana.betting().intent(), BetIntent::Check);
	assert_eq!(bia.betting().phase(), BettingPhase::Idle);

	ana.betting_mut().set_bet(50);
	assert_eq!(ana.betting_mut().submit(), Some(OutboundFrame::raise(50)));
	assert!(ana.betting_mut().submit().is_none());

	let raised = r#"{"type":"state","players":["ana","bia"],"started":true,"street":"preflop","toAct":"bia","callAmount":50,"minRaise":50,"pot":50,"stacks":{"ana":450,"bia":500},"recentActions":[{"player":"ana","action":"raise","amount":50}]}"#;
	apply(&mut ana, raised);
	apply(&mut bia, raised);
	assert_eq!(ana.betting().phase(), BettingPhase::Idle);
	assert_eq!(bia.betting().phase(), BettingPhase::Deciding);

	let betting = bia.betting_mut();
	let mut intent_at = |amount: u64| {
		betting.set_bet(amount);
		betting.intent()
	};
	assert_eq!(intent_at(50), BetIntent::Call { amount: 50 });
	assert_eq!(intent_at(75), BetIntent::Invalid);
	assert_eq!(intent_at(99), BetIntent::Invalid);
	assert_eq!(intent_at(100), BetIntent::Raise { by: 50 });
	assert_eq!(intent_at(500), BetIntent::AllIn { amount: 500 });
	for amount in 1..50 {
		assert_eq!(intent_at(amount), BetIntent::Invalid, "amount {}", amount);
	}
}

#[test]
fn test_submission_latch_under_repeated_input() {
	let mut ana = StateReducer::new("ana");
	let turn = r#"{"type":"state","players":["ana","bia"],"started":true,"street":"flop","toAct":"ana","callAmount":10,"minRaise":10,"stacks":{"ana":200,"bia":200}}"#;
	apply(&mut ana, turn);

	let mut sent = Vec::new();
	for _ in 0..20 {
		if let Some(frame) = ana.betting_mut().submit() {
			sent.push(frame);
		}
		if let Some(frame) = ana.betting_mut().fold() {
			sent.push(frame);
		}
	}
	assert_eq!(sent, vec![OutboundFrame::action(ActionKind::Call)]);

	apply(&mut ana, turn);
	assert_eq!(ana.betting_mut().fold(), Some(OutboundFrame::action(ActionKind::Fold)));
}

#[test]
fn test_auto_sequence_then_persist_round_trip() {
	let storage = Storage::open(scratch_dir("sequence"));
	let mut engine = LayoutEngine::new(LayoutConfig::default(), OverrideMap::new(), 9);
	let mut calibration = CalibrationController::new(9, "Croupier");
	let players: Vec<String> = vec!["ana".into(), "bia".into(), "caio".into()];
	let (layout, _) = engine.resolve(players.len());

	calibration.enter_auto_sequence();
	let mut completed = None;
	for i in 0..10 {
		let point = Point::new(10.0 + i as f64 * 8.0, if i % 2 == 0 { 2.0 } else { 97.0 });
		let effect = calibration.handle_pointer(PointerEvent::Click(point), &mut engine, &layout, &players);
		if let CalibrationEffect::SequenceComplete { points } = effect {
			completed = Some(points);
		}
	}
	assert_eq!(completed, Some(10));
	assert_eq!(engine.mode, LayoutMode::Custom);
	assert_eq!(engine.overrides.point(MarkerKey::Host), Some(Point::new(10.0, 5.0)));
	assert_eq!(engine.overrides.point(MarkerKey::Seat(1)), Some(Point::new(18.0, 95.0)));
	for (_, anchor) in engine.overrides.iter() {
		assert!((5.0..=95.0).contains(&anchor.x));
		assert!((5.0..=95.0).contains(&anchor.y));
	}

	calibration.save(&engine, &storage).unwrap();
	let loaded = PersistedCalibration::load(&storage, OverrideMap::new());
	assert_eq!(loaded.overrides, engine.overrides);
}

#[test]
fn test_legacy_slot_keys_load_as_seats() {
	let dir = scratch_dir("legacy");
	std::fs::create_dir_all(&dir).unwrap();
	std::fs::write(
		dir.join(format!("{}.json", CUSTOM_POSITIONS_KEY)),
		r#"{"Croupier":{"x":50.0,"y":12.0},"Slot 1":{"x":69.5,"y":14.6},"Bogus":{"x":1.0,"y":1.0}}"#,
	)
	.unwrap();

	let loaded = PersistedCalibration::load(&Storage::open(&dir), OverrideMap::new());
	assert_eq!(loaded.overrides.len(), 2);
	assert_eq!(loaded.overrides.point(MarkerKey::Seat(1)), Some(Point::new(69.5, 14.6)));
}

#[test]
fn test_custom_mode_pins_new_seats_across_parameter_changes() {
	let mut overrides = OverrideMap::new();
	overrides.insert(MarkerKey::Host, Anchor::at(Point::new(50.0, 12.0)));
	let mut engine = LayoutEngine::new(LayoutConfig::default(), overrides, 9);

	let first = engine.resolve_and_materialize(3);
	assert_eq!(first.seat(2), Some(automatic_position(2, 3, &LayoutConfig::default())));

	engine.config.radius_x = 0.2;
	let second = engine.resolve_and_materialize(3);
	assert_eq!(first.seat(2), second.seat(2));
	assert_eq!(second.host, Some(Point::new(50.0, 12.0)));
}
