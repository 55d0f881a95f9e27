use std::collections::BTreeMap;

use serde::Serialize;

use crate::layout::{
	Anchor, FitError, LayoutConfig, LayoutEngine, LayoutMode, MarkerKey, OverrideMap, Point, ResolvedLayout,
	SurfaceSize, derive_automatic_from_overrides,
};
use crate::logging;
use crate::storage::{CUSTOM_POSITIONS_KEY, LAYOUT_KEY, POT_POSITION_KEY, Storage, StorageError};

/// How close, in percent, a press has to land to grab a marker.
pub const HIT_RADIUS: f64 = 4.0;

/// One click recorded while walking the table in sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct SequencePoint {
	pub key: MarkerKey,
	pub label: String,
	pub point: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationMode {
	Off,
	Drag { target: Option<MarkerKey> },
	ClickSelect { target: Option<MarkerKey> },
	AutoSequence { recorded: Vec<SequencePoint> },
}

impl CalibrationMode {
	pub fn name(&self) -> &'static str {
		match self {
			CalibrationMode::Off => "off",
			CalibrationMode::Drag { .. } => "drag",
			CalibrationMode::ClickSelect { .. } => "click-select",
			CalibrationMode::AutoSequence { .. } => "auto-sequence",
		}
	}
}

/// Pointer input in percent of the table surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
	Down(Point),
	Move(Point),
	Up(Point),
	Click(Point),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationEffect {
	None,
	Grabbed(MarkerKey),
	Moved(MarkerKey, Point),
	Released(MarkerKey),
	Committed(MarkerKey, Point),
	Recorded(SequencePoint),
	SequenceComplete { points: usize },
}

/// Portable copy of a calibration, handed back by `save`.
#[derive(Debug, Serialize)]
struct CalibrationSnapshot {
	layout: LayoutConfig,
	positions: BTreeMap<String, Anchor>,
}

/// Operator tooling that edits the layout engine's override map.
pub struct CalibrationController {
	mode: CalibrationMode,
	capacity: usize,
	host_label: String,
}

impl CalibrationController {
	pub fn new(capacity: usize, host_label: &str) -> Self {
		Self {
			mode: CalibrationMode::Off,
			capacity,
			host_label: host_label.to_string(),
		}
	}

	pub fn mode(&self) -> &CalibrationMode {
		&self.mode
	}

	pub fn is_active(&self) -> bool {
		self.mode != CalibrationMode::Off
	}

	fn set_mode(&mut self, mode: CalibrationMode) {
		logging::calibration::mode(mode.name());
		self.mode = mode;
	}

	pub fn enter_drag(&mut self) {
		self.set_mode(CalibrationMode::Drag { target: None });
	}

	pub fn enter_click_select(&mut self) {
		self.set_mode(CalibrationMode::ClickSelect { target: None });
	}

	pub fn enter_auto_sequence(&mut self) {
		self.set_mode(CalibrationMode::AutoSequence { recorded: Vec::new() });
	}

	pub fn exit(&mut self) {
		self.set_mode(CalibrationMode::Off);
	}

	/// Everything ClickSelect can target on this table.
	pub fn targets(&self) -> Vec<MarkerKey> {
		MarkerKey::all(self.capacity)
	}

	/// Picks the ClickSelect target. Ignored in any other mode.
	pub fn select_target(&mut self, key: MarkerKey) -> bool {
		match &mut self.mode {
			CalibrationMode::ClickSelect { target } => {
				*target = Some(key);
				true
			}
			_ => false,
		}
	}

	/// Steps the ClickSelect target through `targets()`, wrapping at both ends.
	pub fn cycle_target(&mut self, forward: bool) -> Option<MarkerKey> {
		let targets = self.targets();
		if targets.is_empty() {
			return None;
		}
		let CalibrationMode::ClickSelect { target } = &mut self.mode else {
			return None;
		};
		let len = targets.len();
		let next = match target.and_then(|t| targets.iter().position(|k| *k == t)) {
			Some(i) if forward => (i + 1) % len,
			Some(i) => (i + len - 1) % len,
			None if forward => 0,
			None => len - 1,
		};
		*target = Some(targets[next]);
		*target
	}

	/// Label shown for a key while calibrating.
	pub fn label_for(&self, key: MarkerKey) -> String {
		match key {
			MarkerKey::Host => self.host_label.clone(),
			other => other.to_string(),
		}
	}

	pub fn hit_test(&self, layout: &ResolvedLayout, point: Point) -> Option<MarkerKey> {
		nearest_marker(layout, point)
	}

	pub fn handle_pointer(
		&mut self,
		event: PointerEvent,
		engine: &mut LayoutEngine,
		layout: &ResolvedLayout,
		players: &[String],
	) -> CalibrationEffect {
		let capacity = self.capacity;

		match &mut self.mode {
			CalibrationMode::Off => CalibrationEffect::None,

			CalibrationMode::Drag { target } => match (event, *target) {
				(PointerEvent::Down(p), None) => {
					let Some(key) = nearest_marker(layout, p) else {
						return CalibrationEffect::None;
					};
					*target = Some(key);
					CalibrationEffect::Grabbed(key)
				}
				(PointerEvent::Move(p), Some(key)) => {
					let point = commit(engine, key, p);
					CalibrationEffect::Moved(key, point)
				}
				(PointerEvent::Up(p), Some(key)) => {
					commit(engine, key, p);
					*target = None;
					CalibrationEffect::Released(key)
				}
				_ => CalibrationEffect::None,
			},

			CalibrationMode::ClickSelect { target } => match (event, *target) {
				(PointerEvent::Click(p), Some(key)) => {
					let point = commit(engine, key, p);
					*target = None;
					CalibrationEffect::Committed(key, point)
				}
				_ => CalibrationEffect::None,
			},

			CalibrationMode::AutoSequence { recorded } => {
				let PointerEvent::Click(p) = event else {
					return CalibrationEffect::None;
				};
				let index = recorded.len();
				let (key, label) = if index == 0 {
					(MarkerKey::Host, self.host_label.clone())
				} else {
					let label = players
						.get(index - 1)
						.cloned()
						.unwrap_or_else(|| format!("Player {}", index));
					(MarkerKey::Seat(index), label)
				};

				let point = commit(engine, key, p);
				let entry = SequencePoint { key, label, point };
				recorded.push(entry.clone());

				if recorded.len() >= capacity + 1 {
					let points = recorded.len();
					self.set_mode(CalibrationMode::Off);
					CalibrationEffect::SequenceComplete { points }
				} else {
					CalibrationEffect::Recorded(entry)
				}
			}
		}
	}

	/// Turns a chip stack anchor by `delta` degrees. A stack that was never
	/// placed by hand is pinned where the layout currently draws it.
	pub fn rotate_stack(&self, engine: &mut LayoutEngine, layout: &ResolvedLayout, seat: usize, delta: f64) -> Option<f64> {
		let key = MarkerKey::Stack(seat);
		let anchor = match engine.overrides.get(key) {
			Some(anchor) => *anchor,
			None => {
				let drawn = layout.stack(seat)?;
				Anchor { rotation: drawn.rotation, ..Anchor::at(drawn.point().clamped()) }
			}
		};
		let rotation = (anchor.rotation.unwrap_or(0.0) + delta).rem_euclid(360.0);
		engine.overrides.insert(key, Anchor { rotation: Some(rotation), ..anchor });
		Some(rotation)
	}

	/// Drops every override, stored or not, and returns to the automatic layout.
	pub fn clear_overrides(&mut self, engine: &mut LayoutEngine, storage: &Storage) {
		engine.overrides.clear();
		engine.mode = LayoutMode::Automatic;
		self.set_mode(CalibrationMode::Off);
		if let Err(e) = storage.remove(CUSTOM_POSITIONS_KEY) {
			logging::calibration::storage(&format!("failed to remove overrides: {}", e));
		}
	}

	/// Replaces the ellipse parameters with ones fitted to the placed host and
	/// seats. The override map and layout mode are left as they are.
	pub fn fit(&self, engine: &mut LayoutEngine, surface: SurfaceSize) -> Result<LayoutConfig, FitError> {
		let fitted = derive_automatic_from_overrides(&engine.overrides, &engine.config, self.capacity, surface)?;
		engine.config = fitted;
		Ok(fitted)
	}

	/// Persists the current parameters and overrides, and returns them as TOML.
	pub fn save(&self, engine: &LayoutEngine, storage: &Storage) -> Result<String, StorageError> {
		storage.save(LAYOUT_KEY, &engine.config)?;
		storage.save(CUSTOM_POSITIONS_KEY, &engine.overrides)?;
		if let Some(pot) = engine.overrides.point(MarkerKey::Pot) {
			storage.save(POT_POSITION_KEY, &pot)?;
		}
		logging::calibration::saved(engine.overrides.len());

		let snapshot = CalibrationSnapshot {
			layout: engine.config,
			positions: BTreeMap::from(engine.overrides.clone()),
		};
		Ok(toml::to_string_pretty(&snapshot)?)
	}
}

/// Nearest marker within `HIT_RADIUS` of `point`.
fn nearest_marker(layout: &ResolvedLayout, point: Point) -> Option<MarkerKey> {
	layout
		.markers()
		.into_iter()
		.map(|(key, p)| (key, p.distance(point)))
		.filter(|(_, d)| *d <= HIT_RADIUS)
		.min_by(|a, b| a.1.total_cmp(&b.1))
		.map(|(key, _)| key)
}

/// Writes a clamped position for `key`. Placing the host or a seat by hand
/// switches the engine to custom mode.
fn commit(engine: &mut LayoutEngine, key: MarkerKey, point: Point) -> Point {
	let point = point.clamped();
	engine.overrides.set_point(key, point);
	if key.is_formula_driven() {
		engine.mode = LayoutMode::Custom;
	}
	logging::calibration::commit(&key.to_string(), point.x, point.y);
	point
}

/// Restores an override map captured before editing began.
pub fn revert(engine: &mut LayoutEngine, saved: &OverrideMap) {
	engine.overrides = saved.clone();
	engine.mode = if saved.is_empty() { LayoutMode::Automatic } else { LayoutMode::Custom };
}
