use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Persisted identifier of the host marker.
pub const HOST_ID: &str = "Croupier";

/// Committed coordinates never leave this band, so markers stay on the visible table.
pub const MIN_COORD: f64 = 5.0;
pub const MAX_COORD: f64 = 95.0;

/// A point in percent of the table surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const CENTER: Point = Point { x: 50.0, y: 50.0 };

	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn clamped(&self) -> Self {
		Self {
			x: self.x.clamp(MIN_COORD, MAX_COORD),
			y: self.y.clamp(MIN_COORD, MAX_COORD),
		}
	}

	pub fn lerp(&self, to: Point, t: f64) -> Self {
		Self {
			x: self.x + (to.x - self.x) * t,
			y: self.y + (to.y - self.y) * t,
		}
	}

	pub fn distance(&self, other: Point) -> f64 {
		((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
	}
}

/// Stored position of a marker. Only chip-stack anchors carry a rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
	pub x: f64,
	pub y: f64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub rotation: Option<f64>,
}

impl Anchor {
	pub fn at(point: Point) -> Self {
		Self { x: point.x, y: point.y, rotation: None }
	}

	pub fn point(&self) -> Point {
		Point::new(self.x, self.y)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarkerKind {
	Host,
	Seat,
	Pot,
	PotValue,
	Stack,
	PositionChip,
}

/// Seat-indexed identifier of everything that can be placed on the table.
/// Seats are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarkerKey {
	Host,
	Seat(usize),
	Pot,
	PotValue,
	Stack(usize),
	PositionChip(usize),
}

impl MarkerKey {
	pub fn kind(&self) -> MarkerKind {
		match self {
			MarkerKey::Host => MarkerKind::Host,
			MarkerKey::Seat(_) => MarkerKind::Seat,
			MarkerKey::Pot => MarkerKind::Pot,
			MarkerKey::PotValue => MarkerKind::PotValue,
			MarkerKey::Stack(_) => MarkerKind::Stack,
			MarkerKey::PositionChip(_) => MarkerKind::PositionChip,
		}
	}

	pub fn seat(&self) -> Option<usize> {
		match self {
			MarkerKey::Seat(n) | MarkerKey::Stack(n) | MarkerKey::PositionChip(n) => Some(*n),
			_ => None,
		}
	}

	/// Whether the automatic ellipse places this marker.
	pub fn is_formula_driven(&self) -> bool {
		matches!(self, MarkerKey::Host | MarkerKey::Seat(_))
	}

	/// Every key addressable on a table with `capacity` seats.
	pub fn all(capacity: usize) -> Vec<MarkerKey> {
		let mut keys = vec![MarkerKey::Host];
		keys.extend((1..=capacity).map(MarkerKey::Seat));
		keys.push(MarkerKey::Pot);
		keys.push(MarkerKey::PotValue);
		keys.extend((1..=capacity).map(MarkerKey::Stack));
		keys.extend((1..=capacity).map(MarkerKey::PositionChip));
		keys
	}
}

impl fmt::Display for MarkerKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			MarkerKey::Host => write!(f, "{}", HOST_ID),
			MarkerKey::Seat(n) => write!(f, "Seat {}", n),
			MarkerKey::Pot => write!(f, "Pot"),
			MarkerKey::PotValue => write!(f, "PotValue"),
			MarkerKey::Stack(n) => write!(f, "Stack Seat {}", n),
			MarkerKey::PositionChip(n) => write!(f, "PositionChip Seat {}", n),
		}
	}
}

fn parse_seat(s: &str) -> Result<usize, String> {
	match s.trim().parse::<usize>() {
		Ok(n) if n >= 1 => Ok(n),
		_ => Err(format!("invalid seat number '{}'", s)),
	}
}

impl FromStr for MarkerKey {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s == HOST_ID {
			return Ok(MarkerKey::Host);
		}
		match s {
			"Pot" => return Ok(MarkerKey::Pot),
			"PotValue" => return Ok(MarkerKey::PotValue),
			_ => {}
		}
		if let Some(rest) = s.strip_prefix("Stack Seat ") {
			return parse_seat(rest).map(MarkerKey::Stack);
		}
		if let Some(rest) = s.strip_prefix("PositionChip Seat ") {
			return parse_seat(rest).map(MarkerKey::PositionChip);
		}
		// "Slot N" is the older spelling of the same seat anchor.
		if let Some(rest) = s.strip_prefix("Seat ").or_else(|| s.strip_prefix("Slot ")) {
			return parse_seat(rest).map(MarkerKey::Seat);
		}
		Err(format!("unknown marker '{}'", s))
	}
}

/// Manually or lazily fixed positions that supersede the automatic layout.
/// Stored as a JSON object keyed by the marker's display name; unknown keys
/// are dropped on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Anchor>", into = "BTreeMap<String, Anchor>")]
pub struct OverrideMap {
	entries: BTreeMap<MarkerKey, Anchor>,
}

impl From<BTreeMap<String, Anchor>> for OverrideMap {
	fn from(raw: BTreeMap<String, Anchor>) -> Self {
		let mut entries = BTreeMap::new();
		for (name, anchor) in raw {
			let Ok(key) = name.parse::<MarkerKey>() else {
				continue;
			};
			// A "Seat N" entry takes precedence over its legacy "Slot N" spelling.
			if name.starts_with("Slot ") {
				entries.entry(key).or_insert(anchor);
			} else {
				entries.insert(key, anchor);
			}
		}
		Self { entries }
	}
}

impl From<OverrideMap> for BTreeMap<String, Anchor> {
	fn from(map: OverrideMap) -> Self {
		map.entries
			.into_iter()
			.map(|(k, v)| (k.to_string(), v))
			.collect()
	}
}

impl OverrideMap {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, key: MarkerKey) -> Option<&Anchor> {
		self.entries.get(&key)
	}

	pub fn point(&self, key: MarkerKey) -> Option<Point> {
		self.entries.get(&key).map(|a| a.point())
	}

	pub fn contains(&self, key: MarkerKey) -> bool {
		self.entries.contains_key(&key)
	}

	pub fn insert(&mut self, key: MarkerKey, anchor: Anchor) {
		self.entries.insert(key, anchor);
	}

	/// Moves a marker, keeping any rotation it already had.
	pub fn set_point(&mut self, key: MarkerKey, point: Point) {
		let rotation = self.entries.get(&key).and_then(|a| a.rotation);
		self.entries.insert(key, Anchor { x: point.x, y: point.y, rotation });
	}

	pub fn remove(&mut self, key: MarkerKey) -> Option<Anchor> {
		self.entries.remove(&key)
	}

	pub fn clear(&mut self) {
		self.entries.clear();
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&MarkerKey, &Anchor)> {
		self.entries.iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_marker_key_display() {
		assert_eq!(MarkerKey::Host.to_string(), "Croupier");
		assert_eq!(MarkerKey::Seat(3).to_string(), "Seat 3");
		assert_eq!(MarkerKey::Stack(3).to_string(), "Stack Seat 3");
		assert_eq!(MarkerKey::PositionChip(3).to_string(), "PositionChip Seat 3");
		assert_eq!(MarkerKey::PotValue.to_string(), "PotValue");
	}

	#[test]
	fn test_marker_key_parse_every_key() {
		for key in MarkerKey::all(9) {
			assert_eq!(key.to_string().parse::<MarkerKey>(), Ok(key));
		}
	}

	#[test]
	fn test_marker_key_parse_legacy_slot() {
		assert_eq!("Slot 4".parse::<MarkerKey>(), Ok(MarkerKey::Seat(4)));
	}

	#[test]
	fn test_marker_key_parse_rejects() {
		assert!("Seat 0".parse::<MarkerKey>().is_err());
		assert!("Seat x".parse::<MarkerKey>().is_err());
		assert!("guest".parse::<MarkerKey>().is_err());
	}

	#[test]
	fn test_all_keys_count() {
		assert_eq!(MarkerKey::all(9).len(), 1 + 9 + 2 + 9 + 9);
	}

	#[test]
	fn test_point_clamped() {
		assert_eq!(Point::new(-20.0, 140.0).clamped(), Point::new(5.0, 95.0));
		assert_eq!(Point::new(40.0, 60.0).clamped(), Point::new(40.0, 60.0));
	}

	#[test]
	fn test_override_map_json_shape() {
		let mut map = OverrideMap::new();
		map.insert(MarkerKey::Seat(1), Anchor::at(Point::new(10.0, 20.0)));
		map.insert(MarkerKey::Stack(1), Anchor { x: 30.0, y: 40.0, rotation: Some(90.0) });

		let json = serde_json::to_value(&map).unwrap();
		assert_eq!(json["Seat 1"]["x"], 10.0);
		assert!(json["Seat 1"].get("rotation").is_none());
		assert_eq!(json["Stack Seat 1"]["rotation"], 90.0);
	}

	#[test]
	fn test_override_map_drops_unknown_keys() {
		let json = r#"{"Croupier":{"x":50,"y":12},"guest":{"x":1,"y":2},"Slot 2":{"x":80,"y":30}}"#;
		let map: OverrideMap = serde_json::from_str(json).unwrap();

		assert_eq!(map.len(), 2);
		assert_eq!(map.point(MarkerKey::Host), Some(Point::new(50.0, 12.0)));
		assert_eq!(map.point(MarkerKey::Seat(2)), Some(Point::new(80.0, 30.0)));
	}

	#[test]
	fn test_seat_key_wins_over_legacy_slot() {
		let json = r#"{"Seat 3":{"x":40,"y":20},"Slot 3":{"x":70,"y":80}}"#;
		let map: OverrideMap = serde_json::from_str(json).unwrap();

		assert_eq!(map.len(), 1);
		assert_eq!(map.point(MarkerKey::Seat(3)), Some(Point::new(40.0, 20.0)));
	}

	#[test]
	fn test_set_point_keeps_rotation() {
		let mut map = OverrideMap::new();
		map.insert(MarkerKey::Stack(2), Anchor { x: 1.0, y: 1.0, rotation: Some(45.0) });
		map.set_point(MarkerKey::Stack(2), Point::new(20.0, 30.0));

		let anchor = map.get(MarkerKey::Stack(2)).unwrap();
		assert_eq!(anchor.point(), Point::new(20.0, 30.0));
		assert_eq!(anchor.rotation, Some(45.0));
	}
}
