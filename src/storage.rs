use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::layout::{LayoutConfig, OverrideMap, Point};
use crate::logging;

pub const LAYOUT_KEY: &str = "poker_table_positions";
pub const CUSTOM_POSITIONS_KEY: &str = "poker_custom_positions";
pub const CARD_POSITIONS_KEY: &str = "poker_card_positions";
pub const POT_POSITION_KEY: &str = "poker_pot_position";

#[derive(Debug)]
pub enum StorageError {
	Io(io::Error),
	Json(serde_json::Error),
	Toml(toml::ser::Error),
}

impl fmt::Display for StorageError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			StorageError::Io(e) => write!(f, "storage I/O failed: {}", e),
			StorageError::Json(e) => write!(f, "storage encoding failed: {}", e),
			StorageError::Toml(e) => write!(f, "snapshot encoding failed: {}", e),
		}
	}
}

impl std::error::Error for StorageError {}

impl From<io::Error> for StorageError {
	fn from(e: io::Error) -> Self {
		StorageError::Io(e)
	}
}

impl From<serde_json::Error> for StorageError {
	fn from(e: serde_json::Error) -> Self {
		StorageError::Json(e)
	}
}

impl From<toml::ser::Error> for StorageError {
	fn from(e: toml::ser::Error) -> Self {
		StorageError::Toml(e)
	}
}

/// Client-local key/value store: one JSON document per key in a directory.
#[derive(Debug, Clone)]
pub struct Storage {
	dir: PathBuf,
}

impl Storage {
	pub fn open<P: AsRef<Path>>(dir: P) -> Self {
		Self { dir: dir.as_ref().to_path_buf() }
	}

	pub fn default_dir() -> PathBuf {
		dirs::data_dir()
			.unwrap_or_else(|| PathBuf::from("."))
			.join("poker-table-client")
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	fn path(&self, key: &str) -> PathBuf {
		self.dir.join(format!("{}.json", key))
	}

	/// Missing and unreadable entries both come back as `None`.
	pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
		let content = fs::read_to_string(self.path(key)).ok()?;
		match serde_json::from_str(&content) {
			Ok(value) => Some(value),
			Err(e) => {
				logging::calibration::storage(&format!("discarding corrupt '{}': {}", key, e));
				None
			}
		}
	}

	pub fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
		self.load(key).unwrap_or_default()
	}

	pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
		fs::create_dir_all(&self.dir)?;
		let json = serde_json::to_string_pretty(value)?;
		fs::write(self.path(key), json)?;
		Ok(())
	}

	pub fn remove(&self, key: &str) -> Result<(), StorageError> {
		match fs::remove_file(self.path(key)) {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(e.into()),
		}
	}
}

/// Pixel offsets used when placing card rows relative to their anchors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CardOffsets {
	pub community_card_offset_y: f64,
	pub player_card_offset_top: f64,
	pub player_card_offset_bottom: f64,
}

impl Default for CardOffsets {
	fn default() -> Self {
		Self {
			community_card_offset_y: 15.0,
			player_card_offset_top: 30.0,
			player_card_offset_bottom: -90.0,
		}
	}
}

/// Everything calibration persists, loaded once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedCalibration {
	pub layout: LayoutConfig,
	pub overrides: OverrideMap,
	pub card_offsets: CardOffsets,
	pub pot: Option<Point>,
}

impl PersistedCalibration {
	/// Each entry falls back on its own. `fallback_overrides` is used when no
	/// override map has been stored yet.
	pub fn load(storage: &Storage, fallback_overrides: OverrideMap) -> Self {
		let overrides = storage
			.load::<OverrideMap>(CUSTOM_POSITIONS_KEY)
			.filter(|m| !m.is_empty())
			.unwrap_or(fallback_overrides);

		Self {
			layout: storage.load_or_default(LAYOUT_KEY),
			overrides,
			card_offsets: storage.load_or_default(CARD_POSITIONS_KEY),
			pot: storage.load(POT_POSITION_KEY),
		}
	}
}


#[cfg(test)]
mod tests {
	use super::test_support::scratch_dir;
	use super::*;
	use crate::layout::{Anchor, MarkerKey};

	#[test]
	fn test_missing_entry_is_none() {
		let storage = Storage::open(scratch_dir("missing"));
		assert!(storage.load::<LayoutConfig>(LAYOUT_KEY).is_none());
		assert_eq!(storage.load_or_default::<LayoutConfig>(LAYOUT_KEY), LayoutConfig::default());
	}

	#[test]
	fn test_corrupt_entry_falls_back_to_default() {
		let dir = scratch_dir("corrupt");
		let storage = Storage::open(&dir);
		fs::create_dir_all(&dir).unwrap();
		fs::write(dir.join(format!("{}.json", CARD_POSITIONS_KEY)), "{not json").unwrap();

		assert_eq!(storage.load_or_default::<CardOffsets>(CARD_POSITIONS_KEY), CardOffsets::default());
	}

	#[test]
	fn test_override_map_round_trip() {
		let storage = Storage::open(scratch_dir("roundtrip"));
		let mut map = OverrideMap::new();
		map.insert(MarkerKey::Host, Anchor::at(Point::new(50.162263286499694, 11.856823266219239)));
		map.insert(MarkerKey::Seat(9), Anchor::at(Point::new(30.07246376811594, 14.464285714285715)));
		map.insert(MarkerKey::Stack(2), Anchor { x: 70.0, y: 40.0, rotation: Some(135.0) });
		map.insert(MarkerKey::PositionChip(2), Anchor::at(Point::new(75.0, 35.0)));

		storage.save(CUSTOM_POSITIONS_KEY, &map).unwrap();
		let loaded: OverrideMap = storage.load(CUSTOM_POSITIONS_KEY).unwrap();

		assert_eq!(loaded, map);
		for (key, anchor) in map.iter() {
			assert_eq!(loaded.get(*key), Some(anchor));
		}
	}

	#[test]
	fn test_remove_missing_is_ok() {
		let storage = Storage::open(scratch_dir("remove"));
		assert!(storage.remove(CUSTOM_POSITIONS_KEY).is_ok());
	}

	#[test]
	fn test_persisted_calibration_uses_fallback_when_empty() {
		let storage = Storage::open(scratch_dir("fallback"));
		let mut fallback = OverrideMap::new();
		fallback.insert(MarkerKey::Host, Anchor::at(Point::new(50.0, 12.0)));

		let loaded = PersistedCalibration::load(&storage, fallback.clone());
		assert_eq!(loaded.overrides, fallback);
		assert_eq!(loaded.layout, LayoutConfig::default());
		assert_eq!(loaded.card_offsets, CardOffsets::default());
		assert_eq!(loaded.pot, None);
	}

	#[test]
	fn test_persisted_calibration_prefers_stored_entries() {
		let storage = Storage::open(scratch_dir("stored"));
		let mut stored = OverrideMap::new();
		stored.insert(MarkerKey::Seat(1), Anchor::at(Point::new(60.0, 20.0)));
		storage.save(CUSTOM_POSITIONS_KEY, &stored).unwrap();
		storage.save(POT_POSITION_KEY, &Point::new(48.0, 38.0)).unwrap();

		let loaded = PersistedCalibration::load(&storage, OverrideMap::new());
		assert_eq!(loaded.overrides, stored);
		assert_eq!(loaded.pot, Some(Point::new(48.0, 38.0)));
	}
}
