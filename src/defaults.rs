use include_dir::{include_dir, Dir};
use std::fs;
use std::path::Path;

use crate::config::{ClientConfig, parse_client};
use crate::layout::OverrideMap;
use crate::logging;

static CONFIG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/config");

pub fn ensure_config() {
	let Some(user_config) = dirs::config_dir() else {
		return;
	};
	let dest = user_config.join("poker-table-client");

	extract_dir(&CONFIG_DIR, &dest);
}

fn extract_dir(dir: &Dir, dest: &Path) {
	for file in dir.files() {
		let file_dest = dest.join(file.path());
		if !file_dest.exists() {
			if let Some(parent) = file_dest.parent() {
				let _ = fs::create_dir_all(parent);
			}
			let _ = fs::write(&file_dest, file.contents());
		}
	}

	for subdir in dir.dirs() {
		extract_dir(subdir, dest);
	}
}

/// The shipped client config, used when no file is found on disk.
pub fn default_client_config() -> Result<ClientConfig, String> {
	let file = CONFIG_DIR
		.get_file("client.toml")
		.ok_or_else(|| "embedded client.toml missing".to_string())?;
	let content = file
		.contents_utf8()
		.ok_or_else(|| "embedded client.toml is not UTF-8".to_string())?;
	parse_client(content)
}

/// Hand-calibrated host and seat positions for the stock table artwork.
pub fn default_overrides() -> OverrideMap {
	let Some(content) = CONFIG_DIR.get_file("custom_positions.json").and_then(|f| f.contents_utf8()) else {
		return OverrideMap::new();
	};
	match serde_json::from_str(content) {
		Ok(map) => map,
		Err(e) => {
			logging::calibration::storage(&format!("embedded positions unreadable: {}", e));
			OverrideMap::new()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::layout::{MarkerKey, Point};

	#[test]
	fn test_embedded_client_config_parses() {
		let config = default_client_config().unwrap();
		assert_eq!(config.table.capacity, 9);
		assert_eq!(config.table.host_label, "Croupier");
	}

	#[test]
	fn test_default_overrides_cover_host_and_every_seat() {
		let map = default_overrides();
		assert_eq!(map.len(), 10);
		assert_eq!(
			map.point(MarkerKey::Host),
			Some(Point::new(50.162263286499694, 11.856823266219239))
		);
		for seat in 1..=9 {
			assert!(map.contains(MarkerKey::Seat(seat)), "seat {} missing", seat);
		}
	}
}
