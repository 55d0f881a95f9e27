use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::layout::{HOST_ID, SurfaceSize};
use crate::storage::Storage;

fn config_paths(filename: &str) -> Vec<PathBuf> {
	let mut paths = Vec::new();

	if let Some(home) = std::env::var_os("HOME") {
		let user_config = PathBuf::from(home).join(".config/poker-table-client").join(filename);
		paths.push(user_config);
	}

	paths.push(PathBuf::from("config").join(filename));

	paths
}

fn find_config(filename: &str) -> Option<PathBuf> {
	config_paths(filename).into_iter().find(|p| p.exists())
}

pub fn resolve_config(filename: &str) -> Result<PathBuf, String> {
	find_config(filename).ok_or_else(|| {
		let searched: Vec<_> = config_paths(filename)
			.iter()
			.map(|p| p.display().to_string())
			.collect();
		format!("Config file '{}' not found. Searched: {}", filename, searched.join(", "))
	})
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
	#[serde(default = "default_url")]
	pub url: String,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self { url: default_url() }
	}
}

fn default_url() -> String {
	"ws://localhost:8000".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableConfig {
	#[serde(default = "default_game")]
	pub game: String,
	#[serde(default = "default_table")]
	pub table: String,
	#[serde(default)]
	pub nick: Option<String>,
	#[serde(default = "default_capacity")]
	pub capacity: usize,
	#[serde(default = "default_host_label")]
	pub host_label: String,
}

impl Default for TableConfig {
	fn default() -> Self {
		Self {
			game: default_game(),
			table: default_table(),
			nick: None,
			capacity: default_capacity(),
			host_label: default_host_label(),
		}
	}
}

fn default_game() -> String { "poker".to_string() }
fn default_table() -> String { "main".to_string() }
fn default_capacity() -> usize { 9 }
fn default_host_label() -> String { HOST_ID.to_string() }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
	#[serde(default)]
	pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientConfig {
	#[serde(default)]
	pub server: ServerConfig,
	#[serde(default)]
	pub table: TableConfig,
	#[serde(default)]
	pub storage: StorageConfig,
	#[serde(default)]
	pub surface: SurfaceSize,
}

impl ClientConfig {
	pub fn storage_dir(&self) -> PathBuf {
		self.storage.dir.clone().unwrap_or_else(Storage::default_dir)
	}

	fn validate(self) -> Result<Self, String> {
		if self.table.capacity == 0 {
			return Err("table.capacity must be at least 1".to_string());
		}
		if self.surface.width <= 0.0 || self.surface.height <= 0.0 {
			return Err("surface width and height must be positive".to_string());
		}
		Ok(self)
	}
}

pub fn parse_client(content: &str) -> Result<ClientConfig, String> {
	let config: ClientConfig = toml::from_str(content)
		.map_err(|e| format!("Failed to parse client config: {}", e))?;
	config.validate()
}

pub fn load_client<P: AsRef<Path>>(path: P) -> Result<ClientConfig, String> {
	let content = fs::read_to_string(&path)
		.map_err(|e| format!("Failed to read {}: {}", path.as_ref().display(), e))?;

	parse_client(&content)
}

pub fn load_client_auto() -> Result<ClientConfig, String> {
	let path = resolve_config("client.toml")?;
	load_client(&path)
}
