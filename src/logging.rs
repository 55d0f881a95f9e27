use std::fs::{self, OpenOptions};
use std::io::Write;
use std::sync::Mutex;

use chrono::Local;

struct LogState {
	file: Option<std::fs::File>,
	current_date: String,
	table_id: String,
}

static LOG_STATE: Mutex<LogState> = Mutex::new(LogState {
	file: None,
	current_date: String::new(),
	table_id: String::new(),
});

fn ensure_log_file(state: &mut LogState) {
	let date = Local::now().format("%Y-%m-%d").to_string();
	if state.current_date != date || state.file.is_none() {
		let _ = fs::create_dir_all("logs");
		let path = format!("logs/table-client-{}.log", date);
		if let Ok(file) = OpenOptions::new()
			.create(true)
			.append(true)
			.open(&path)
		{
			state.file = Some(file);
			state.current_date = date;
		}
	}
}

pub fn set_table_id(table_id: &str) {
	if let Ok(mut state) = LOG_STATE.lock() {
		state.table_id = table_id.to_string();
	}
}

pub fn log(module: &str, log_type: &str, message: &str) {
	if let Ok(mut state) = LOG_STATE.lock() {
		ensure_log_file(&mut state);

		let table_id = if state.table_id.is_empty() { "--------" } else { &state.table_id };
		let line = format!(
			"[{}][{}][{}:{}] {}\n",
			Local::now().format("%H:%M:%S%.3f"),
			table_id,
			module,
			log_type,
			message
		);

		if let Some(ref mut file) = state.file {
			let _ = file.write_all(line.as_bytes());
			let _ = file.flush();
		}
	}
}

pub fn log_verbatim(module: &str, log_type: &str, label: &str, content: &str) {
	let single_line = content.replace('\n', " ").replace('\r', "");
	log(module, log_type, &format!("{}: <<<{}>>>", label, single_line));
}

pub mod net {
	use super::{log, log_verbatim};

	pub fn status(status: &str) {
		log("Net", "STATUS", status);
	}

	pub fn dropped(payload: &str) {
		log_verbatim("Net", "DROPPED", "malformed frame", payload);
	}

	pub fn sent(frame: &str) {
		log_verbatim("Net", "SEND", "frame", frame);
	}

	pub fn error(msg: &str) {
		log("Net", "ERROR", msg);
	}
}

pub mod state {
	use super::log;

	pub fn snapshot(players: usize, street: &str, to_act: Option<&str>, pot: u64) {
		log(
			"State",
			"SNAPSHOT",
			&format!("players={} street={} to_act={} pot={}", players, street, to_act.unwrap_or("-"), pot),
		);
	}

	pub fn notice(text: &str) {
		log("State", "NOTICE", text);
	}
}

pub mod layout {
	use super::log;

	pub fn materialized(count: usize) {
		log("Layout", "MATERIALIZE", &format!("{} overrides fixed from automatic layout", count));
	}

	pub fn fitted(radius_x: f64, radius_y: f64, angle_offset: f64) {
		log(
			"Layout",
			"FIT",
			&format!("radius_x={:.6} radius_y={:.6} angle_offset={:.15}", radius_x, radius_y, angle_offset),
		);
	}
}

pub mod calibration {
	use super::log;

	pub fn mode(mode: &str) {
		log("Calibration", "MODE", mode);
	}

	pub fn commit(key: &str, x: f64, y: f64) {
		log("Calibration", "COMMIT", &format!("{} -> ({:.2}, {:.2})", key, x, y));
	}

	pub fn saved(entries: usize) {
		log("Calibration", "SAVE", &format!("{} overrides persisted", entries));
	}

	pub fn storage(msg: &str) {
		log("Calibration", "STORAGE", msg);
	}
}

pub mod betting {
	use super::log;

	pub fn submitted(intent: &str) {
		log("Betting", "SUBMIT", intent);
	}

	pub fn rejected(reason: &str) {
		log("Betting", "REJECT", reason);
	}
}
