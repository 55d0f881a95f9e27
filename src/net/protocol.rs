use serde::{Deserialize, Serialize};
use url::Url;

use crate::view::TableSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
	Check,
	Fold,
	Call,
	Raise,
	AllIn,
	NewHand,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundFrame {
	Start,
	Action {
		action: ActionKind,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		amount: Option<u64>,
	},
	Chat {
		from: String,
		text: String,
	},
}

impl OutboundFrame {
	pub fn action(action: ActionKind) -> Self {
		Self::Action { action, amount: None }
	}

	pub fn raise(amount: u64) -> Self {
		Self::Action {
			action: ActionKind::Raise,
			amount: Some(amount),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundFrame {
	State(TableSnapshot),
	Error {
		#[serde(default)]
		text: Option<String>,
		#[serde(default)]
		error: Option<String>,
	},
	Chat {
		#[serde(default)]
		from: Option<String>,
		#[serde(default, deserialize_with = "crate::view::nullable")]
		text: String,
	},
}

pub const UNKNOWN_ERROR: &str = "Unknown error";

impl InboundFrame {
	/// Text of an error frame: `text`, then `error`, then a generic message.
	pub fn error_message(&self) -> Option<String> {
		match self {
			InboundFrame::Error { text, error } => Some(
				text.clone()
					.or_else(|| error.clone())
					.unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
			),
			_ => None,
		}
	}
}

/// Parses one inbound payload. Anything that is not a recognised frame yields `None`.
pub fn decode_frame(payload: &str) -> Option<InboundFrame> {
	serde_json::from_str(payload).ok()
}

pub fn encode_frame(frame: &OutboundFrame) -> Result<String, serde_json::Error> {
	serde_json::to_string(frame)
}

/// Where a table lives: the server base plus the game, table and nickname
/// carried as query parameters on the `/ws` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableAddress {
	pub base: String,
	pub game: String,
	pub table: String,
	pub nick: String,
}

impl TableAddress {
	pub fn new(base: &str, game: &str, table: &str, nick: &str) -> Self {
		Self {
			base: base.to_string(),
			game: game.to_string(),
			table: table.to_string(),
			nick: nick.to_string(),
		}
	}

	pub fn to_url(&self) -> Result<Url, url::ParseError> {
		let base = Url::parse(&self.base)?;
		let mut url = base.join("/ws")?;
		url.query_pairs_mut()
			.append_pair("game", &self.game)
			.append_pair("table", &self.table)
			.append_pair("nick", &self.nick);
		Ok(url)
	}
}
