use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Face-down placeholder sent in place of a hidden card.
pub const CARD_BACK: &str = "back";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Card {
	Face { rank: char, suit: char },
	Back,
}

impl Card {
	/// Parses a two-character code such as `"TH"` or `"as"`, or the `"back"` placeholder.
	pub fn parse(code: &str) -> Option<Self> {
		if code.eq_ignore_ascii_case(CARD_BACK) {
			return Some(Card::Back);
		}

		let mut chars = code.chars();
		let rank = chars.next()?.to_ascii_uppercase();
		let suit = chars.next()?.to_ascii_uppercase();
		if chars.next().is_some() {
			return None;
		}

		let rank_ok = matches!(rank, '2'..='9' | 'T' | 'J' | 'Q' | 'K' | 'A');
		let suit_ok = matches!(suit, 'H' | 'D' | 'S' | 'C');
		if rank_ok && suit_ok {
			Some(Card::Face { rank, suit })
		} else {
			None
		}
	}

	pub fn suit_symbol(&self) -> &'static str {
		match self {
			Card::Face { suit: 'S', .. } => "♠",
			Card::Face { suit: 'H', .. } => "♥",
			Card::Face { suit: 'D', .. } => "♦",
			Card::Face { suit: 'C', .. } => "♣",
			_ => "?",
		}
	}

	pub fn is_red(&self) -> bool {
		matches!(self, Card::Face { suit: 'H' | 'D', .. })
	}

	pub fn display(&self) -> String {
		match self {
			Card::Face { rank, .. } => format!("{}{}", rank, self.suit_symbol()),
			Card::Back => "▓▓".to_string(),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Street {
	Preflop,
	Flop,
	Turn,
	River,
	Showdown,
}

impl Street {
	pub fn name(&self) -> &'static str {
		match self {
			Street::Preflop => "Preflop",
			Street::Flop => "Flop",
			Street::Turn => "Turn",
			Street::River => "River",
			Street::Showdown => "Showdown",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentAction {
	pub player: String,
	pub action: String,
	#[serde(default)]
	pub amount: Option<u64>,
}

/// Servers send `null` for empty collections as often as they omit them.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Deserialize<'de> + Default,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Authoritative table state as last received. Replaced wholesale on every
/// state frame; seat index is the position in `players`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableSnapshot {
	#[serde(deserialize_with = "nullable")]
	pub players: Vec<String>,
	#[serde(deserialize_with = "nullable")]
	pub started: bool,
	#[serde(deserialize_with = "nullable")]
	pub community: Vec<String>,
	#[serde(deserialize_with = "nullable")]
	pub hole: Vec<String>,
	#[serde(deserialize_with = "nullable")]
	pub pot: u64,
	pub street: Option<Street>,
	pub to_act: Option<String>,
	pub winners: Option<Vec<String>>,
	#[serde(deserialize_with = "nullable")]
	pub recent_actions: Vec<RecentAction>,
	pub call_amount: Option<u64>,
	#[serde(deserialize_with = "nullable")]
	pub stacks: HashMap<String, u64>,
	pub dealer: Option<String>,
	pub sb: Option<String>,
	pub bb: Option<String>,
	pub min_raise: Option<u64>,
	#[serde(deserialize_with = "nullable")]
	pub all_holes: HashMap<String, Vec<String>>,
}

impl TableSnapshot {
	pub fn new() -> Self {
		Self::default()
	}

	/// 1-based seat number of a nickname, in join order.
	pub fn seat_of(&self, nick: &str) -> Option<usize> {
		self.players.iter().position(|p| p == nick).map(|i| i + 1)
	}

	pub fn stack_of(&self, nick: &str) -> u64 {
		self.stacks.get(nick).copied().unwrap_or(0)
	}

	pub fn is_turn_of(&self, nick: &str) -> bool {
		self.to_act.as_deref() == Some(nick)
	}

	pub fn street_name(&self) -> &'static str {
		self.street.map(|s| s.name()).unwrap_or("Waiting")
	}

	pub fn community_cards(&self) -> Vec<Card> {
		self.community.iter().filter_map(|c| Card::parse(c)).collect()
	}

	pub fn hole_cards(&self) -> Vec<Card> {
		self.hole.iter().filter_map(|c| Card::parse(c)).collect()
	}

	pub fn revealed_cards(&self, nick: &str) -> Vec<Card> {
		self.all_holes
			.get(nick)
			.map(|cards| cards.iter().filter_map(|c| Card::parse(c)).collect())
			.unwrap_or_default()
	}

	pub fn position_label(&self, nick: &str) -> Option<&'static str> {
		if self.dealer.as_deref() == Some(nick) {
			Some("D")
		} else if self.sb.as_deref() == Some(nick) {
			Some("SB")
		} else if self.bb.as_deref() == Some(nick) {
			Some("BB")
		} else {
			None
		}
	}

	pub fn is_winner(&self, nick: &str) -> bool {
		self.winners
			.as_ref()
			.map(|w| w.iter().any(|n| n == nick))
			.unwrap_or(false)
	}

	/// Checks the referential invariants a well-formed frame satisfies.
	pub fn is_consistent(&self) -> bool {
		let known = |nick: &Option<String>| match nick {
			Some(n) => self.players.contains(n),
			None => true,
		};

		self.stacks.keys().all(|k| self.players.contains(k))
			&& known(&self.to_act)
			&& known(&self.dealer)
			&& known(&self.sb)
			&& known(&self.bb)
			&& self.community.len() <= 5
	}
}
