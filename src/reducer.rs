use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::betting::BettingState;
use crate::logging;
use crate::net::protocol::InboundFrame;
use crate::view::TableSnapshot;

/// How long a server error stays on screen.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);
const CHAT_HISTORY: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
	pub text: String,
	pub expires_at: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
	pub from: String,
	pub text: String,
}

/// What a frame changed, so callers can react to snapshot transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
	State { previous: TableSnapshot },
	Notice,
	Chat,
}

/// Folds inbound frames into the local table view and the betting controls.
pub struct StateReducer {
	local_nick: String,
	snapshot: TableSnapshot,
	betting: BettingState,
	notice: Option<Notice>,
	chat: VecDeque<ChatLine>,
}

impl StateReducer {
	pub fn new(local_nick: &str) -> Self {
		Self {
			local_nick: local_nick.to_string(),
			snapshot: TableSnapshot::new(),
			betting: BettingState::new(),
			notice: None,
			chat: VecDeque::new(),
		}
	}

	pub fn local_nick(&self) -> &str {
		&self.local_nick
	}

	pub fn snapshot(&self) -> &TableSnapshot {
		&self.snapshot
	}

	pub fn betting(&self) -> &BettingState {
		&self.betting
	}

	pub fn betting_mut(&mut self) -> &mut BettingState {
		&mut self.betting
	}

	pub fn apply(&mut self, frame: InboundFrame, now: Instant) -> Applied {
		match frame {
			InboundFrame::State(next) => {
				logging::state::snapshot(
					next.players.len(),
					next.street_name(),
					next.to_act.as_deref(),
					next.pot,
				);
				let previous = std::mem::replace(&mut self.snapshot, next);
				self.betting.sync(&self.snapshot, &self.local_nick);
				Applied::State { previous }
			}
			InboundFrame::Error { .. } => {
				let text = frame.error_message().unwrap_or_default();
				logging::state::notice(&text);
				self.notice = Some(Notice {
					text,
					expires_at: now + NOTICE_TTL,
				});
				Applied::Notice
			}
			InboundFrame::Chat { from, text } => {
				self.chat.push_back(ChatLine {
					from: from.unwrap_or_default(),
					text,
				});
				while self.chat.len() > CHAT_HISTORY {
					self.chat.pop_front();
				}
				Applied::Chat
			}
		}
	}

	/// The current notice, unless it has already expired.
	pub fn notice(&self, now: Instant) -> Option<&str> {
		self.notice
			.as_ref()
			.filter(|n| now < n.expires_at)
			.map(|n| n.text.as_str())
	}

	pub fn tick(&mut self, now: Instant) {
		if self.notice.as_ref().is_some_and(|n| now >= n.expires_at) {
			self.notice = None;
		}
	}

	pub fn dismiss_notice(&mut self) {
		self.notice = None;
	}

	pub fn chat(&self) -> impl Iterator<Item = &ChatLine> {
		self.chat.iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::betting::BettingPhase;
	use crate::net::protocol::decode_frame;

	fn state(json: &str) -> InboundFrame {
		decode_frame(json).expect("valid state frame")
	}

	#[test]
	fn test_state_frame_replaces_snapshot_wholesale() {
		let mut reducer = StateReducer::new("ana");
		let now = Instant::now();

		reducer.apply(
			state(r#"{"type":"state","players":["ana","bia"],"started":true,"pot":30,"dealer":"ana","community":["AH","KD","2C"]}"#),
			now,
		);
		assert_eq!(reducer.snapshot().pot, 30);

		reducer.apply(state(r#"{"type":"state","players":["ana"]}"#), now);
		let snapshot = reducer.snapshot();
		assert_eq!(snapshot.players, vec!["ana".to_string()]);
		assert_eq!(snapshot.pot, 0);
		assert!(!snapshot.started);
		assert!(snapshot.community.is_empty());
		assert_eq!(snapshot.dealer, None);
	}

	#[test]
	fn test_apply_returns_previous_snapshot() {
		let mut reducer = StateReducer::new("ana");
		let now = Instant::now();
		reducer.apply(state(r#"{"type":"state","players":["ana"],"pot":5}"#), now);

		match reducer.apply(state(r#"{"type":"state","players":["ana"],"pot":9}"#), now) {
			Applied::State { previous } => assert_eq!(previous.pot, 5),
			other => panic!("Expected state transition, got {:?}", other),
		}
	}

	#[test]
	fn test_state_frame_clears_latch_even_for_other_player() {
		let mut reducer = StateReducer::new("ana");
		let now = Instant::now();
		reducer.apply(
			state(r#"{"type":"state","players":["ana","bia"],"started":true,"street":"flop","toAct":"ana","callAmount":0,"stacks":{"ana":100,"bia":100}}"#),
			now,
		);
		assert!(reducer.betting_mut().check().is_some());
		assert!(reducer.betting().submitted);

		reducer.apply(
			state(r#"{"type":"state","players":["ana","bia"],"started":true,"street":"flop","toAct":"bia","callAmount":0,"stacks":{"ana":100,"bia":100}}"#),
			now,
		);
		assert!(!reducer.betting().submitted);
		assert_eq!(reducer.betting().phase(), BettingPhase::Idle);
		assert_eq!(reducer.betting().bet_amount, 0);
	}

	#[test]
	fn test_error_notice_expires_after_five_seconds() {
		let mut reducer = StateReducer::new("ana");
		let now = Instant::now();
		reducer.apply(decode_frame(r#"{"type":"error","text":"Mesa cheia"}"#).unwrap(), now);

		assert_eq!(reducer.notice(now), Some("Mesa cheia"));
		assert_eq!(reducer.notice(now + Duration::from_millis(4999)), Some("Mesa cheia"));
		assert_eq!(reducer.notice(now + NOTICE_TTL), None);

		reducer.tick(now + NOTICE_TTL);
		assert_eq!(reducer.notice(now), None);
	}

	#[test]
	fn test_error_frame_does_not_touch_snapshot() {
		let mut reducer = StateReducer::new("ana");
		let now = Instant::now();
		reducer.apply(state(r#"{"type":"state","players":["ana"],"pot":12}"#), now);
		reducer.apply(decode_frame(r#"{"type":"error","error":"Illegal action"}"#).unwrap(), now);

		assert_eq!(reducer.snapshot().pot, 12);
		assert_eq!(reducer.notice(now), Some("Illegal action"));
	}

	#[test]
	fn test_dismiss_notice() {
		let mut reducer = StateReducer::new("ana");
		let now = Instant::now();
		reducer.apply(decode_frame(r#"{"type":"error","text":"x"}"#).unwrap(), now);
		reducer.dismiss_notice();
		assert_eq!(reducer.notice(now), None);
	}

	#[test]
	fn test_chat_history_is_bounded() {
		let mut reducer = StateReducer::new("ana");
		let now = Instant::now();
		for i in 0..60 {
			let frame = InboundFrame::Chat {
				from: Some("bia".to_string()),
				text: format!("msg {}", i),
			};
			assert_eq!(reducer.apply(frame, now), Applied::Chat);
		}
		let lines: Vec<&ChatLine> = reducer.chat().collect();
		assert_eq!(lines.len(), CHAT_HISTORY);
		assert_eq!(lines[0].text, "msg 10");
	}
}
