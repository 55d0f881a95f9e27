use crate::logging;
use crate::net::protocol::{ActionKind, OutboundFrame};
use crate::view::{Street, TableSnapshot};

/// What submitting the current slider amount would mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BetIntent {
	Check,
	Call { amount: u64 },
	Raise { by: u64 },
	AllIn { amount: u64 },
	Invalid,
}

impl BetIntent {
	pub fn is_valid(&self) -> bool {
		!matches!(self, BetIntent::Invalid)
	}

	pub fn to_frame(&self) -> Option<OutboundFrame> {
		match self {
			BetIntent::Check => Some(OutboundFrame::action(ActionKind::Check)),
			BetIntent::Call { .. } => Some(OutboundFrame::action(ActionKind::Call)),
			BetIntent::Raise { by } => Some(OutboundFrame::raise(*by)),
			BetIntent::AllIn { .. } => Some(OutboundFrame::action(ActionKind::AllIn)),
			BetIntent::Invalid => None,
		}
	}

	pub fn label(&self) -> String {
		match self {
			BetIntent::Check => "Check".to_string(),
			BetIntent::Call { amount } => format!("Call {}", amount),
			BetIntent::Raise { by } => format!("Raise {}", by),
			BetIntent::AllIn { .. } => "All-in".to_string(),
			BetIntent::Invalid => "Invalid amount".to_string(),
		}
	}
}

/// Classifies a chosen amount `bet` against call `call`, minimum raise
/// `min_raise` and stack `stack`. Rules apply in order: check, call, all-in,
/// then anything short of a full raise is invalid.
pub fn decide(call: u64, min_raise: u64, stack: u64, bet: u64) -> BetIntent {
	if bet == 0 && call == 0 {
		BetIntent::Check
	} else if bet == call {
		BetIntent::Call { amount: call }
	} else if bet >= stack {
		BetIntent::AllIn { amount: stack }
	} else if bet < call || bet < call.saturating_add(min_raise) {
		BetIntent::Invalid
	} else {
		BetIntent::Raise { by: bet - call }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BettingPhase {
	Idle,
	Deciding,
	Submitted,
}

/// Controls the local player can use right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionSet {
	pub fold: bool,
	pub check: bool,
	pub call: bool,
	pub raise: bool,
	pub submit: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BettingState {
	pub bet_amount: u64,
	pub call_amount: Option<u64>,
	pub min_raise: Option<u64>,
	pub stack: u64,
	pub submitted: bool,
	our_turn: bool,
}

impl BettingState {
	pub fn new() -> Self {
		Self::default()
	}

	/// Re-seeds from a fresh snapshot. Always releases the submission latch.
	pub fn sync(&mut self, snapshot: &TableSnapshot, local_nick: &str) {
		self.submitted = false;
		self.stack = snapshot.stack_of(local_nick);
		self.call_amount = snapshot.call_amount;
		self.min_raise = snapshot.min_raise;
		self.our_turn = snapshot.is_turn_of(local_nick) && snapshot.street != Some(Street::Showdown);

		if !snapshot.is_turn_of(local_nick) {
			self.bet_amount = 0;
		} else if let Some(call) = snapshot.call_amount {
			self.bet_amount = call.min(self.stack);
		}
		self.bet_amount = self.bet_amount.min(self.stack);
	}

	pub fn phase(&self) -> BettingPhase {
		if !self.our_turn {
			BettingPhase::Idle
		} else if self.submitted {
			BettingPhase::Submitted
		} else {
			BettingPhase::Deciding
		}
	}

	pub fn intent(&self) -> BetIntent {
		match self.call_amount {
			Some(call) => decide(call, self.min_raise.unwrap_or(0), self.stack, self.bet_amount),
			None => BetIntent::Invalid,
		}
	}

	pub fn actions(&self) -> ActionSet {
		if self.phase() != BettingPhase::Deciding {
			return ActionSet::default();
		}
		let call = self.call_amount.unwrap_or(0);
		ActionSet {
			fold: true,
			check: true,
			call: self.call_amount.is_some() && call > 0,
			raise: self.call_amount.is_some() && self.stack > call,
			submit: self.intent().is_valid(),
		}
	}

	pub fn can_submit(&self) -> bool {
		self.actions().submit
	}

	pub fn set_bet(&mut self, amount: u64) {
		self.bet_amount = amount.min(self.stack);
	}

	pub fn step_bet(&mut self, up: bool) {
		let step = self.min_raise.filter(|m| *m > 0).unwrap_or(1);
		let next = if up {
			self.bet_amount.saturating_add(step)
		} else {
			self.bet_amount.saturating_sub(step)
		};
		self.set_bet(next);
	}

	fn latch(&mut self, frame: OutboundFrame, desc: &str) -> Option<OutboundFrame> {
		self.submitted = true;
		logging::betting::submitted(desc);
		Some(frame)
	}

	/// Emits the slider decision. At most one command leaves per decision; later
	/// attempts return `None` until the next state frame arrives.
	pub fn submit(&mut self) -> Option<OutboundFrame> {
		if self.phase() != BettingPhase::Deciding {
			logging::betting::rejected("submit outside decision");
			return None;
		}
		let intent = self.intent();
		let frame = match intent.to_frame() {
			Some(frame) => frame,
			None => {
				logging::betting::rejected(&format!("amount {} not valid", self.bet_amount));
				return None;
			}
		};
		self.bet_amount = self.call_amount.unwrap_or(0).min(self.stack);
		self.latch(frame, &intent.label())
	}

	pub fn fold(&mut self) -> Option<OutboundFrame> {
		if self.phase() != BettingPhase::Deciding {
			return None;
		}
		self.latch(OutboundFrame::action(ActionKind::Fold), "Fold")
	}

	pub fn check(&mut self) -> Option<OutboundFrame> {
		if self.phase() != BettingPhase::Deciding {
			return None;
		}
		self.latch(OutboundFrame::action(ActionKind::Check), "Check")
	}

	/// Table-level commands. Not betting decisions, so the latch does not apply.
	pub fn start(&self) -> OutboundFrame {
		OutboundFrame::Start
	}

	pub fn new_hand(&self) -> OutboundFrame {
		OutboundFrame::action(ActionKind::NewHand)
	}
}
