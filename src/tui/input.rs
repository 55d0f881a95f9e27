use crossterm::event::KeyCode;

const TABLE_PROMPT: &str = "[f]old [k]check [←/→]amount [Enter]submit [s]tart [n]ew hand [t]alk [q]uit";
const CALIBRATE_PROMPT: &str =
	"[d]rag [c]lick [a]uto [Tab]target [[/]]rotate [g]fit [w]save [x]clear [u]ndo [Esc]done";
const MAX_CHAT_LEN: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationCommand {
	Enter,
	Drag,
	ClickSelect,
	AutoSequence,
	CycleTarget { forward: bool },
	Rotate { clockwise: bool },
	Fit,
	Save,
	Clear,
	Revert,
	Exit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputState {
	Table,
	Chatting { buffer: String },
	Calibrating,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEffect {
	None,
	SetPrompt(String),
	Fold,
	Check,
	Submit,
	StepBet { up: bool },
	AllIn,
	Start,
	NewHand,
	SendChat(String),
	Calibrate(CalibrationCommand),
	Quit,
}

impl Default for InputState {
	fn default() -> Self {
		Self::Table
	}
}

impl InputState {
	pub fn is_chatting(&self) -> bool {
		matches!(self, Self::Chatting { .. })
	}

	pub fn is_calibrating(&self) -> bool {
		matches!(self, Self::Calibrating)
	}

	pub fn table_prompt() -> &'static str {
		TABLE_PROMPT
	}

	pub fn enter_calibration() -> (Self, InputEffect) {
		(Self::Calibrating, InputEffect::SetPrompt(CALIBRATE_PROMPT.into()))
	}

	pub fn handle_key(self, key: KeyCode) -> (Self, InputEffect) {
		match self {
			Self::Table => handle_table(key),
			Self::Chatting { buffer } => handle_chatting(buffer, key),
			Self::Calibrating => handle_calibrating(key),
		}
	}
}

fn handle_table(key: KeyCode) -> (InputState, InputEffect) {
	let effect = match key {
		KeyCode::Char('q') | KeyCode::Esc => InputEffect::Quit,
		KeyCode::Char('f') => InputEffect::Fold,
		KeyCode::Char('k') => InputEffect::Check,
		KeyCode::Enter => InputEffect::Submit,
		KeyCode::Left => InputEffect::StepBet { up: false },
		KeyCode::Right => InputEffect::StepBet { up: true },
		KeyCode::Char('a') => InputEffect::AllIn,
		KeyCode::Char('s') => InputEffect::Start,
		KeyCode::Char('n') => InputEffect::NewHand,
		KeyCode::Char('t') => {
			return (
				InputState::Chatting { buffer: String::new() },
				InputEffect::SetPrompt("Say: ".into()),
			);
		}
		KeyCode::F(2) => InputEffect::Calibrate(CalibrationCommand::Enter),
		_ => InputEffect::None,
	};
	(InputState::Table, effect)
}

fn handle_chatting(mut buffer: String, key: KeyCode) -> (InputState, InputEffect) {
	match key {
		KeyCode::Esc => (InputState::Table, InputEffect::SetPrompt(TABLE_PROMPT.into())),
		KeyCode::Enter => {
			let text = buffer.trim().to_string();
			if text.is_empty() {
				(InputState::Table, InputEffect::SetPrompt(TABLE_PROMPT.into()))
			} else {
				(InputState::Table, InputEffect::SendChat(text))
			}
		}
		KeyCode::Backspace => {
			buffer.pop();
			let prompt = format!("Say: {}", buffer);
			(InputState::Chatting { buffer }, InputEffect::SetPrompt(prompt))
		}
		KeyCode::Char(c) => {
			if buffer.chars().count() < MAX_CHAT_LEN {
				buffer.push(c);
			}
			let prompt = format!("Say: {}", buffer);
			(InputState::Chatting { buffer }, InputEffect::SetPrompt(prompt))
		}
		_ => (InputState::Chatting { buffer }, InputEffect::None),
	}
}

fn handle_calibrating(key: KeyCode) -> (InputState, InputEffect) {
	let command = match key {
		KeyCode::Esc | KeyCode::F(2) => {
			return (InputState::Table, InputEffect::Calibrate(CalibrationCommand::Exit));
		}
		KeyCode::Char('d') => CalibrationCommand::Drag,
		KeyCode::Char('c') => CalibrationCommand::ClickSelect,
		KeyCode::Char('a') => CalibrationCommand::AutoSequence,
		KeyCode::Tab => CalibrationCommand::CycleTarget { forward: true },
		KeyCode::BackTab => CalibrationCommand::CycleTarget { forward: false },
		KeyCode::Char(']') => CalibrationCommand::Rotate { clockwise: true },
		KeyCode::Char('[') => CalibrationCommand::Rotate { clockwise: false },
		KeyCode::Char('g') => CalibrationCommand::Fit,
		KeyCode::Char('w') => CalibrationCommand::Save,
		KeyCode::Char('x') => CalibrationCommand::Clear,
		KeyCode::Char('u') => CalibrationCommand::Revert,
		_ => return (InputState::Calibrating, InputEffect::None),
	};
	(InputState::Calibrating, InputEffect::Calibrate(command))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_table_keys() {
		let (state, effect) = InputState::Table.handle_key(KeyCode::Char('f'));
		assert_eq!(state, InputState::Table);
		assert_eq!(effect, InputEffect::Fold);

		let (_, effect) = InputState::Table.handle_key(KeyCode::Enter);
		assert_eq!(effect, InputEffect::Submit);

		let (_, effect) = InputState::Table.handle_key(KeyCode::Left);
		assert_eq!(effect, InputEffect::StepBet { up: false });

		let (_, effect) = InputState::Table.handle_key(KeyCode::Char('q'));
		assert_eq!(effect, InputEffect::Quit);
	}

	#[test]
	fn test_chat_round_trip() {
		let (mut state, _) = InputState::Table.handle_key(KeyCode::Char('t'));
		assert!(state.is_chatting());

		for c in "hi!".chars() {
			state = state.handle_key(KeyCode::Char(c)).0;
		}
		let (state, effect) = state.handle_key(KeyCode::Backspace);
		assert_eq!(effect, InputEffect::SetPrompt("Say: hi".into()));

		let (state, effect) = state.handle_key(KeyCode::Enter);
		assert_eq!(state, InputState::Table);
		assert_eq!(effect, InputEffect::SendChat("hi".into()));
	}

	#[test]
	fn test_chat_keys_do_not_act() {
		let (state, _) = InputState::Table.handle_key(KeyCode::Char('t'));
		let (state, effect) = state.handle_key(KeyCode::Char('f'));
		assert!(state.is_chatting());
		assert_ne!(effect, InputEffect::Fold);
	}

	#[test]
	fn test_empty_chat_sends_nothing() {
		let state = InputState::Chatting { buffer: "   ".into() };
		let (state, effect) = state.handle_key(KeyCode::Enter);
		assert_eq!(state, InputState::Table);
		assert!(matches!(effect, InputEffect::SetPrompt(_)));
	}

	#[test]
	fn test_calibration_keys() {
		let (state, effect) = InputState::Table.handle_key(KeyCode::F(2));
		assert_eq!(state, InputState::Table);
		assert_eq!(effect, InputEffect::Calibrate(CalibrationCommand::Enter));

		let (state, _) = InputState::enter_calibration();
		let (state, effect) = state.handle_key(KeyCode::Char('a'));
		assert!(state.is_calibrating());
		assert_eq!(effect, InputEffect::Calibrate(CalibrationCommand::AutoSequence));

		let (state, effect) = state.handle_key(KeyCode::Esc);
		assert_eq!(state, InputState::Table);
		assert_eq!(effect, InputEffect::Calibrate(CalibrationCommand::Exit));
	}
}
