use std::time::Instant;

use crossterm::event::{KeyCode, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
	layout::Rect,
	style::{Color, Modifier, Style},
	widgets::{Block, Borders, Paragraph},
	Frame,
};

use crate::animation::{AnimationQueue, plan};
use crate::calibration::{CalibrationController, CalibrationEffect, CalibrationMode, PointerEvent, revert};
use crate::layout::{LayoutEngine, MarkerKey, OverrideMap, SurfaceSize};
use crate::net::{ConnectionStatus, InboundFrame, OutboundFrame};
use crate::reducer::{Applied, StateReducer};
use crate::storage::{CardOffsets, PersistedCalibration, Storage};
use crate::tui::input::{CalibrationCommand, InputEffect, InputState};
use crate::tui::layout::{ScreenLayout, SurfaceProjection};
use crate::tui::widgets::{BettingPanel, CalibrationOverlay, LogWidget, TableSurfaceWidget};

const ROTATE_STEP: f64 = 15.0;

pub enum TableUIAction {
	None,
	Send(OutboundFrame),
	Quit,
}

/// Everything the table screen needs between frames.
pub struct TableUI {
	reducer: StateReducer,
	engine: LayoutEngine,
	calibration: CalibrationController,
	animations: AnimationQueue,
	storage: Storage,
	card_offsets: CardOffsets,
	surface: SurfaceSize,
	host_label: String,
	calibration_allowed: bool,
	before_calibration: OverrideMap,
	last_target: Option<MarkerKey>,
	projection: SurfaceProjection,
	pub input_state: InputState,
	pub status_message: Option<String>,
	pub connection: ConnectionStatus,
}

impl TableUI {
	pub fn new(
		local_nick: &str,
		persisted: PersistedCalibration,
		storage: Storage,
		capacity: usize,
		host_label: &str,
		surface: SurfaceSize,
	) -> Self {
		let mut overrides = persisted.overrides;
		if let Some(pot) = persisted.pot {
			if !overrides.contains(MarkerKey::Pot) {
				overrides.set_point(MarkerKey::Pot, pot);
			}
		}

		Self {
			reducer: StateReducer::new(local_nick),
			engine: LayoutEngine::new(persisted.layout, overrides, capacity),
			calibration: CalibrationController::new(capacity, host_label),
			animations: AnimationQueue::new(),
			storage,
			card_offsets: persisted.card_offsets,
			surface,
			host_label: host_label.to_string(),
			calibration_allowed: false,
			before_calibration: OverrideMap::new(),
			last_target: None,
			projection: SurfaceProjection::default(),
			input_state: InputState::default(),
			status_message: Some(InputState::table_prompt().to_string()),
			connection: ConnectionStatus::Connecting,
		}
	}

	pub fn allow_calibration(&mut self, allowed: bool) {
		self.calibration_allowed = allowed;
	}

	pub fn reducer(&self) -> &StateReducer {
		&self.reducer
	}

	pub fn engine(&self) -> &LayoutEngine {
		&self.engine
	}

	pub fn calibration(&self) -> &CalibrationController {
		&self.calibration
	}

	pub fn animations(&self) -> &AnimationQueue {
		&self.animations
	}

	/// Seats to lay out: every seat while calibrating, otherwise the occupied ones.
	fn visible_seats(&self) -> usize {
		if self.calibration.is_active() {
			self.engine.capacity()
		} else {
			self.reducer.snapshot().players.len()
		}
	}

	pub fn apply_frame(&mut self, frame: InboundFrame, now: Instant) {
		if let Applied::State { previous } = self.reducer.apply(frame, now) {
			let snapshot = self.reducer.snapshot();
			let (layout, _) = self.engine.resolve(snapshot.players.len());
			self.animations.schedule(plan(&previous, snapshot, &layout, now));
		}
	}

	pub fn tick(&mut self, now: Instant) {
		self.reducer.tick(now);
		self.animations.tick(now);
	}

	pub fn handle_key(&mut self, key: KeyCode) -> TableUIAction {
		let old_state = std::mem::take(&mut self.input_state);
		let (new_state, effect) = old_state.handle_key(key);
		self.input_state = new_state;
		self.process_effect(effect)
	}

	fn send(frame: Option<OutboundFrame>) -> TableUIAction {
		match frame {
			Some(frame) => TableUIAction::Send(frame),
			None => TableUIAction::None,
		}
	}

	fn process_effect(&mut self, effect: InputEffect) -> TableUIAction {
		let betting = self.reducer.betting_mut();
		match effect {
			InputEffect::None => TableUIAction::None,
			InputEffect::SetPrompt(prompt) => {
				self.status_message = Some(prompt);
				TableUIAction::None
			}
			InputEffect::Fold => Self::send(betting.fold()),
			InputEffect::Check => Self::send(betting.check()),
			InputEffect::Submit => Self::send(betting.submit()),
			InputEffect::StepBet { up } => {
				betting.step_bet(up);
				TableUIAction::None
			}
			InputEffect::AllIn => {
				betting.set_bet(u64::MAX);
				TableUIAction::None
			}
			InputEffect::Start => TableUIAction::Send(betting.start()),
			InputEffect::NewHand => TableUIAction::Send(betting.new_hand()),
			InputEffect::SendChat(text) => {
				self.status_message = Some(InputState::table_prompt().to_string());
				TableUIAction::Send(OutboundFrame::Chat {
					from: self.reducer.local_nick().to_string(),
					text,
				})
			}
			InputEffect::Calibrate(command) => {
				self.run_calibration(command);
				TableUIAction::None
			}
			InputEffect::Quit => TableUIAction::Quit,
		}
	}

	fn run_calibration(&mut self, command: CalibrationCommand) {
		let seat_count = self.visible_seats();

		match command {
			CalibrationCommand::Enter => {
				if !self.calibration_allowed {
					self.status_message = Some("Calibration is disabled (start with --calibrate)".into());
					return;
				}
				self.before_calibration = self.engine.overrides.clone();
				self.calibration.enter_drag();
				let (state, effect) = InputState::enter_calibration();
				self.input_state = state;
				self.process_effect(effect);
			}
			CalibrationCommand::Drag => self.calibration.enter_drag(),
			CalibrationCommand::ClickSelect => self.calibration.enter_click_select(),
			CalibrationCommand::AutoSequence => self.calibration.enter_auto_sequence(),
			CalibrationCommand::CycleTarget { forward } => {
				if let Some(key) = self.calibration.cycle_target(forward) {
					self.last_target = Some(key);
					self.status_message = Some(format!("Target: {}", self.calibration.label_for(key)));
				}
			}
			CalibrationCommand::Rotate { clockwise } => {
				let Some(seat) = self.last_target.and_then(|k| match k {
					MarkerKey::Stack(n) => Some(n),
					_ => None,
				}) else {
					self.status_message = Some("Select a stack to rotate".into());
					return;
				};
				let (layout, _) = self.engine.resolve(seat_count);
				let delta = if clockwise { ROTATE_STEP } else { -ROTATE_STEP };
				if let Some(rotation) = self.calibration.rotate_stack(&mut self.engine, &layout, seat, delta) {
					self.status_message = Some(format!("Stack Seat {} at {:.0}°", seat, rotation));
				}
			}
			CalibrationCommand::Fit => {
				self.status_message = Some(match self.calibration.fit(&mut self.engine, self.surface) {
					Ok(c) => format!(
						"Fitted rx={:.6} ry={:.6} angle={:.6}",
						c.radius_x, c.radius_y, c.angle_offset
					),
					Err(e) => e.to_string(),
				});
			}
			CalibrationCommand::Save => {
				self.status_message = Some(match self.calibration.save(&self.engine, &self.storage) {
					Ok(_) => format!("Saved {} positions to {}", self.engine.overrides.len(), self.storage.dir().display()),
					Err(e) => {
						crate::logging::calibration::storage(&e.to_string());
						format!("Save failed: {}", e)
					}
				});
				self.before_calibration = self.engine.overrides.clone();
			}
			CalibrationCommand::Clear => {
				self.calibration.clear_overrides(&mut self.engine, &self.storage);
				self.calibration.enter_drag();
				self.before_calibration = OverrideMap::new();
				self.status_message = Some("All custom positions removed".into());
			}
			CalibrationCommand::Revert => {
				revert(&mut self.engine, &self.before_calibration);
				self.status_message = Some("Unsaved edits discarded".into());
			}
			CalibrationCommand::Exit => {
				self.calibration.exit();
				self.last_target = None;
				self.status_message = Some(InputState::table_prompt().to_string());
			}
		}
	}

	pub fn handle_mouse(&mut self, mouse: MouseEvent) -> TableUIAction {
		if !self.calibration.is_active() {
			return TableUIAction::None;
		}
		// Presses must land on the surface. Moves and releases anywhere still
		// reach the gesture so it always ends.
		let (column, row) = (mouse.column, mouse.row);
		let pointer = match (mouse.kind, self.calibration.mode()) {
			(MouseEventKind::Down(MouseButton::Left), mode) => {
				let Some(point) = self.projection.to_percent(column, row) else {
					return TableUIAction::None;
				};
				match mode {
					CalibrationMode::Drag { .. } => PointerEvent::Down(point),
					_ => PointerEvent::Click(point),
				}
			}
			(MouseEventKind::Drag(MouseButton::Left), _) => match self.projection.to_percent_clamped(column, row) {
				Some(point) => PointerEvent::Move(point),
				None => return TableUIAction::None,
			},
			(MouseEventKind::Up(MouseButton::Left), _) => match self.projection.to_percent_clamped(column, row) {
				Some(point) => PointerEvent::Up(point),
				None => return TableUIAction::None,
			},
			_ => return TableUIAction::None,
		};

		let players = self.reducer.snapshot().players.clone();
		let (layout, _) = self.engine.resolve(self.visible_seats());
		let effect = self.calibration.handle_pointer(pointer, &mut self.engine, &layout, &players);

		match effect {
			CalibrationEffect::Grabbed(key) => {
				self.last_target = Some(key);
				self.status_message = Some(format!("Moving {}", self.calibration.label_for(key)));
			}
			CalibrationEffect::Released(key) | CalibrationEffect::Committed(key, _) => {
				self.last_target = Some(key);
				if let Some(p) = self.engine.overrides.point(key) {
					self.status_message =
						Some(format!("{} at ({:.1}, {:.1})", self.calibration.label_for(key), p.x, p.y));
				}
			}
			CalibrationEffect::Recorded(entry) => {
				self.status_message = Some(format!("{} placed, click the next position", entry.label));
			}
			CalibrationEffect::SequenceComplete { points } => {
				self.status_message = Some(format!("All {} positions placed", points));
				self.calibration.enter_drag();
			}
			CalibrationEffect::Moved(..) | CalibrationEffect::None => {}
		}
		TableUIAction::None
	}

	pub fn render(&mut self, frame: &mut Frame) {
		let now = Instant::now();
		let screen = ScreenLayout::compute(frame.area());
		self.projection = SurfaceProjection::new(Block::default().borders(Borders::ALL).inner(screen.surface));

		let layout = self.engine.resolve_and_materialize(self.visible_seats());
		let frames = self.animations.frames(now);

		let overlay = self.calibration.is_active().then(|| CalibrationOverlay {
			mode: self.calibration.mode().name(),
			selected: match self.calibration.mode() {
				CalibrationMode::ClickSelect { target } => *target,
				_ => self.last_target,
			},
			host_label: &self.host_label,
		});

		let snapshot = self.reducer.snapshot();
		let table = TableSurfaceWidget::new(snapshot, &layout, self.reducer.local_nick(), &self.host_label)
			.card_offsets(self.card_offsets, self.surface)
			.frames(&frames)
			.overlay(overlay);
		frame.render_widget(table, screen.surface);

		let log = LogWidget::new(&snapshot.recent_actions, self.reducer.chat().collect());
		frame.render_widget(log, screen.side);

		frame.render_widget(BettingPanel::new(self.reducer.betting()), screen.controls);

		self.render_status(frame, screen.status, now);
	}

	fn render_status(&self, frame: &mut Frame, area: Rect, now: Instant) {
		let (text, style) = match self.reducer.notice(now) {
			Some(notice) => (
				notice.to_string(),
				Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
			),
			None => (
				self.status_message.clone().unwrap_or_default(),
				Style::default().fg(Color::White),
			),
		};

		let connection_style = match self.connection {
			ConnectionStatus::Open => Style::default().fg(Color::Green),
			ConnectionStatus::Connecting => Style::default().fg(Color::Yellow),
			_ => Style::default().fg(Color::Red),
		};

		let status = Paragraph::new(text).style(style).block(
			Block::default()
				.borders(Borders::ALL)
				.border_style(connection_style)
				.title(format!(" {} ", self.connection.label())),
		);
		frame.render_widget(status, area);
	}
}
