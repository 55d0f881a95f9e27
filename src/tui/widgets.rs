use ratatui::{
	buffer::Buffer,
	layout::Rect,
	style::{Color, Modifier, Style},
	text::{Line, Span},
	widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::animation::{MotionFrame, MotionKind};
use crate::betting::{BettingPhase, BettingState};
use crate::layout::{MarkerKey, ResolvedLayout, SurfaceSize};
use crate::reducer::ChatLine;
use crate::storage::CardOffsets;
use crate::tui::layout::SurfaceProjection;
use crate::view::{Card, RecentAction, TableSnapshot};

const SEAT_WIDTH: u16 = 18;
const SEAT_HEIGHT: u16 = 3;

fn card_style(card: &Card) -> Style {
	match card {
		Card::Back => Style::default().fg(Color::Blue),
		c if c.is_red() => Style::default().fg(Color::Red),
		_ => Style::default().fg(Color::White),
	}
}

fn render_card(card: &Card) -> Span<'static> {
	Span::styled(card.display(), card_style(card))
}

fn render_cards(cards: &[Card]) -> Line<'static> {
	let mut spans = Vec::new();
	for (i, card) in cards.iter().enumerate() {
		if i > 0 {
			spans.push(Span::raw(" "));
		}
		spans.push(render_card(card));
	}
	Line::from(spans)
}

fn truncate(name: &str, max: usize) -> String {
	if name.chars().count() > max {
		let head: String = name.chars().take(max.saturating_sub(1)).collect();
		format!("{}…", head)
	} else {
		name.to_string()
	}
}

pub struct SeatWidget<'a> {
	nick: &'a str,
	position: Option<&'static str>,
	is_actor: bool,
	is_local: bool,
	is_winner: bool,
}

impl<'a> SeatWidget<'a> {
	pub fn new(nick: &'a str) -> Self {
		Self {
			nick,
			position: None,
			is_actor: false,
			is_local: false,
			is_winner: false,
		}
	}

	pub fn position(mut self, position: Option<&'static str>) -> Self {
		self.position = position;
		self
	}

	pub fn actor(mut self, is_actor: bool) -> Self {
		self.is_actor = is_actor;
		self
	}

	pub fn local(mut self, is_local: bool) -> Self {
		self.is_local = is_local;
		self
	}

	pub fn winner(mut self, is_winner: bool) -> Self {
		self.is_winner = is_winner;
		self
	}
}

impl Widget for SeatWidget<'_> {
	fn render(self, area: Rect, buf: &mut Buffer) {
		let border_style = if self.is_winner {
			Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
		} else if self.is_actor {
			Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
		} else if self.is_local {
			Style::default().fg(Color::Cyan)
		} else {
			Style::default().fg(Color::White)
		};

		let mut block = Block::default()
			.borders(Borders::ALL)
			.border_style(border_style)
			.title(Span::styled(truncate(self.nick, 12), border_style));

		if self.is_winner {
			block = block.title_top(Line::from(Span::styled("$", Style::default().fg(Color::Yellow))).right_aligned());
		} else if self.is_local {
			block = block.title_top(Line::from(Span::styled("★", Style::default().fg(Color::Cyan))).right_aligned());
		}

		let inner = block.inner(area);
		block.render(area, buf);

		if inner.height == 0 || inner.width < 4 {
			return;
		}

		let line = match (self.is_actor, self.position) {
			(true, _) => Line::styled("to act", Style::default().fg(Color::Yellow)),
			(false, Some(label)) => Line::styled(label, Style::default().fg(Color::DarkGray)),
			(false, None) => Line::raw(""),
		};
		Paragraph::new(line).render(inner, buf);
	}
}

pub struct BoardWidget<'a> {
	board: &'a [Card],
}

impl<'a> BoardWidget<'a> {
	pub fn new(board: &'a [Card]) -> Self {
		Self { board }
	}
}

impl Widget for BoardWidget<'_> {
	fn render(self, area: Rect, buf: &mut Buffer) {
		let mut spans: Vec<Span> = Vec::new();

		spans.push(Span::styled("[ ", Style::default().fg(Color::DarkGray)));

		for i in 0..5 {
			if i > 0 {
				spans.push(Span::raw(" "));
			}
			if let Some(card) = self.board.get(i) {
				spans.push(render_card(card));
			} else {
				spans.push(Span::styled("--", Style::default().fg(Color::DarkGray)));
			}
		}

		spans.push(Span::styled(" ]", Style::default().fg(Color::DarkGray)));

		Paragraph::new(Line::from(spans)).render(area, buf);
	}
}

/// Marker overlay drawn while calibrating.
pub struct CalibrationOverlay<'a> {
	pub mode: &'static str,
	pub selected: Option<MarkerKey>,
	pub host_label: &'a str,
}

/// The table artwork: host, pot, board, seats and everything in flight,
/// all placed from a resolved layout.
pub struct TableSurfaceWidget<'a> {
	snapshot: &'a TableSnapshot,
	layout: &'a ResolvedLayout,
	local_nick: &'a str,
	host_label: &'a str,
	offsets: CardOffsets,
	surface: SurfaceSize,
	frames: &'a [MotionFrame],
	overlay: Option<CalibrationOverlay<'a>>,
}

impl<'a> TableSurfaceWidget<'a> {
	pub fn new(snapshot: &'a TableSnapshot, layout: &'a ResolvedLayout, local_nick: &'a str, host_label: &'a str) -> Self {
		Self {
			snapshot,
			layout,
			local_nick,
			host_label,
			offsets: CardOffsets::default(),
			surface: SurfaceSize::default(),
			frames: &[],
			overlay: None,
		}
	}

	pub fn card_offsets(mut self, offsets: CardOffsets, surface: SurfaceSize) -> Self {
		self.offsets = offsets;
		self.surface = surface;
		self
	}

	pub fn frames(mut self, frames: &'a [MotionFrame]) -> Self {
		self.frames = frames;
		self
	}

	pub fn overlay(mut self, overlay: Option<CalibrationOverlay<'a>>) -> Self {
		self.overlay = overlay;
		self
	}

	fn cards_for(&self, nick: &str) -> Vec<Card> {
		if nick == self.local_nick {
			return self.snapshot.hole_cards();
		}
		let revealed = self.snapshot.revealed_cards(nick);
		if !revealed.is_empty() {
			revealed
		} else if self.snapshot.started {
			vec![Card::Back, Card::Back]
		} else {
			Vec::new()
		}
	}

	fn render_seats(&self, projection: &SurfaceProjection, buf: &mut Buffer) {
		for &(seat, point) in &self.layout.seats {
			let Some(nick) = self.snapshot.players.get(seat - 1) else {
				continue;
			};

			let rect = projection.centered_rect(point, SEAT_WIDTH, SEAT_HEIGHT);
			SeatWidget::new(nick)
				.position(self.snapshot.position_label(nick))
				.actor(self.snapshot.is_turn_of(nick))
				.local(nick == self.local_nick)
				.winner(self.snapshot.is_winner(nick))
				.render(rect, buf);

			let cards = self.cards_for(nick);
			if !cards.is_empty() {
				let offset = if point.y < 50.0 {
					self.offsets.player_card_offset_top
				} else {
					self.offsets.player_card_offset_bottom
				};
				let row = projection.centered_rect(point, 8, 1);
				let row = projection.shift_rows(row, projection.offset_rows(offset, self.surface));
				Paragraph::new(render_cards(&cards)).render(row, buf);
			}

			if let Some(anchor) = self.layout.stack(seat) {
				let text = format!("● {}", self.snapshot.stack_of(nick));
				let rect = projection.centered_rect(anchor.point(), text.chars().count() as u16, 1);
				buf.set_string(rect.x, rect.y, &text, Style::default().fg(Color::Green));
			}

			if let (Some(label), Some(chip)) = (self.snapshot.position_label(nick), self.layout.position_chip(seat)) {
				let (x, y) = projection.to_cell(chip);
				buf.set_string(x, y, label, Style::default().fg(Color::Black).bg(Color::White));
			}
		}
	}

	fn render_frames(&self, projection: &SurfaceProjection, buf: &mut Buffer) {
		for frame in self.frames {
			let (x, y) = projection.to_cell(frame.point);
			let color = if frame.opacity < 0.5 { Color::DarkGray } else { Color::Yellow };
			let glyph = match frame.kind {
				MotionKind::CardToSeat { .. } => "▓",
				MotionKind::ChipToPot { .. } => "●",
			};
			buf.set_string(x, y, glyph, Style::default().fg(color));
		}
	}

	fn render_overlay(&self, overlay: &CalibrationOverlay, projection: &SurfaceProjection, buf: &mut Buffer) {
		for (key, point) in self.layout.markers() {
			let (x, y) = projection.to_cell(point);
			let style = if overlay.selected == Some(key) {
				Style::default().fg(Color::Black).bg(Color::Yellow)
			} else {
				Style::default().fg(Color::Magenta)
			};
			let label = match key {
				MarkerKey::Host => overlay.host_label.to_string(),
				other => other.to_string(),
			};
			buf.set_string(x, y, format!("+{}", label), style);
		}
	}
}

impl Widget for TableSurfaceWidget<'_> {
	fn render(self, area: Rect, buf: &mut Buffer) {
		let mut title = format!(" {} ", self.snapshot.street_name());
		if let Some(overlay) = &self.overlay {
			title = format!(" Calibrating: {} ", overlay.mode);
		}

		let block = Block::default()
			.borders(Borders::ALL)
			.border_style(Style::default().fg(Color::Green))
			.title(title);
		let inner = block.inner(area);
		block.render(area, buf);

		if inner.width < SEAT_WIDTH || inner.height < SEAT_HEIGHT {
			return;
		}
		let projection = SurfaceProjection::new(inner);

		if let Some(host) = self.layout.host {
			let rect = projection.centered_rect(host, self.host_label.chars().count() as u16 + 2, 1);
			buf.set_string(rect.x, rect.y, format!("◆ {}", self.host_label), Style::default().fg(Color::Magenta));
		}

		if let Some(pot) = self.layout.pot {
			let rect = projection.centered_rect(pot, 15, 1);
			let board = projection.shift_rows(rect, projection.offset_rows(self.offsets.community_card_offset_y, self.surface));
			BoardWidget::new(&self.snapshot.community_cards()).render(board, buf);
		}

		if let Some(pot_value) = self.layout.pot_value {
			let text = format!("Pot: {}", self.snapshot.pot);
			let rect = projection.centered_rect(pot_value, text.chars().count() as u16, 1);
			let rect = projection.shift_rows(rect, -1);
			buf.set_string(
				rect.x,
				rect.y,
				&text,
				Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
			);
		}

		self.render_seats(&projection, buf);
		self.render_frames(&projection, buf);

		if let Some(overlay) = &self.overlay {
			self.render_overlay(overlay, &projection, buf);
		}
	}
}

pub struct LogWidget<'a> {
	actions: &'a [RecentAction],
	chat: Vec<&'a ChatLine>,
}

impl<'a> LogWidget<'a> {
	pub fn new(actions: &'a [RecentAction], chat: Vec<&'a ChatLine>) -> Self {
		Self { actions, chat }
	}
}

fn action_line(action: &RecentAction) -> Line<'static> {
	let mut spans = vec![
		Span::styled(format!("{} ", action.player), Style::default().fg(Color::Green)),
		Span::raw(action.action.clone()),
	];
	if let Some(amount) = action.amount.filter(|a| *a > 0) {
		spans.push(Span::styled(format!(" {}", amount), Style::default().fg(Color::Yellow)));
	}
	Line::from(spans)
}

impl Widget for LogWidget<'_> {
	fn render(self, area: Rect, buf: &mut Buffer) {
		let actions_height = (self.actions.len() as u16 + 2)
			.min((area.height / 2).max(3))
			.min(area.height);
		let actions_area = Rect { height: actions_height, ..area };
		let chat_area = Rect {
			y: area.y + actions_height,
			height: area.height.saturating_sub(actions_height),
			..area
		};

		let block = Block::default()
			.borders(Borders::ALL)
			.border_style(Style::default().fg(Color::DarkGray))
			.title(" This street ");
		let inner = block.inner(actions_area);
		block.render(actions_area, buf);
		let start = self.actions.len().saturating_sub(inner.height as usize);
		let lines: Vec<Line> = self.actions[start..].iter().map(action_line).collect();
		Paragraph::new(lines).render(inner, buf);

		let block = Block::default()
			.borders(Borders::ALL)
			.border_style(Style::default().fg(Color::Blue))
			.title(" Chat ");
		let inner = block.inner(chat_area);
		block.render(chat_area, buf);

		let start = self.chat.len().saturating_sub(inner.height as usize);
		let lines: Vec<Line> = self.chat[start..]
			.iter()
			.map(|msg| {
				Line::from(vec![
					Span::styled(format!("{}: ", msg.from), Style::default().fg(Color::Green)),
					Span::raw(msg.text.clone()),
				])
			})
			.collect();
		Paragraph::new(lines).wrap(Wrap { trim: true }).render(inner, buf);
	}
}

/// Amount selector and the actions it would currently allow.
pub struct BettingPanel<'a> {
	betting: &'a BettingState,
}

impl<'a> BettingPanel<'a> {
	pub fn new(betting: &'a BettingState) -> Self {
		Self { betting }
	}
}

fn control(label: &str, enabled: bool) -> Span<'static> {
	let style = if enabled {
		Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
	} else {
		Style::default().fg(Color::DarkGray)
	};
	Span::styled(format!("[{}] ", label), style)
}

impl Widget for BettingPanel<'_> {
	fn render(self, area: Rect, buf: &mut Buffer) {
		let (title, border) = match self.betting.phase() {
			BettingPhase::Deciding => (" Your Turn ", Color::Yellow),
			BettingPhase::Submitted => (" Sent ", Color::Cyan),
			BettingPhase::Idle => (" Betting ", Color::DarkGray),
		};
		let block = Block::default()
			.borders(Borders::ALL)
			.border_style(Style::default().fg(border))
			.title(title);
		let inner = block.inner(area);
		block.render(area, buf);

		let actions = self.betting.actions();
		let intent = self.betting.intent();

		let amount_line = Line::from(vec![
			Span::raw(format!("Amount {} / {}  ", self.betting.bet_amount, self.betting.stack)),
			Span::styled(
				intent.label(),
				if intent.is_valid() {
					Style::default().fg(Color::Green)
				} else {
					Style::default().fg(Color::Red)
				},
			),
		]);

		let controls_line = if self.betting.phase() == BettingPhase::Submitted {
			Line::styled("Waiting for the table…", Style::default().fg(Color::Cyan))
		} else {
			Line::from(vec![
				control("Fold", actions.fold),
				control("Check", actions.check),
				control(&format!("Call {}", self.betting.call_amount.unwrap_or(0)), actions.call),
				control("Raise", actions.raise),
				control(&intent.label(), actions.submit),
			])
		};

		Paragraph::new(vec![amount_line, controls_line]).render(inner, buf);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_truncate_long_names() {
		assert_eq!(truncate("ana", 12), "ana");
		assert_eq!(truncate("abcdefghijklmnop", 5), "abcd…");
	}

	#[test]
	fn test_render_cards_spacing() {
		let line = render_cards(&[Card::parse("AH").unwrap(), Card::Back]);
		let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
		assert_eq!(text, "A♥ ▓▓");
	}
}
