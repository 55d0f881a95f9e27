use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::layout::{Point, SurfaceSize};

/// Maps percent-of-surface coordinates onto terminal cells and back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceProjection {
	pub area: Rect,
}

impl SurfaceProjection {
	pub fn new(area: Rect) -> Self {
		Self { area }
	}

	pub fn to_cell(&self, point: Point) -> (u16, u16) {
		let span_x = self.area.width.saturating_sub(1) as f64;
		let span_y = self.area.height.saturating_sub(1) as f64;
		let x = (point.x * span_x / 100.0).round().clamp(0.0, span_x) as u16;
		let y = (point.y * span_y / 100.0).round().clamp(0.0, span_y) as u16;
		(self.area.x + x, self.area.y + y)
	}

	/// `None` when the cell lies outside the surface.
	pub fn to_percent(&self, column: u16, row: u16) -> Option<Point> {
		let inside = column >= self.area.x
			&& column < self.area.x + self.area.width
			&& row >= self.area.y
			&& row < self.area.y + self.area.height;
		if !inside {
			return None;
		}
		let span_x = self.area.width.saturating_sub(1).max(1) as f64;
		let span_y = self.area.height.saturating_sub(1).max(1) as f64;
		Some(Point::new(
			(column - self.area.x) as f64 * 100.0 / span_x,
			(row - self.area.y) as f64 * 100.0 / span_y,
		))
	}

	/// Like `to_percent`, but a cell outside the surface is pulled onto its
	/// nearest edge. `None` only before the surface has been laid out.
	pub fn to_percent_clamped(&self, column: u16, row: u16) -> Option<Point> {
		if self.area.is_empty() {
			return None;
		}
		let column = column.clamp(self.area.x, self.area.right() - 1);
		let row = row.clamp(self.area.y, self.area.bottom() - 1);
		self.to_percent(column, row)
	}

	/// Converts a vertical offset given in artwork pixels into terminal rows.
	pub fn offset_rows(&self, pixels: f64, surface: SurfaceSize) -> i32 {
		if surface.height <= 0.0 {
			return 0;
		}
		(pixels * self.area.height as f64 / surface.height).round() as i32
	}

	/// A `width` x `height` box centred on `point`, kept inside the surface.
	pub fn centered_rect(&self, point: Point, width: u16, height: u16) -> Rect {
		let width = width.min(self.area.width);
		let height = height.min(self.area.height);
		let (cx, cy) = self.to_cell(point);
		let max_x = self.area.x + self.area.width - width;
		let max_y = self.area.y + self.area.height - height;
		let x = cx.saturating_sub(width / 2).clamp(self.area.x, max_x);
		let y = cy.saturating_sub(height / 2).clamp(self.area.y, max_y);
		Rect::new(x, y, width, height)
	}

	/// Shifts a rect vertically by `rows`, clamped to the surface.
	pub fn shift_rows(&self, rect: Rect, rows: i32) -> Rect {
		let min_y = self.area.y as i32;
		let max_y = (self.area.y + self.area.height).saturating_sub(rect.height) as i32;
		let y = (rect.y as i32 + rows).clamp(min_y, max_y.max(min_y));
		Rect { y: y as u16, ..rect }
	}
}

/// Top-level split of the terminal.
pub struct ScreenLayout {
	pub surface: Rect,
	pub side: Rect,
	pub controls: Rect,
	pub status: Rect,
}

impl ScreenLayout {
	pub fn compute(area: Rect) -> Self {
		let rows = Layout::default()
			.direction(Direction::Vertical)
			.constraints([
				Constraint::Min(12),
				Constraint::Length(4),
				Constraint::Length(3),
			])
			.split(area);

		let columns = Layout::default()
			.direction(Direction::Horizontal)
			.constraints([Constraint::Min(40), Constraint::Length(32)])
			.split(rows[0]);

		Self {
			surface: columns[0],
			side: columns[1],
			controls: rows[1],
			status: rows[2],
		}
	}
}
