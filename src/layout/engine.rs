use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::layout::markers::{Anchor, MarkerKey, OverrideMap, Point};
use crate::logging;

/// Where the pot marker sits until it is placed by hand.
pub const DEFAULT_POT: Point = Point { x: 50.0, y: 40.0 };

/// Fraction of the way from a seat towards the centre for its chip stack and
/// position badge when neither has been placed by hand.
const STACK_INSET: f64 = 0.30;
const CHIP_INSET: f64 = 0.18;

/// Parameters of the automatic ellipse. Radii are fractions of the surface
/// width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
	pub radius_x: f64,
	pub radius_y: f64,
	pub angle_offset: f64,
	pub stretch_factor: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			radius_x: 0.550261,
			radius_y: 0.345168,
			angle_offset: 0.007737504430679,
			stretch_factor: 1.03,
		}
	}
}

/// Angle of rank `rank` among `total` occupants plus the host at rank 0.
pub fn seat_angle(rank: usize, total: usize, angle_offset: f64) -> f64 {
	(rank as f64 / (total + 1) as f64) * TAU + angle_offset
}

/// Percent-space position on the automatic layout for a given angle.
///
/// The lower half of the artwork is drawn foreshortened, so any angle that
/// normalizes into [π/2, 3π/2] gets the stretch factor applied a second time.
/// The silhouette is therefore not a true ellipse.
pub fn ellipse_point(angle: f64, config: &LayoutConfig) -> Point {
	let radius_x = 50.0 * 2.0 * config.radius_x * config.stretch_factor;
	let radius_y = 50.0 * 2.0 * config.radius_y * config.stretch_factor;

	let normalized = angle.rem_euclid(TAU);
	let multiplier = if (PI / 2.0..=3.0 * PI / 2.0).contains(&normalized) {
		config.stretch_factor
	} else {
		1.0
	};

	Point::new(
		50.0 + angle.cos() * radius_x * multiplier,
		50.0 + angle.sin() * radius_y * multiplier,
	)
}

pub fn automatic_position(rank: usize, total: usize, config: &LayoutConfig) -> Point {
	ellipse_point(seat_angle(rank, total, config.angle_offset), config)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
	Automatic,
	Custom,
}

/// Everything the table needs to draw one frame, in percent of the surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedLayout {
	pub host: Option<Point>,
	pub seats: Vec<(usize, Point)>,
	pub pot: Option<Point>,
	pub pot_value: Option<Point>,
	pub stacks: Vec<(usize, Anchor)>,
	pub position_chips: Vec<(usize, Point)>,
}

impl ResolvedLayout {
	pub fn seat(&self, seat: usize) -> Option<Point> {
		self.seats.iter().find(|(n, _)| *n == seat).map(|(_, p)| *p)
	}

	pub fn stack(&self, seat: usize) -> Option<Anchor> {
		self.stacks.iter().find(|(n, _)| *n == seat).map(|(_, a)| *a)
	}

	pub fn position_chip(&self, seat: usize) -> Option<Point> {
		self.position_chips.iter().find(|(n, _)| *n == seat).map(|(_, p)| *p)
	}

	pub fn point(&self, key: MarkerKey) -> Option<Point> {
		match key {
			MarkerKey::Host => self.host,
			MarkerKey::Seat(n) => self.seat(n),
			MarkerKey::Pot => self.pot,
			MarkerKey::PotValue => self.pot_value,
			MarkerKey::Stack(n) => self.stack(n).map(|a| a.point()),
			MarkerKey::PositionChip(n) => self.position_chip(n),
		}
	}

	/// All drawn markers, in draw order.
	pub fn markers(&self) -> Vec<(MarkerKey, Point)> {
		let mut out = Vec::new();
		if let Some(p) = self.host {
			out.push((MarkerKey::Host, p));
		}
		out.extend(self.seats.iter().map(|(n, p)| (MarkerKey::Seat(*n), *p)));
		if let Some(p) = self.pot {
			out.push((MarkerKey::Pot, p));
		}
		if let Some(p) = self.pot_value {
			out.push((MarkerKey::PotValue, p));
		}
		out.extend(self.stacks.iter().map(|(n, a)| (MarkerKey::Stack(*n), a.point())));
		out.extend(self.position_chips.iter().map(|(n, p)| (MarkerKey::PositionChip(*n), *p)));
		out
	}
}

/// An automatic position that custom mode has to pin into the override map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Materialization {
	pub key: MarkerKey,
	pub point: Point,
}

pub struct LayoutEngine {
	pub config: LayoutConfig,
	pub mode: LayoutMode,
	pub overrides: OverrideMap,
	capacity: usize,
}

impl LayoutEngine {
	pub fn new(config: LayoutConfig, overrides: OverrideMap, capacity: usize) -> Self {
		let mode = if overrides.is_empty() { LayoutMode::Automatic } else { LayoutMode::Custom };
		Self { config, mode, overrides, capacity }
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	/// Computes positions for the host and seats `1..=seat_count` without
	/// touching the override map. In custom mode, any host or seat missing from
	/// the map is returned as a pending materialization alongside the layout.
	pub fn resolve(&self, seat_count: usize) -> (ResolvedLayout, Vec<Materialization>) {
		let seat_count = seat_count.min(self.capacity);
		let mut pending = Vec::new();
		let mut layout = ResolvedLayout::default();

		let mut formula = |key: MarkerKey, rank: usize| -> Point {
			let automatic = automatic_position(rank, seat_count, &self.config);
			match self.mode {
				LayoutMode::Automatic => automatic,
				LayoutMode::Custom => match self.overrides.point(key) {
					Some(p) => p,
					None => {
						pending.push(Materialization { key, point: automatic });
						automatic
					}
				},
			}
		};

		layout.host = Some(formula(MarkerKey::Host, 0));
		for seat in 1..=seat_count {
			let point = formula(MarkerKey::Seat(seat), seat);
			layout.seats.push((seat, point));
		}

		let pot = self.overrides.point(MarkerKey::Pot).unwrap_or(DEFAULT_POT);
		layout.pot = Some(pot);
		layout.pot_value = Some(self.overrides.point(MarkerKey::PotValue).unwrap_or(pot));

		for &(seat, seat_point) in &layout.seats {
			let stack = self
				.overrides
				.get(MarkerKey::Stack(seat))
				.copied()
				.unwrap_or_else(|| Anchor::at(seat_point.lerp(Point::CENTER, STACK_INSET)));
			layout.stacks.push((seat, stack));

			let chip = self
				.overrides
				.point(MarkerKey::PositionChip(seat))
				.unwrap_or_else(|| seat_point.lerp(Point::CENTER, CHIP_INSET));
			layout.position_chips.push((seat, chip));
		}

		(layout, pending)
	}

	/// Pins pending automatic positions so later reads stay put even if the
	/// ellipse parameters change. Existing entries are never overwritten.
	pub fn materialize(&mut self, pending: Vec<Materialization>) -> usize {
		let mut written = 0;
		for m in pending {
			if !self.overrides.contains(m.key) {
				self.overrides.insert(m.key, Anchor::at(m.point));
				written += 1;
			}
		}
		if written > 0 {
			logging::layout::materialized(written);
		}
		written
	}

	/// One render pass: resolve everything first, then materialize once.
	pub fn resolve_and_materialize(&mut self, seat_count: usize) -> ResolvedLayout {
		let (layout, pending) = self.resolve(seat_count);
		self.materialize(pending);
		layout
	}
}
