use std::fmt;

use serde::Deserialize;

use crate::layout::engine::{LayoutConfig, seat_angle};
use crate::layout::markers::{MarkerKey, OverrideMap};
use crate::logging;

/// Seats whose trig term falls below this contribute nothing to that axis.
const MIN_TRIG: f64 = 0.1;

/// Aspect of the background artwork. Percent coordinates are resolution
/// independent, but angles measured between them are not.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SurfaceSize {
	pub width: f64,
	pub height: f64,
}

impl Default for SurfaceSize {
	fn default() -> Self {
		Self { width: 1000.0, height: 560.0 }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitError {
	MissingHost,
	NoSeats,
}

impl fmt::Display for FitError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			FitError::MissingHost => write!(f, "place the host marker before fitting"),
			FitError::NoSeats => write!(f, "place at least one seat before fitting"),
		}
	}
}

impl std::error::Error for FitError {}

/// Derives ellipse parameters from hand-placed host and seat overrides.
///
/// The angle offset is the host's angle about the table centre. Each radius is
/// the mean of |displacement / trig(seat angle)| over the seats where the trig
/// term is not near zero, normalized by the surface extent. Seat angles assume
/// a full table of `capacity` seats. The stretch factor is carried over from
/// `prior` unchanged, and so is a radius when no seat qualifies on its axis.
pub fn derive_automatic_from_overrides(
	overrides: &OverrideMap,
	prior: &LayoutConfig,
	capacity: usize,
	surface: SurfaceSize,
) -> Result<LayoutConfig, FitError> {
	let host = overrides.point(MarkerKey::Host).ok_or(FitError::MissingHost)?;

	let to_pixels = |x: f64, y: f64| {
		(
			(x - 50.0) / 100.0 * surface.width,
			(y - 50.0) / 100.0 * surface.height,
		)
	};

	let (host_dx, host_dy) = to_pixels(host.x, host.y);
	let angle_offset = host_dy.atan2(host_dx);

	let mut sum_x = 0.0;
	let mut count_x = 0usize;
	let mut sum_y = 0.0;
	let mut count_y = 0usize;
	let mut seats_seen = 0usize;

	for seat in 1..=capacity {
		let Some(point) = overrides.point(MarkerKey::Seat(seat)) else {
			continue;
		};
		seats_seen += 1;

		let (dx, dy) = to_pixels(point.x, point.y);
		let angle = seat_angle(seat, capacity, angle_offset);

		let cos = angle.cos();
		if cos.abs() > MIN_TRIG {
			sum_x += (dx / cos).abs() / surface.width;
			count_x += 1;
		}

		let sin = angle.sin();
		if sin.abs() > MIN_TRIG {
			sum_y += (dy / sin).abs() / surface.height;
			count_y += 1;
		}
	}

	if seats_seen == 0 {
		return Err(FitError::NoSeats);
	}

	let fitted = LayoutConfig {
		radius_x: if count_x > 0 { sum_x / count_x as f64 } else { prior.radius_x },
		radius_y: if count_y > 0 { sum_y / count_y as f64 } else { prior.radius_y },
		angle_offset,
		stretch_factor: prior.stretch_factor,
	};

	logging::layout::fitted(fitted.radius_x, fitted.radius_y, fitted.angle_offset);
	Ok(fitted)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::layout::engine::automatic_position;
	use crate::layout::markers::{Anchor, Point};

	fn place_automatic(config: &LayoutConfig, capacity: usize) -> OverrideMap {
		let mut map = OverrideMap::new();
		map.insert(MarkerKey::Host, Anchor::at(automatic_position(0, capacity, config)));
		for seat in 1..=capacity {
			map.insert(MarkerKey::Seat(seat), Anchor::at(automatic_position(seat, capacity, config)));
		}
		map
	}

	#[test]
	fn test_fit_requires_host() {
		let mut map = OverrideMap::new();
		map.insert(MarkerKey::Seat(1), Anchor::at(Point::new(70.0, 15.0)));
		let result = derive_automatic_from_overrides(&map, &LayoutConfig::default(), 9, SurfaceSize::default());
		assert_eq!(result, Err(FitError::MissingHost));
	}

	#[test]
	fn test_fit_requires_a_seat() {
		let mut map = OverrideMap::new();
		map.insert(MarkerKey::Host, Anchor::at(Point::new(50.0, 12.0)));
		let result = derive_automatic_from_overrides(&map, &LayoutConfig::default(), 9, SurfaceSize::default());
		assert_eq!(result, Err(FitError::NoSeats));
	}

	#[test]
	fn test_fit_recovers_ellipse_that_is_circular_in_pixels() {
		let truth = LayoutConfig {
			radius_x: 0.40,
			radius_y: 0.30,
			angle_offset: 0.25,
			stretch_factor: 1.0,
		};
		let map = place_automatic(&truth, 9);
		// 600 * 0.40 == 800 * 0.30, so angles measured in pixels match the parameter angles
		let surface = SurfaceSize { width: 600.0, height: 800.0 };

		let fitted = derive_automatic_from_overrides(&map, &truth, 9, surface).unwrap();
		assert!((fitted.angle_offset - 0.25).abs() < 1e-6, "angle {}", fitted.angle_offset);
		assert!((fitted.radius_x - 0.40).abs() < 1e-6, "rx {}", fitted.radius_x);
		assert!((fitted.radius_y - 0.30).abs() < 1e-6, "ry {}", fitted.radius_y);
	}

	#[test]
	fn test_fit_keeps_prior_stretch_factor() {
		let prior = LayoutConfig {
			stretch_factor: 1.25,
			..LayoutConfig::default()
		};
		let map = place_automatic(&prior, 9);
		let fitted = derive_automatic_from_overrides(&map, &prior, 9, SurfaceSize::default()).unwrap();
		assert_eq!(fitted.stretch_factor, 1.25);
	}

	#[test]
	fn test_fit_host_straight_up_gives_negative_quarter_turn() {
		let mut map = OverrideMap::new();
		map.insert(MarkerKey::Host, Anchor::at(Point::new(50.0, 10.0)));
		map.insert(MarkerKey::Seat(1), Anchor::at(Point::new(80.0, 30.0)));

		let fitted = derive_automatic_from_overrides(&map, &LayoutConfig::default(), 9, SurfaceSize::default()).unwrap();
		assert!((fitted.angle_offset + std::f64::consts::FRAC_PI_2).abs() < 1e-9);
	}
}
