use std::time::{Duration, Instant};

use crate::layout::{Point, ResolvedLayout};
use crate::view::{Street, TableSnapshot};

pub const DEAL_STAGGER: Duration = Duration::from_millis(150);
pub const DEAL_DURATION: Duration = Duration::from_millis(800);
pub const CHIP_DURATION: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
	CardToSeat { seat: usize },
	ChipToPot { seat: usize, amount: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
	pub kind: MotionKind,
	pub from: Point,
	pub to: Point,
	pub start: Instant,
	pub duration: Duration,
	pub fades: bool,
}

/// Where a motion is drawn at a given instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionFrame {
	pub kind: MotionKind,
	pub point: Point,
	pub opacity: f64,
}

fn ease_out(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

impl Motion {
	pub fn end(&self) -> Instant {
		self.start + self.duration
	}

	pub fn is_done(&self, now: Instant) -> bool {
		now >= self.end()
	}

	/// Linear progress in [0, 1], or `None` before the motion has started.
	pub fn progress(&self, now: Instant) -> Option<f64> {
		if now < self.start {
			return None;
		}
		if self.duration.is_zero() {
			return Some(1.0);
		}
		let elapsed = now.duration_since(self.start).as_secs_f64();
		Some((elapsed / self.duration.as_secs_f64()).min(1.0))
	}

	pub fn frame(&self, now: Instant) -> Option<MotionFrame> {
		let t = self.progress(now)?;
		if t >= 1.0 {
			return None;
		}
		Some(MotionFrame {
			kind: self.kind,
			point: self.from.lerp(self.to, ease_out(t)),
			opacity: if self.fades { 1.0 - t } else { 1.0 },
		})
	}
}

/// Motions implied by the transition from `previous` to `next`. Nothing here
/// mutates either snapshot.
pub fn plan(previous: &TableSnapshot, next: &TableSnapshot, layout: &ResolvedLayout, now: Instant) -> Vec<Motion> {
	let mut motions = Vec::new();

	let hand_began = !previous.started && next.started && next.street == Some(Street::Preflop);
	if let (true, Some(host)) = (hand_began, layout.host) {
		for seat in 1..=next.players.len() {
			let Some(to) = layout.seat(seat) else {
				continue;
			};
			motions.push(Motion {
				kind: MotionKind::CardToSeat { seat },
				from: host,
				to,
				start: now + DEAL_STAGGER * (seat - 1) as u32,
				duration: DEAL_DURATION,
				fades: false,
			});
		}
	}

	if next.recent_actions.len() > previous.recent_actions.len() {
		let newest = next.recent_actions.last();
		let bet = newest.and_then(|a| a.amount.filter(|n| *n > 0).map(|n| (a, n)));
		if let Some((action, amount)) = bet {
			let seat = next.seat_of(&action.player);
			let from = seat.and_then(|s| layout.stack(s).map(|a| a.point()).or_else(|| layout.seat(s)));
			if let (Some(seat), Some(from), Some(to)) = (seat, from, layout.pot) {
				motions.push(Motion {
					kind: MotionKind::ChipToPot { seat, amount },
					from,
					to,
					start: now,
					duration: CHIP_DURATION,
					fades: true,
				});
			}
		}
	}

	motions
}

/// Motions currently in flight.
#[derive(Debug, Default)]
pub struct AnimationQueue {
	motions: Vec<Motion>,
}

impl AnimationQueue {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn schedule(&mut self, motions: Vec<Motion>) {
		self.motions.extend(motions);
	}

	/// Drops every motion that has finished by `now`.
	pub fn tick(&mut self, now: Instant) {
		self.motions.retain(|m| !m.is_done(now));
	}

	pub fn frames(&self, now: Instant) -> Vec<MotionFrame> {
		self.motions.iter().filter_map(|m| m.frame(now)).collect()
	}

	pub fn len(&self) -> usize {
		self.motions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.motions.is_empty()
	}

	pub fn clear(&mut self) {
		self.motions.clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::layout::{LayoutConfig, LayoutEngine, OverrideMap};
	use crate::view::RecentAction;

	fn layout(seats: usize) -> ResolvedLayout {
		LayoutEngine::new(LayoutConfig::default(), OverrideMap::new(), 9).resolve(seats).0
	}

	fn waiting(players: &[&str]) -> TableSnapshot {
		let mut snapshot = TableSnapshot::new();
		snapshot.players = players.iter().map(|s| s.to_string()).collect();
		snapshot
	}

	fn preflop(players: &[&str]) -> TableSnapshot {
		let mut snapshot = waiting(players);
		snapshot.started = true;
		snapshot.street = Some(Street::Preflop);
		snapshot
	}

	fn action(player: &str, amount: Option<u64>) -> RecentAction {
		RecentAction {
			player: player.to_string(),
			action: "raise".to_string(),
			amount,
		}
	}

	#[test]
	fn test_deal_staggered_per_seat() {
		let now = Instant::now();
		let layout = layout(3);
		let motions = plan(&waiting(&["a", "b", "c"]), &preflop(&["a", "b", "c"]), &layout, now);

		assert_eq!(motions.len(), 3);
		for (i, motion) in motions.iter().enumerate() {
			assert_eq!(motion.kind, MotionKind::CardToSeat { seat: i + 1 });
			assert_eq!(motion.start, now + DEAL_STAGGER * i as u32);
			assert_eq!(motion.duration, DEAL_DURATION);
			assert_eq!(motion.from, layout.host.unwrap());
			assert_eq!(motion.to, layout.seat(i + 1).unwrap());
		}
	}

	#[test]
	fn test_no_deal_without_start_transition() {
		let now = Instant::now();
		let layout = layout(2);
		assert!(plan(&preflop(&["a", "b"]), &preflop(&["a", "b"]), &layout, now).is_empty());

		let mut flop = preflop(&["a", "b"]);
		flop.street = Some(Street::Flop);
		assert!(plan(&waiting(&["a", "b"]), &flop, &layout, now).is_empty());
	}

	#[test]
	fn test_seat_without_position_is_skipped() {
		let now = Instant::now();
		let layout = layout(1);
		let motions = plan(&waiting(&["a", "b"]), &preflop(&["a", "b"]), &layout, now);
		assert_eq!(motions.len(), 1);
	}

	#[test]
	fn test_chip_motion_on_new_bet() {
		let now = Instant::now();
		let layout = layout(2);
		let previous = preflop(&["a", "b"]);
		let mut next = previous.clone();
		next.recent_actions.push(action("b", Some(40)));

		let motions = plan(&previous, &next, &layout, now);
		assert_eq!(motions.len(), 1);
		assert_eq!(motions[0].kind, MotionKind::ChipToPot { seat: 2, amount: 40 });
		assert_eq!(motions[0].to, layout.pot.unwrap());
		assert!(motions[0].fades);
	}

	#[test]
	fn test_no_chip_motion_for_zero_or_missing_amount() {
		let now = Instant::now();
		let layout = layout(2);
		let previous = preflop(&["a", "b"]);

		let mut check = previous.clone();
		check.recent_actions.push(action("a", Some(0)));
		assert!(plan(&previous, &check, &layout, now).is_empty());

		let mut fold = previous.clone();
		fold.recent_actions.push(action("a", None));
		assert!(plan(&previous, &fold, &layout, now).is_empty());
	}

	#[test]
	fn test_queue_frames_and_tick() {
		let now = Instant::now();
		let layout = layout(2);
		let mut queue = AnimationQueue::new();
		queue.schedule(plan(&waiting(&["a", "b"]), &preflop(&["a", "b"]), &layout, now));
		assert_eq!(queue.len(), 2);

		// second card has not left yet
		assert_eq!(queue.frames(now).len(), 1);
		assert_eq!(queue.frames(now + DEAL_STAGGER).len(), 2);

		queue.tick(now + DEAL_DURATION);
		assert_eq!(queue.len(), 1);
		queue.tick(now + DEAL_STAGGER + DEAL_DURATION);
		assert!(queue.is_empty());
	}

	#[test]
	fn test_chip_fades_out() {
		let now = Instant::now();
		let motion = Motion {
			kind: MotionKind::ChipToPot { seat: 1, amount: 10 },
			from: Point::new(20.0, 80.0),
			to: Point::new(50.0, 40.0),
			start: now,
			duration: CHIP_DURATION,
			fades: true,
		};
		let start = motion.frame(now).unwrap();
		assert_eq!(start.opacity, 1.0);
		assert_eq!(start.point, Point::new(20.0, 80.0));

		let half = motion.frame(now + CHIP_DURATION / 2).unwrap();
		assert!((half.opacity - 0.5).abs() < 1e-9);
		assert!(motion.frame(now + CHIP_DURATION).is_none());
	}
}
