//! Directional input: raw key / swipe mapping and the per-tick direction
//! resolver.
//!
//! The resolver keeps two separate notions of direction:
//! - `pending`: the latest accepted request, overwritten by newer input and
//!   discarded once a tick consumes it.
//! - `applied`: the direction of the last move that actually changed the herd.
//!
//! The opposite-direction lockout is checked against `applied` only. A request
//! that was consumed but blocked by a wall never becomes `applied`.

/// Minimum swipe distance (px) on the dominant axis.
pub const SWIPE_THRESHOLD: f64 = 30.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Unit step on the grid; y grows downwards.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Inverse of [`Direction::delta`] for unit vectors.
    pub fn from_delta(dx: i32, dy: i32) -> Option<Direction> {
        match (dx, dy) {
            (0, -1) => Some(Direction::Up),
            (0, 1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// Arrow keys and WASD (either case). Anything else is ignored.
pub fn key_to_direction(key: &str) -> Option<Direction> {
    match key {
        "ArrowUp" | "w" | "W" => Some(Direction::Up),
        "ArrowDown" | "s" | "S" => Some(Direction::Down),
        "ArrowLeft" | "a" | "A" => Some(Direction::Left),
        "ArrowRight" | "d" | "D" => Some(Direction::Right),
        _ => None,
    }
}

/// Classify a finished swipe. Horizontal wins only when strictly dominant.
pub fn swipe_to_direction(dx: f64, dy: f64) -> Option<Direction> {
    let (abs_x, abs_y) = (dx.abs(), dy.abs());
    if abs_x < SWIPE_THRESHOLD && abs_y < SWIPE_THRESHOLD {
        return None;
    }
    if abs_x > abs_y {
        Some(if dx > 0.0 { Direction::Right } else { Direction::Left })
    } else {
        Some(if dy > 0.0 { Direction::Down } else { Direction::Up })
    }
}

/// Remembers where a touch began so the end event can be classified.
#[derive(Debug, Default)]
pub struct SwipeTracker {
    start: Option<(f64, f64)>,
}

impl SwipeTracker {
    pub fn begin(&mut self, x: f64, y: f64) {
        self.start = Some((x, y));
    }

    /// Finish the gesture. Without a matching `begin` there is nothing to report.
    pub fn end(&mut self, x: f64, y: f64) -> Option<Direction> {
        let (sx, sy) = self.start.take()?;
        swipe_to_direction(x - sx, y - sy)
    }
}

#[derive(Debug, Default)]
pub struct DirectionResolver {
    pending: Option<Direction>,
    applied: Option<Direction>,
    inverted: bool,
}

impl DirectionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a raw direction. Returns whether it was buffered.
    pub fn submit(&mut self, raw: Direction) -> bool {
        let direction = if self.inverted { raw.opposite() } else { raw };
        if self.applied == Some(direction.opposite()) {
            return false;
        }
        self.pending = Some(direction);
        true
    }

    /// Direction for this tick: the pending request, else the last applied one.
    /// Does not confirm anything; see [`DirectionResolver::confirm`].
    pub fn consume(&mut self) -> Option<Direction> {
        self.pending.take().or(self.applied)
    }

    /// Record that the herd actually moved in `direction`.
    pub fn confirm(&mut self, direction: Direction) {
        self.applied = Some(direction);
    }

    pub fn pending(&self) -> Option<Direction> {
        self.pending
    }

    pub fn applied(&self) -> Option<Direction> {
        self.applied
    }

    pub fn set_inverted(&mut self, inverted: bool) {
        self.inverted = inverted;
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_lowercase_words() {
        let names: Vec<&str> = Direction::ALL.iter().map(|d| d.as_str()).collect();
        assert_eq!(names, vec!["up", "down", "left", "right"]);
    }

    #[test]
    fn nothing_submitted_consumes_none_forever() {
        let mut r = DirectionResolver::new();
        assert_eq!(r.consume(), None);
        assert_eq!(r.consume(), None);
    }

    #[test]
    fn consume_clears_pending_but_falls_back_to_applied() {
        let mut r = DirectionResolver::new();
        assert!(r.submit(Direction::Right));
        assert_eq!(r.consume(), Some(Direction::Right));
        // not confirmed yet: nothing to fall back on
        assert_eq!(r.consume(), None);
        r.confirm(Direction::Right);
        assert_eq!(r.consume(), Some(Direction::Right));
    }

    #[test]
    fn opposite_of_applied_is_rejected() {
        let mut r = DirectionResolver::new();
        r.confirm(Direction::Right);
        assert!(!r.submit(Direction::Left));
        assert_eq!(r.pending(), None);
        assert_eq!(r.consume(), Some(Direction::Right));
    }

    #[test]
    fn opposite_lockout_ignores_pending_and_blocked_requests() {
        let mut r = DirectionResolver::new();
        r.confirm(Direction::Up);
        assert!(r.submit(Direction::Right));
        // the tick takes "right" but the move is blocked, so no confirm
        assert_eq!(r.consume(), Some(Direction::Right));
        assert!(r.submit(Direction::Left));
        assert_eq!(r.consume(), Some(Direction::Left));
        assert!(!r.submit(Direction::Down));
    }

    #[test]
    fn perpendicular_and_same_direction_are_buffered() {
        for applied in Direction::ALL {
            for raw in Direction::ALL {
                let mut r = DirectionResolver::new();
                r.confirm(applied);
                let accepted = r.submit(raw);
                assert_eq!(accepted, raw != applied.opposite(), "{applied:?} then {raw:?}");
                if accepted {
                    assert_eq!(r.pending(), Some(raw));
                }
            }
        }
    }

    #[test]
    fn newer_input_overwrites_pending() {
        let mut r = DirectionResolver::new();
        r.submit(Direction::Up);
        r.submit(Direction::Left);
        assert_eq!(r.consume(), Some(Direction::Left));
    }

    #[test]
    fn inversion_maps_before_lockout() {
        let mut r = DirectionResolver::new();
        r.confirm(Direction::Right);
        r.set_inverted(true);
        // "left" becomes "right": allowed
        assert!(r.submit(Direction::Left));
        assert_eq!(r.consume(), Some(Direction::Right));
        // "right" becomes "left", the opposite of applied
        assert!(!r.submit(Direction::Right));
        assert!(r.submit(Direction::Up));
        assert_eq!(r.consume(), Some(Direction::Down));
    }

    #[test]
    fn keys_map_arrows_and_wasd() {
        assert_eq!(key_to_direction("ArrowUp"), Some(Direction::Up));
        assert_eq!(key_to_direction("W"), Some(Direction::Up));
        assert_eq!(key_to_direction("s"), Some(Direction::Down));
        assert_eq!(key_to_direction("ArrowLeft"), Some(Direction::Left));
        assert_eq!(key_to_direction("a"), Some(Direction::Left));
        assert_eq!(key_to_direction("d"), Some(Direction::Right));
        assert_eq!(key_to_direction("Space"), None);
        assert_eq!(key_to_direction("Enter"), None);
    }

    #[test]
    fn swipes_pick_dominant_axis() {
        assert_eq!(swipe_to_direction(50.0, 0.0), Some(Direction::Right));
        assert_eq!(swipe_to_direction(-50.0, 0.0), Some(Direction::Left));
        assert_eq!(swipe_to_direction(0.0, 50.0), Some(Direction::Down));
        assert_eq!(swipe_to_direction(0.0, -50.0), Some(Direction::Up));
        assert_eq!(swipe_to_direction(10.0, 10.0), None);
        assert_eq!(swipe_to_direction(30.0, 40.0), Some(Direction::Down));
        assert_eq!(swipe_to_direction(50.0, 30.0), Some(Direction::Right));
        assert_eq!(swipe_to_direction(-40.0, -60.0), Some(Direction::Up));
        assert_eq!(swipe_to_direction(-100.0, -20.0), Some(Direction::Left));
        // tie goes vertical
        assert_eq!(swipe_to_direction(40.0, 40.0), Some(Direction::Down));
    }

    #[test]
    fn swipe_tracker_needs_a_start() {
        let mut t = SwipeTracker::default();
        assert_eq!(t.end(100.0, 0.0), None);
        t.begin(0.0, 0.0);
        assert_eq!(t.end(100.0, 0.0), Some(Direction::Right));
        assert_eq!(t.end(200.0, 0.0), None);
    }
}
