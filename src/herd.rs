//! The herd: an ordered chain of cells, head first.

use std::collections::VecDeque;

use crate::grid::{Bounds, Cell};
use crate::input::Direction;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Herd {
    // Never empty; index 0 is the head.
    positions: VecDeque<Cell>,
}

impl Herd {
    pub fn new(start: Cell) -> Self {
        Self {
            positions: VecDeque::from([start]),
        }
    }

    pub fn head(&self) -> Cell {
        self.positions[0]
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Head to tail.
    pub fn positions(&self) -> impl Iterator<Item = Cell> + '_ {
        self.positions.iter().copied()
    }

    pub fn occupies(&self, cell: Cell) -> bool {
        self.positions.contains(&cell)
    }

    /// Where the head would land, before any bounds rule.
    pub fn peek_next_head(&self, direction: Direction) -> Cell {
        self.head().step(direction)
    }

    /// Step the whole herd; length is unchanged. Returns false (and leaves the
    /// herd untouched) when blocked by a wall.
    #[must_use]
    pub fn advance(&mut self, direction: Direction, bounds: Bounds, wrap: bool) -> bool {
        let Some(head) = self.next_head(direction, bounds, wrap) else {
            return false;
        };
        self.positions.push_front(head);
        self.positions.pop_back();
        true
    }

    /// Like [`Herd::advance`] but keeps the tail, growing by one.
    #[must_use]
    pub fn grow(&mut self, direction: Direction, bounds: Bounds, wrap: bool) -> bool {
        let Some(head) = self.next_head(direction, bounds, wrap) else {
            return false;
        };
        self.positions.push_front(head);
        true
    }

    fn next_head(&self, direction: Direction, bounds: Bounds, wrap: bool) -> Option<Cell> {
        let candidate = self.peek_next_head(direction);
        if wrap {
            Some(bounds.wrap(candidate))
        } else if bounds.contains(candidate) {
            Some(candidate)
        } else {
            None
        }
    }

    /// Facing of every segment, head first. The head faces `head_direction`;
    /// each body segment faces the segment ahead of it.
    pub fn facings(&self, head_direction: Option<Direction>) -> Vec<Option<Direction>> {
        let mut out = Vec::with_capacity(self.positions.len());
        out.push(head_direction);
        for (ahead, cell) in self.positions.iter().zip(self.positions.iter().skip(1)) {
            out.push(facing_towards(*cell, *ahead));
        }
        out
    }
}

/// Direction from `from` to the adjacent `to`. A jump longer than one cell can
/// only come from wrapping, so it points the other way.
pub fn facing_towards(from: Cell, to: Cell) -> Option<Direction> {
    Direction::from_delta(unit(to.x - from.x), unit(to.y - from.y))
}

fn unit(delta: i32) -> i32 {
    if delta.abs() > 1 { -delta.signum() } else { delta }
}
