//! Tick loop: the session object that owns the herd, the target, the direction
//! resolver and the effect state.
//!
//! Each tick, in this order:
//! 1. resolve one direction (none: do nothing),
//! 2. decide whether the step eats the target,
//! 3. grow or move the herd (blocked by a wall: do nothing at all),
//! 4. confirm the direction, respawn the target, render,
//! 5. notify state change and target eaten, then check for the win.
//!
//! All callbacks run synchronously on the caller's stack. Timers only reach the
//! game through [`Game::fire`], which ignores handles it no longer owns.

mod effects;
mod timer;

pub use effects::{Effect, OSCILLATION_PERIOD_MS};
pub use timer::{ManualScheduler, Scheduler, TimerHandle};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::{ConfigError, GameConfig};
use crate::grid::{Bounds, Cell};
use crate::herd::Herd;
use crate::input::{Direction, DirectionResolver};
use effects::EffectState;

pub const HERD_GLYPH: &str = "🐴";
pub const APPLE_GLYPH: &str = "🍎";
pub const COFFEE_GLYPH: &str = "☕";

/// Drawing surface. Cells outside the board must be ignored silently.
pub trait Renderer {
    fn clear(&mut self);
    fn paint(&mut self, cell: Cell, glyph: &str, facing: Option<Direction>);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameState {
    pub herd_size: usize,
    pub is_running: bool,
}

/// What a single tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running, or no direction yet.
    Idle,
    /// A wall was in the way; nothing changed.
    Blocked,
    Moved,
    Ate,
    /// Ate and reached the win length; the loop is now stopped.
    Won,
}

type StateListener = Box<dyn FnMut(GameState)>;
type Listener = Box<dyn FnMut()>;

pub struct Game {
    config: GameConfig,
    bounds: Bounds,
    herd: Herd,
    target: Cell,
    resolver: DirectionResolver,
    effects: EffectState,
    renderer: Box<dyn Renderer>,
    scheduler: Box<dyn Scheduler>,
    tick_timer: Option<TimerHandle>,
    running: bool,
    rng: SmallRng,
    on_state_change: Option<StateListener>,
    on_target_eaten: Option<Listener>,
    on_win: Option<Listener>,
}

impl Game {
    pub fn new(
        config: GameConfig,
        renderer: impl Renderer + 'static,
        scheduler: impl Scheduler + 'static,
    ) -> Result<Self, ConfigError> {
        Self::with_rng(config, renderer, scheduler, SmallRng::from_entropy())
    }

    /// Same as [`Game::new`] with a caller-supplied RNG for target spawning.
    pub fn with_rng(
        config: GameConfig,
        renderer: impl Renderer + 'static,
        scheduler: impl Scheduler + 'static,
        rng: SmallRng,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let start = config.start_cell();
        let mut game = Self {
            config,
            bounds: config.bounds(),
            herd: Herd::new(start),
            target: start,
            resolver: DirectionResolver::new(),
            effects: EffectState::new(config.tick_ms),
            renderer: Box::new(renderer),
            scheduler: Box::new(scheduler),
            tick_timer: None,
            running: false,
            rng,
            on_state_change: None,
            on_target_eaten: None,
            on_win: None,
        };
        game.target = game.spawn_target();
        Ok(game)
    }

    pub fn set_on_state_change(&mut self, listener: impl FnMut(GameState) + 'static) {
        self.on_state_change = Some(Box::new(listener));
    }

    pub fn set_on_target_eaten(&mut self, listener: impl FnMut() + 'static) {
        self.on_target_eaten = Some(Box::new(listener));
    }

    pub fn set_on_win(&mut self, listener: impl FnMut() + 'static) {
        self.on_win = Some(Box::new(listener));
    }

    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        log::info!("game started at {}ms per tick", self.effects.interval_ms);
        self.render();
        self.notify_state_change();
        self.tick_timer = Some(self.scheduler.set_interval(self.effects.interval_ms));
    }

    /// Cancel the tick and oscillation timers. Safe to call at any time.
    pub fn stop(&mut self) {
        if let Some(handle) = self.tick_timer.take() {
            self.scheduler.clear_interval(handle);
        }
        self.cancel_oscillation();
        if !self.running {
            return;
        }
        self.running = false;
        log::info!("game stopped with {} in the herd", self.herd.len());
        self.notify_state_change();
    }

    /// Back to a fresh board with baseline effects. Leaves the game stopped.
    pub fn reset(&mut self) {
        self.stop();
        self.effects = EffectState::new(self.config.tick_ms);
        self.resolver.reset();
        self.herd = Herd::new(self.config.start_cell());
        self.target = self.spawn_target();
    }

    /// Timer callback entry point.
    pub fn fire(&mut self, handle: TimerHandle) {
        if self.tick_timer == Some(handle) {
            self.tick();
        } else if self.effects.oscillation.map(|o| o.handle) == Some(handle) {
            self.oscillate();
        } else {
            log::trace!("ignoring stale timer {handle:?}");
        }
    }

    /// Route a directional input. Ignored while stopped.
    pub fn submit_direction(&mut self, direction: Direction) -> bool {
        self.running && self.resolver.submit(direction)
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }
        let Some(direction) = self.resolver.consume() else {
            return TickOutcome::Idle;
        };

        let next = self.herd.peek_next_head(direction);
        let wrap = self.effects.wrap_walls;
        let eats = if self.effects.armed {
            !self.bounds.contains(next)
        } else {
            let landing = if wrap { self.bounds.wrap(next) } else { next };
            landing == self.target
        };

        let moved = if eats {
            self.herd.grow(direction, self.bounds, wrap)
        } else {
            self.herd.advance(direction, self.bounds, wrap)
        };
        if !moved {
            log::trace!("wall blocks {}", direction.as_str());
            return TickOutcome::Blocked;
        }
        self.resolver.confirm(direction);

        if eats {
            self.effects.armed = false;
            self.target = self.spawn_target();
        }
        self.render();
        if !eats {
            return TickOutcome::Moved;
        }

        self.notify_state_change();
        if let Some(listener) = self.on_target_eaten.as_mut() {
            listener();
        }
        if self.herd.len() >= self.config.win_length {
            self.stop();
            log::info!("herd complete");
            if let Some(listener) = self.on_win.as_mut() {
                listener();
            }
            return TickOutcome::Won;
        }
        TickOutcome::Ate
    }

    pub fn render(&mut self) {
        self.renderer.clear();
        if !self.effects.armed {
            self.renderer.paint(self.target, self.effects.target_glyph, None);
        }
        let facings = self.herd.facings(self.resolver.applied());
        for (cell, facing) in self.herd.positions().zip(facings) {
            self.renderer.paint(cell, HERD_GLYPH, facing);
        }
    }

    pub fn state(&self) -> GameState {
        GameState {
            herd_size: self.herd.len(),
            is_running: self.running,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn herd(&self) -> &Herd {
        &self.herd
    }

    pub fn target(&self) -> Cell {
        self.target
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn tick_interval_ms(&self) -> u32 {
        self.effects.interval_ms
    }

    pub fn tick_timer(&self) -> Option<TimerHandle> {
        self.tick_timer
    }

    pub fn is_oscillating(&self) -> bool {
        self.effects.oscillation.is_some()
    }

    pub fn controls_inverted(&self) -> bool {
        self.resolver.is_inverted()
    }

    pub fn walls_wrap(&self) -> bool {
        self.effects.wrap_walls
    }

    /// Waiting for the herd to touch a wall; the target is hidden meanwhile.
    pub fn is_armed(&self) -> bool {
        self.effects.armed
    }

    pub fn target_glyph(&self) -> &'static str {
        self.effects.target_glyph
    }

    /// Last direction the herd actually moved in.
    pub fn heading(&self) -> Option<Direction> {
        self.resolver.applied()
    }

    fn notify_state_change(&mut self) {
        let state = self.state();
        if let Some(listener) = self.on_state_change.as_mut() {
            listener(state);
        }
    }

    fn spawn_target(&mut self) -> Cell {
        loop {
            let cell = Cell::new(
                self.rng.gen_range(0..self.bounds.width),
                self.rng.gen_range(0..self.bounds.height),
            );
            if !self.herd.occupies(cell) {
                return cell;
            }
        }
    }
}
