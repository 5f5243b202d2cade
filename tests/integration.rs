// Integration tests (native) for the `horses` crate.
// These drive the public API on virtual time with `ManualScheduler`, routing
// narrator lines back into the game the same way the browser host does, and
// never touch wasm/browser APIs.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use horses::{
    Bounds, Cell, Direction, Effect, Game, GameConfig, Herd, ManualScheduler, NARRATOR_SCRIPT, Narrator,
    Renderer, TickOutcome,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;

#[derive(Clone, Default)]
struct Frames {
    painted: Rc<RefCell<Vec<(Cell, String)>>>,
}

impl Renderer for Frames {
    fn clear(&mut self) {
        self.painted.borrow_mut().clear();
    }

    fn paint(&mut self, cell: Cell, glyph: &str, _facing: Option<Direction>) {
        self.painted.borrow_mut().push((cell, glyph.to_string()));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Eaten,
    Won,
}

fn new_game(config: GameConfig, seed: u64) -> (Game, ManualScheduler, Rc<RefCell<VecDeque<Event>>>) {
    let scheduler = ManualScheduler::new();
    let mut game = Game::with_rng(config, Frames::default(), scheduler.clone(), SmallRng::seed_from_u64(seed))
        .expect("valid config");
    let events: Rc<RefCell<VecDeque<Event>>> = Rc::default();
    let queue = events.clone();
    game.set_on_target_eaten(move || queue.borrow_mut().push_back(Event::Eaten));
    let queue = events.clone();
    game.set_on_win(move || queue.borrow_mut().push_back(Event::Won));
    (game, scheduler, events)
}

#[test]
fn herd_walks_grows_and_follows_its_head() {
    let bounds = Bounds::new(20, 15);
    let mut herd = Herd::new(Cell::new(5, 5));
    assert_eq!(herd.peek_next_head(Direction::Right), Cell::new(6, 5));
    assert!(herd.advance(Direction::Right, bounds, false));
    assert!(herd.advance(Direction::Down, bounds, false));
    assert_eq!(herd.head(), Cell::new(6, 6));
    assert!(herd.advance(Direction::Right, bounds, false));
    assert_eq!(herd.head(), Cell::new(7, 6));

    let mut herd = Herd::new(Cell::new(5, 5));
    for _ in 0..2 {
        let expected = herd.peek_next_head(Direction::Right);
        let before = herd.len();
        assert!(herd.grow(Direction::Right, bounds, false));
        assert_eq!(herd.head(), expected);
        assert_eq!(herd.len(), before + 1);
    }
    assert!(herd.advance(Direction::Down, bounds, false));
    let cells: Vec<Cell> = herd.positions().collect();
    assert_eq!(cells, vec![Cell::new(7, 6), Cell::new(7, 5), Cell::new(6, 5)]);
}

#[test]
fn corner_blocks_left_and_up() {
    let bounds = Bounds::new(20, 15);
    let mut herd = Herd::new(Cell::new(0, 0));
    assert!(!herd.advance(Direction::Left, bounds, false));
    assert_eq!(herd.head(), Cell::new(0, 0));
    assert!(!herd.advance(Direction::Up, bounds, false));
    assert_eq!(herd.head(), Cell::new(0, 0));
}

#[test]
fn narrator_walks_all_fourteen_lines() {
    let mut narrator = Narrator::new();
    assert_eq!(narrator.len(), 14);
    for expected in NARRATOR_SCRIPT {
        assert_eq!(narrator.advance(), Some(expected));
    }
    assert_eq!(narrator.advance(), None);
    narrator.reset();
    assert_eq!(narrator.get_current_line(), None);
}

#[test]
fn oscillation_then_normal_leaves_one_base_timer() {
    let (mut game, scheduler, _) = new_game(GameConfig::default(), 1);
    game.start();
    game.apply_effect(Effect::SpeedOscillate);
    game.apply_effect(Effect::SpeedNormal);

    let tick = game.tick_timer().expect("running loop has a tick timer");
    assert_eq!(scheduler.active(), vec![(tick, 150)]);

    scheduler.run_for(&mut game, 10_000);
    assert_eq!(game.tick_interval_ms(), 150);
    assert_eq!(scheduler.active().len(), 1);
}

#[test]
fn restarting_after_stop_keeps_the_current_rate() {
    let (mut game, scheduler, _) = new_game(GameConfig::default(), 1);
    game.apply_effect(Effect::SpeedHalf);
    game.start();
    game.stop();
    game.start();
    assert_eq!(scheduler.active().len(), 1);
    assert_eq!(scheduler.active()[0].1, 300);
}

#[test]
fn speed_change_mid_run_does_not_double_fire() {
    let (mut game, scheduler, _) = new_game(GameConfig::default(), 3);
    game.start();
    game.submit_direction(Direction::Up);
    scheduler.run_for(&mut game, 150);
    let after_one = game.herd().head();
    assert_eq!(after_one, Cell::new(10, 6));

    // halve the rate right away: the next tick is a full 300ms out
    game.apply_effect(Effect::SpeedHalf);
    scheduler.run_for(&mut game, 299);
    assert_eq!(game.herd().head(), after_one);
    scheduler.run_for(&mut game, 1);
    assert_eq!(game.herd().head(), Cell::new(10, 5));
}

/// Pick a direction that gets the head closer to `goal`, never the reverse of
/// the current heading.
fn steer_towards(game: &Game, goal: Cell) -> Direction {
    let head = game.herd().head();
    let heading = game.heading();
    let mut wanted = Vec::new();
    if goal.x > head.x {
        wanted.push(Direction::Right);
    }
    if goal.x < head.x {
        wanted.push(Direction::Left);
    }
    if goal.y > head.y {
        wanted.push(Direction::Down);
    }
    if goal.y < head.y {
        wanted.push(Direction::Up);
    }
    let allowed = |d: &Direction| Some(d.opposite()) != heading;
    if let Some(direction) = wanted.into_iter().find(allowed) {
        return direction;
    }
    // goal is straight behind: side-step first
    let bounds = game.config().bounds();
    Direction::ALL
        .into_iter()
        .filter(|d| Some(*d) != heading && allowed(d))
        .find(|d| bounds.contains(head.step(*d)))
        .unwrap_or(Direction::Up)
}

#[test]
fn full_story_plays_to_a_win() {
    let (mut game, scheduler, events) = new_game(GameConfig::default(), 42);
    let mut narrator = Narrator::new();
    let mut eaten = 0;
    let mut won = 0;

    game.start();
    let mut fired = 0;
    while let Some(handle) = scheduler.pop_due(u64::MAX) {
        fired += 1;
        assert!(fired < 100_000, "game never finished");

        // Armed walls hide the target; any wall will do.
        let goal = if game.is_armed() {
            Cell::new(game.herd().head().x, -1)
        } else {
            game.target()
        };
        let direction = steer_towards(&game, goal);
        let raw = if game.controls_inverted() { direction.opposite() } else { direction };
        game.submit_direction(raw);

        game.fire(handle);

        loop {
            let Some(event) = events.borrow_mut().pop_front() else {
                break;
            };
            match event {
                Event::Eaten => {
                    eaten += 1;
                    if let Some(line) = narrator.advance() {
                        game.apply_effect(line.effect);
                    }
                }
                Event::Won => won += 1,
            }
        }
    }

    assert_eq!(eaten, 14);
    assert_eq!(won, 1);
    assert!(narrator.is_complete());
    assert_eq!(game.herd().len(), 15);
    assert!(!game.is_running());
    assert!(scheduler.active().is_empty());
    assert!(game.walls_wrap());
    assert!(!game.controls_inverted());
    assert_eq!(game.target_glyph(), "☕");
}

#[test]
fn win_fires_once_and_stops_before_the_next_tick() {
    let config = GameConfig {
        win_length: 3,
        ..GameConfig::default()
    };
    let (mut game, scheduler, events) = new_game(config, 9);
    game.start();

    let mut outcomes = Vec::new();
    while let Some(handle) = scheduler.pop_due(u64::MAX) {
        assert!(outcomes.len() < 10_000);
        let direction = steer_towards(&game, game.target());
        game.submit_direction(direction);
        if game.tick_timer() == Some(handle) {
            outcomes.push(game.tick());
        } else {
            game.fire(handle);
        }
    }

    assert_eq!(outcomes.iter().filter(|o| **o == TickOutcome::Ate).count(), 1);
    assert_eq!(outcomes.last(), Some(&TickOutcome::Won));
    assert_eq!(
        events.borrow().iter().copied().collect::<Vec<_>>(),
        vec![Event::Eaten, Event::Eaten, Event::Won]
    );
    assert_eq!(game.tick(), TickOutcome::Idle);
    assert_eq!(game.herd().len(), 3);
}

#[test]
fn reset_allows_a_second_round() {
    let (mut game, scheduler, _) = new_game(GameConfig::default(), 5);
    game.start();
    game.submit_direction(Direction::Left);
    scheduler.run_for(&mut game, 600);
    game.apply_effect(Effect::InvertControls);

    game.reset();
    assert_eq!(game.herd().head(), GameConfig::default().start_cell());
    assert!(!game.controls_inverted());
    assert!(!game.herd().occupies(game.target()));

    game.start();
    assert!(game.submit_direction(Direction::Right));
    scheduler.run_for(&mut game, 150);
    assert_eq!(game.heading(), Some(Direction::Right));
}
