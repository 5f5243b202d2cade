//! Browser host: page layout, input listeners, timer dispatch and narrator
//! routing around a single [`Game`].
//!
//! Game callbacks only queue [`HostEvent`]s. The queue is drained after every
//! timer dispatch, outside the game's own call stack, so routing a narrator
//! effect back into the game never happens mid-tick.

mod logger;
mod renderer;
mod scheduler;

pub use logger::init as init_logger;
pub use renderer::DomRenderer;
pub use scheduler::IntervalScheduler;

use std::cell::{Cell as StdCell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Document, HtmlElement, KeyboardEvent, TouchEvent, window};

use crate::config::GameConfig;
use crate::game::{Effect, Game, GameState, TimerHandle};
use crate::input::{SwipeTracker, key_to_direction};
use crate::narrator::Narrator;

const ROOT_ID: &str = "horses-app";

// Keyframes for effects the core leaves to the page.
const EFFECT_CSS: &str = "
@keyframes horses-shake { 0%,100% { transform: translate(0,0); } 25% { transform: translate(-6px,3px); } 75% { transform: translate(6px,-3px); } }
.fx-screen_shake { animation: horses-shake 0.15s linear 6; }
.fx-add_flowers .horses-grid { box-shadow: 0 0 0 6px #f9a8d4, 0 0 24px 8px #fbcfe8; }
.fx-zoom_out_1 .horses-grid { transform: scale(0.85); transition: transform 1s; }
.fx-zoom_out_2 .horses-grid { transform: scale(0.65); transition: transform 1s; }
.fx-fade_to_end { opacity: 0; transition: opacity 4s; }
";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HostEvent {
    StateChanged(GameState),
    TargetEaten,
    Won,
}

struct Hud {
    root: HtmlElement,
    herd: HtmlElement,
    overlay: HtmlElement,
    win_length: usize,
}

impl Hud {
    fn show_herd(&self, size: usize) {
        self.herd
            .set_text_content(Some(&format!("Herd: {size} / {}", self.win_length)));
    }

    fn show_win(&self, visible: bool) {
        let display = if visible { "block" } else { "none" };
        self.overlay.style().set_property("display", display).ok();
    }

    fn apply_visual(&self, effect: Effect) {
        log::debug!("visual effect {}", effect.as_str());
        let class = format!("fx-{}", effect.as_str());
        let classes = self.root.class_list();
        // restart the animation when the same effect repeats
        classes.remove_1(&class).ok();
        let _ = self.root.offset_width();
        classes.add_1(&class).ok();
    }

    fn clear_visuals(&self) {
        self.root.set_class_name("");
    }
}

struct Session {
    game: Game,
    narrator: Narrator,
    events: Rc<RefCell<VecDeque<HostEvent>>>,
    hud: Hud,
    swipe: SwipeTracker,
}

impl Session {
    fn route_events(&mut self) {
        loop {
            let Some(event) = self.events.borrow_mut().pop_front() else {
                break;
            };
            match event {
                HostEvent::StateChanged(state) => self.hud.show_herd(state.herd_size),
                HostEvent::TargetEaten => {
                    if let Some(line) = self.narrator.advance() {
                        self.game.apply_effect(line.effect);
                        if line.effect.is_cosmetic() {
                            self.hud.apply_visual(line.effect);
                        }
                    }
                }
                HostEvent::Won => self.hud.show_win(true),
            }
        }
    }

    fn restart(&mut self) {
        self.game.reset();
        self.narrator.reset();
        self.hud.clear_visuals();
        self.hud.show_win(false);
        self.game.start();
        self.route_events();
    }
}

thread_local! {
    static SESSION: RefCell<Option<Session>> = const { RefCell::new(None) };
    static LISTENERS_ATTACHED: StdCell<bool> = const { StdCell::new(false) };
}

fn with_session<R>(f: impl FnOnce(&mut Session) -> R) -> Option<R> {
    SESSION.with(|cell| cell.borrow_mut().as_mut().map(f))
}

pub(crate) fn dispatch_timer(handle: TimerHandle) {
    scheduler::drop_retired();
    with_session(|session| {
        session.game.fire(handle);
        session.route_events();
    });
}

pub fn start(config: GameConfig) -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win.document().ok_or_else(|| JsValue::from_str("no document"))?;

    // Replacing a running session drops its scheduler, which clears its intervals.
    drop(SESSION.with(|cell| cell.borrow_mut().take()));

    let (hud, board) = build_page(&doc, &config)?;
    let renderer = DomRenderer::new(&doc, &config)?;
    board.append_child(renderer.element())?;

    let mut game = Game::new(config, renderer, IntervalScheduler::new())
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let events: Rc<RefCell<VecDeque<HostEvent>>> = Rc::default();
    {
        let queue = events.clone();
        game.set_on_state_change(move |state| queue.borrow_mut().push_back(HostEvent::StateChanged(state)));
        let queue = events.clone();
        game.set_on_target_eaten(move || queue.borrow_mut().push_back(HostEvent::TargetEaten));
        let queue = events.clone();
        game.set_on_win(move || queue.borrow_mut().push_back(HostEvent::Won));
    }

    let mut narrator = Narrator::new();
    let line_el = doc
        .get_element_by_id("horses-line")
        .ok_or_else(|| JsValue::from_str("narrator line element missing"))?;
    narrator.set_on_line_change(move |line| line_el.set_text_content(line.map(|l| l.text)));

    attach_listeners(&win)?;

    let mut session = Session {
        game,
        narrator,
        events,
        hud,
        swipe: SwipeTracker::default(),
    };
    session.game.start();
    session.route_events();
    SESSION.with(|cell| cell.replace(Some(session)));
    log::info!("horses started on a {}x{} board", config.grid_width, config.grid_height);
    Ok(())
}

pub fn restart() -> Result<(), JsValue> {
    with_session(Session::restart).ok_or_else(|| JsValue::from_str("game not started"))
}

fn styled(doc: &Document, tag: &str, id: &str, style: &str) -> Result<HtmlElement, JsValue> {
    let el: HtmlElement = doc.create_element(tag)?.dyn_into()?;
    if !id.is_empty() {
        el.set_id(id);
    }
    el.set_attribute("style", style)?;
    Ok(el)
}

/// Create (or rebuild) the page chrome. Returns the HUD and the board slot.
fn build_page(doc: &Document, config: &GameConfig) -> Result<(Hud, HtmlElement), JsValue> {
    let body = doc.body().ok_or_else(|| JsValue::from_str("no body"))?;
    let app: HtmlElement = match doc.get_element_by_id(ROOT_ID) {
        Some(el) => el.dyn_into()?,
        None => {
            let el = styled(
                doc,
                "div",
                ROOT_ID,
                "min-height:100vh; display:flex; flex-direction:column; align-items:center; justify-content:center; gap:16px; background:#1a202c; font-family:sans-serif;",
            )?;
            body.append_child(&el)?;
            el
        }
    };
    app.set_inner_html("");

    let style = doc.create_element("style")?;
    style.set_text_content(Some(EFFECT_CSS));
    app.append_child(&style)?;

    let title = styled(doc, "h1", "", "font-size:30px; font-weight:bold; color:#fff; margin:0;")?;
    title.set_text_content(Some("Horses"));
    app.append_child(&title)?;

    let herd = styled(doc, "p", "horses-herd", "font-size:20px; color:#fff; margin:0;")?;
    app.append_child(&herd)?;

    let line = styled(doc, "p", "horses-line", "min-height:24px; font-size:18px; color:#fefcbf; font-style:italic; margin:0; text-align:center; max-width:640px;")?;
    app.append_child(&line)?;

    let help = styled(doc, "p", "", "font-size:14px; color:#a0aec0; margin:0;")?;
    help.set_text_content(Some("Use arrow keys, WASD or swipe to move"));
    app.append_child(&help)?;

    let board = styled(doc, "div", "horses-board", "position:relative;")?;
    app.append_child(&board)?;

    let overlay = styled(
        doc,
        "div",
        "horses-win",
        "display:none; position:absolute; inset:0; background:rgba(0,0,0,0.6); color:#fff; font-size:28px; text-align:center; padding-top:35%; border-radius:8px;",
    )?;
    overlay.set_text_content(Some("The herd is complete 🐴"));
    let replay = styled(doc, "button", "horses-replay", "display:block; margin:16px auto 0; font-size:18px; padding:6px 16px; border-radius:6px;")?;
    replay.set_text_content(Some("Play again"));
    {
        let closure = Closure::wrap(Box::new(move || {
            if let Err(err) = restart() {
                log::warn!("restart failed: {err:?}");
            }
        }) as Box<dyn FnMut()>);
        replay.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    overlay.append_child(&replay)?;
    board.append_child(&overlay)?;

    let hud = Hud {
        root: app,
        herd,
        overlay,
        win_length: config.win_length,
    };
    hud.show_herd(1);
    Ok((hud, board))
}

/// Keyboard and touch listeners live on the window for the page's lifetime and
/// talk to whichever session is current.
fn attach_listeners(win: &web_sys::Window) -> Result<(), JsValue> {
    if LISTENERS_ATTACHED.with(|flag| flag.replace(true)) {
        return Ok(());
    }

    {
        let closure = Closure::wrap(Box::new(move |evt: KeyboardEvent| {
            let Some(direction) = key_to_direction(&evt.key()) else {
                return;
            };
            let running = with_session(|s| {
                s.game.submit_direction(direction);
                s.game.is_running()
            });
            if running == Some(true) {
                evt.prevent_default();
            }
        }) as Box<dyn FnMut(_)>);
        win.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Non-passive so an active game can stop the page from scrolling.
    let options = AddEventListenerOptions::new();
    options.set_passive(false);

    {
        let closure = Closure::wrap(Box::new(move |evt: TouchEvent| {
            let Some(touch) = evt.touches().get(0) else {
                return;
            };
            let running = with_session(|s| {
                s.swipe.begin(f64::from(touch.client_x()), f64::from(touch.client_y()));
                s.game.is_running()
            });
            if running == Some(true) {
                evt.prevent_default();
            }
        }) as Box<dyn FnMut(_)>);
        win.add_event_listener_with_callback_and_add_event_listener_options(
            "touchstart",
            closure.as_ref().unchecked_ref(),
            &options,
        )?;
        closure.forget();
    }

    {
        let closure = Closure::wrap(Box::new(move |evt: TouchEvent| {
            if with_session(|s| s.game.is_running()) == Some(true) {
                evt.prevent_default();
            }
        }) as Box<dyn FnMut(_)>);
        win.add_event_listener_with_callback_and_add_event_listener_options(
            "touchmove",
            closure.as_ref().unchecked_ref(),
            &options,
        )?;
        closure.forget();
    }

    {
        let closure = Closure::wrap(Box::new(move |evt: TouchEvent| {
            let Some(touch) = evt.changed_touches().get(0) else {
                return;
            };
            with_session(|s| {
                if let Some(direction) = s.swipe.end(f64::from(touch.client_x()), f64::from(touch.client_y())) {
                    s.game.submit_direction(direction);
                }
            });
        }) as Box<dyn FnMut(_)>);
        win.add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    Ok(())
}
