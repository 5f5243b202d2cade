//! Scripted narration: one line (and one effect) per apple eaten.

use crate::game::Effect;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NarratorLine {
    pub text: &'static str,
    pub effect: Effect,
}

const fn line(text: &'static str, effect: Effect) -> NarratorLine {
    NarratorLine { text, effect }
}

pub const NARRATOR_SCRIPT: &[NarratorLine] = &[
    line("Sometimes it's confusing", Effect::InvertControls),
    line(
        "But suddenly you get used to the quirks of the other, and it feels all natural again...",
        Effect::NormalControls,
    ),
    line("Except..", Effect::None),
    line("Could we walk faster?", Effect::Speed2x),
    line("Could we walk slowlier?", Effect::SpeedHalf),
    line("Until we meet on the middle", Effect::SpeedNormal),
    line("Or not…", Effect::SpeedOscillate),
    line("But with little acts we show our love", Effect::AppleToCoffee),
    line("Crisis might occur", Effect::ScreenShake),
    line("And we need to think outside of the box", Effect::WrapWalls),
    line("And we see the beauty in all of it!", Effect::AddFlowers),
    line("Ok, by now this all might feel endless,", Effect::ZoomOut1),
    line("and you may be starting to doubt this game will ever end…", Effect::ZoomOut2),
    line("Doubt comes", Effect::FadeToEnd),
];

type LineListener = Box<dyn FnMut(Option<&'static NarratorLine>)>;

/// Cursor over a fixed script. `-1` before the first line, clamped at the
/// script length once exhausted.
pub struct Narrator {
    script: &'static [NarratorLine],
    index: isize,
    on_line_change: Option<LineListener>,
}

impl Default for Narrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Narrator {
    pub fn new() -> Self {
        Self::with_script(NARRATOR_SCRIPT)
    }

    pub fn with_script(script: &'static [NarratorLine]) -> Self {
        Self {
            script,
            index: -1,
            on_line_change: None,
        }
    }

    pub fn set_on_line_change(&mut self, listener: impl FnMut(Option<&'static NarratorLine>) + 'static) {
        self.on_line_change = Some(Box::new(listener));
    }

    pub fn len(&self) -> usize {
        self.script.len()
    }

    pub fn is_empty(&self) -> bool {
        self.script.is_empty()
    }

    /// Move to the next line. Once the script runs out this keeps returning
    /// `None` without notifying.
    pub fn advance(&mut self) -> Option<&'static NarratorLine> {
        let len = self.script.len() as isize;
        if self.index < len {
            self.index += 1;
        }
        let line = self.current()?;
        log::debug!("narrator line {}: {:?}", self.index, line.effect);
        if let Some(listener) = self.on_line_change.as_mut() {
            listener(Some(line));
        }
        Some(line)
    }

    pub fn get_current_line(&self) -> Option<&'static NarratorLine> {
        self.current()
    }

    /// True once the last line has been shown.
    pub fn is_complete(&self) -> bool {
        self.index >= self.script.len() as isize - 1
    }

    pub fn reset(&mut self) {
        self.index = -1;
        if let Some(listener) = self.on_line_change.as_mut() {
            listener(None);
        }
    }

    fn current(&self) -> Option<&'static NarratorLine> {
        let script = self.script;
        usize::try_from(self.index).ok().and_then(|i| script.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn starts_without_a_line() {
        let narrator = Narrator::new();
        assert_eq!(narrator.get_current_line(), None);
        assert!(!narrator.is_complete());
    }

    #[test]
    fn walks_the_script_then_stays_exhausted() {
        let mut narrator = Narrator::new();
        for expected in NARRATOR_SCRIPT {
            assert_eq!(narrator.advance(), Some(expected));
            assert_eq!(narrator.get_current_line(), Some(expected));
        }
        assert!(narrator.is_complete());
        assert_eq!(narrator.advance(), None);
        assert_eq!(narrator.advance(), None);
        assert_eq!(narrator.get_current_line(), None);
    }

    #[test]
    fn reset_returns_to_start() {
        let mut narrator = Narrator::new();
        narrator.advance();
        narrator.advance();
        narrator.reset();
        assert_eq!(narrator.get_current_line(), None);
        assert!(!narrator.is_complete());
        assert_eq!(narrator.advance(), Some(&NARRATOR_SCRIPT[0]));
    }

    #[test]
    fn listener_sees_lines_and_reset() {
        let seen: Rc<RefCell<Vec<Option<Effect>>>> = Rc::default();
        let sink = seen.clone();
        let mut narrator = Narrator::new();
        narrator.set_on_line_change(move |line| sink.borrow_mut().push(line.map(|l| l.effect)));

        narrator.advance();
        narrator.reset();
        assert_eq!(*seen.borrow(), vec![Some(Effect::InvertControls), None]);
    }

    #[test]
    fn exhausted_advance_does_not_notify() {
        static SHORT: &[NarratorLine] = &[line("only", Effect::None)];
        let calls = Rc::new(RefCell::new(0));
        let counter = calls.clone();
        let mut narrator = Narrator::with_script(SHORT);
        narrator.set_on_line_change(move |_| *counter.borrow_mut() += 1);
        narrator.advance();
        narrator.advance();
        narrator.advance();
        assert_eq!(*calls.borrow(), 1);
    }
}
