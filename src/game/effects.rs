//! Effect engine: narrator effects that change how the game plays.
//!
//! Speed effects share one slot. Applying any effect first cancels a running
//! oscillation and puts the tick interval back to base, then applies itself.
//! Effects with no gameplay meaning here (shake, flowers, zoom, fade, and any
//! unknown identifier) are left to the host's visual layer.

use std::convert::Infallible;
use std::str::FromStr;

use serde::Deserialize;

use super::timer::TimerHandle;
use super::{APPLE_GLYPH, COFFEE_GLYPH, Game};

/// Period of the speed oscillation, independent of the tick rate.
pub const OSCILLATION_PERIOD_MS: u32 = 1_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum Effect {
    None,
    InvertControls,
    NormalControls,
    Speed2x,
    SpeedHalf,
    SpeedNormal,
    SpeedOscillate,
    AppleToCoffee,
    ScreenShake,
    WrapWalls,
    AddFlowers,
    ZoomOut1,
    ZoomOut2,
    FadeToEnd,
    Unknown,
}

impl Effect {
    const NAMED: [Effect; 14] = [
        Effect::None,
        Effect::InvertControls,
        Effect::NormalControls,
        Effect::Speed2x,
        Effect::SpeedHalf,
        Effect::SpeedNormal,
        Effect::SpeedOscillate,
        Effect::AppleToCoffee,
        Effect::ScreenShake,
        Effect::WrapWalls,
        Effect::AddFlowers,
        Effect::ZoomOut1,
        Effect::ZoomOut2,
        Effect::FadeToEnd,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Effect::None => "none",
            Effect::InvertControls => "invert_controls",
            Effect::NormalControls => "normal_controls",
            Effect::Speed2x => "speed_2x",
            Effect::SpeedHalf => "speed_half",
            Effect::SpeedNormal => "speed_normal",
            Effect::SpeedOscillate => "speed_oscillate",
            Effect::AppleToCoffee => "apple_to_coffee",
            Effect::ScreenShake => "screen_shake",
            Effect::WrapWalls => "wrap_walls",
            Effect::AddFlowers => "add_flowers",
            Effect::ZoomOut1 => "zoom_out_1",
            Effect::ZoomOut2 => "zoom_out_2",
            Effect::FadeToEnd => "fade_to_end",
            Effect::Unknown => "unknown",
        }
    }

    /// Effects the game ignores and the host renders.
    pub fn is_cosmetic(self) -> bool {
        matches!(
            self,
            Effect::ScreenShake
                | Effect::AddFlowers
                | Effect::ZoomOut1
                | Effect::ZoomOut2
                | Effect::FadeToEnd
                | Effect::Unknown
        )
    }
}

impl FromStr for Effect {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Effect::NAMED
            .into_iter()
            .find(|e| e.as_str() == s)
            .unwrap_or(Effect::Unknown))
    }
}

impl From<String> for Effect {
    fn from(id: String) -> Self {
        match id.parse() {
            Ok(effect) => effect,
            Err(never) => match never {},
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Oscillation {
    pub(crate) handle: TimerHandle,
    pub(crate) next_fast: bool,
}

/// Effect-driven session flags. Control inversion lives on the resolver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct EffectState {
    pub(crate) base_interval_ms: u32,
    pub(crate) interval_ms: u32,
    pub(crate) wrap_walls: bool,
    /// Target hidden; the next wall contact counts as eating it.
    pub(crate) armed: bool,
    pub(crate) target_glyph: &'static str,
    pub(crate) oscillation: Option<Oscillation>,
}

impl EffectState {
    pub(crate) fn new(base_interval_ms: u32) -> Self {
        Self {
            base_interval_ms,
            interval_ms: base_interval_ms,
            wrap_walls: false,
            armed: false,
            target_glyph: APPLE_GLYPH,
            oscillation: None,
        }
    }

    pub(crate) fn fast_interval(&self) -> u32 {
        (self.base_interval_ms / 2).max(1)
    }

    pub(crate) fn slow_interval(&self) -> u32 {
        self.base_interval_ms.saturating_mul(2)
    }
}

impl Game {
    pub fn apply_effect(&mut self, effect: Effect) {
        if self.cancel_oscillation() {
            self.set_tick_interval(self.effects.base_interval_ms);
        }
        log::debug!("applying effect {}", effect.as_str());

        match effect {
            Effect::InvertControls => self.resolver.set_inverted(true),
            Effect::NormalControls => self.resolver.set_inverted(false),
            Effect::Speed2x => self.set_tick_interval(self.effects.fast_interval()),
            Effect::SpeedHalf => self.set_tick_interval(self.effects.slow_interval()),
            Effect::SpeedNormal => self.set_tick_interval(self.effects.base_interval_ms),
            Effect::SpeedOscillate if !self.running => {
                log::debug!("loop stopped, oscillation not started");
            }
            Effect::SpeedOscillate => {
                let handle = self.scheduler.set_interval(OSCILLATION_PERIOD_MS);
                self.effects.oscillation = Some(Oscillation {
                    handle,
                    next_fast: true,
                });
            }
            Effect::AppleToCoffee => {
                self.effects.target_glyph = COFFEE_GLYPH;
                self.render();
            }
            Effect::WrapWalls => {
                self.effects.wrap_walls = true;
                self.effects.armed = true;
                // hides the target
                self.render();
            }
            Effect::None => {}
            Effect::ScreenShake
            | Effect::AddFlowers
            | Effect::ZoomOut1
            | Effect::ZoomOut2
            | Effect::FadeToEnd
            | Effect::Unknown => {}
        }
    }

    /// Change the tick interval; a running loop swaps its timer for a new one.
    pub(crate) fn set_tick_interval(&mut self, interval_ms: u32) {
        self.effects.interval_ms = interval_ms;
        if let Some(old) = self.tick_timer.take() {
            self.scheduler.clear_interval(old);
            self.tick_timer = Some(self.scheduler.set_interval(interval_ms));
            log::debug!("tick rescheduled at {interval_ms}ms");
        }
    }

    /// One oscillation period elapsed: flip between fast and slow.
    pub(crate) fn oscillate(&mut self) {
        if !self.running {
            return;
        }
        let Some(oscillation) = self.effects.oscillation.as_mut() else {
            return;
        };
        let fast = oscillation.next_fast;
        oscillation.next_fast = !fast;
        let interval = if fast {
            self.effects.fast_interval()
        } else {
            self.effects.slow_interval()
        };
        self.set_tick_interval(interval);
    }

    /// Drop the oscillation timer, if any. Returns whether one was running.
    pub(crate) fn cancel_oscillation(&mut self) -> bool {
        match self.effects.oscillation.take() {
            Some(oscillation) => {
                self.scheduler.clear_interval(oscillation.handle);
                true
            }
            None => false,
        }
    }
}
