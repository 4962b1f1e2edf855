//! Keyboard navigation hook
//!
//! Prev/next bindings step the focus controller. Every `every_steps`
//! effective steps in one direction the viewport is asked to scroll by
//! `scroll_items` strides so the focused card doesn't run off-screen. Both
//! numbers are tuning knobs, not structural.

use std::str::FromStr;
use std::sync::Arc;

use ferrex_contracts::input::InputFocusArbiter;
use tracing::trace;

use crate::focus::{FocusController, StepDirection, StepOutcome};

/// Keys the carousel can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavKey {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    PageUp,
    PageDown,
    Home,
    End,
    Char(char),
}

impl FromStr for NavKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s.trim() {
            "ArrowLeft" | "Left" => NavKey::ArrowLeft,
            "ArrowRight" | "Right" => NavKey::ArrowRight,
            "ArrowUp" | "Up" => NavKey::ArrowUp,
            "ArrowDown" | "Down" => NavKey::ArrowDown,
            "PageUp" => NavKey::PageUp,
            "PageDown" => NavKey::PageDown,
            "Home" => NavKey::Home,
            "End" => NavKey::End,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => NavKey::Char(c.to_ascii_lowercase()),
                    _ => return Err(other.to_string()),
                }
            }
        };
        Ok(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBindings {
    pub prev: NavKey,
    pub next: NavKey,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            prev: NavKey::ArrowLeft,
            next: NavKey::ArrowRight,
        }
    }
}

impl KeyBindings {
    pub fn direction(&self, key: NavKey) -> Option<StepDirection> {
        let key = match key {
            NavKey::Char(c) => NavKey::Char(c.to_ascii_lowercase()),
            other => other,
        };
        if key == self.prev {
            Some(StepDirection::Prev)
        } else if key == self.next {
            Some(StepDirection::Next)
        } else {
            None
        }
    }
}

/// Ask the host to scroll the strip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    pub direction: StepDirection,
    pub items: usize,
    pub pixels: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeyOutcome {
    /// An editable element owns keyboard focus.
    Suppressed,
    /// Not a navigation key.
    Ignored,
    Stepped {
        step: StepOutcome,
        scroll: Option<ScrollRequest>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoScroll {
    pub every_steps: usize,
    pub scroll_items: usize,
    /// Item width plus spacing, in pixels.
    pub stride: f32,
}

#[derive(Debug)]
pub struct KeyboardNavigator {
    bindings: KeyBindings,
    arbiter: Arc<dyn InputFocusArbiter>,
    autoscroll: AutoScroll,
    streak: usize,
    last_direction: Option<StepDirection>,
}

impl KeyboardNavigator {
    pub fn new(
        bindings: KeyBindings,
        arbiter: Arc<dyn InputFocusArbiter>,
        autoscroll: AutoScroll,
    ) -> Self {
        Self {
            bindings,
            arbiter,
            autoscroll,
            streak: 0,
            last_direction: None,
        }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn handle(
        &mut self,
        key: NavKey,
        focus: &mut FocusController,
    ) -> KeyOutcome {
        let Some(direction) = self.bindings.direction(key) else {
            return KeyOutcome::Ignored;
        };
        if self.arbiter.editable_focused() {
            trace!("Navigation key {:?} suppressed by editable focus", key);
            return KeyOutcome::Suppressed;
        }

        let step = focus.step(direction);
        let scroll = if step.moved() {
            self.count_step(direction)
        } else {
            None
        };
        KeyOutcome::Stepped { step, scroll }
    }

    fn count_step(&mut self, direction: StepDirection) -> Option<ScrollRequest> {
        if self.last_direction != Some(direction) {
            self.streak = 0;
            self.last_direction = Some(direction);
        }
        self.streak += 1;

        let AutoScroll {
            every_steps,
            scroll_items,
            stride,
        } = self.autoscroll;
        if every_steps == 0 || self.streak % every_steps != 0 {
            return None;
        }
        Some(ScrollRequest {
            direction,
            items: scroll_items,
            pixels: scroll_items as f32 * stride,
        })
    }

    /// Forget the step streak, e.g. after a click or jump re-anchors focus.
    pub fn reset(&mut self) {
        self.streak = 0;
        self.last_direction = None;
    }
}
