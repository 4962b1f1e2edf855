//! Jump-to-index input state machine
//!
//! `Idle → Editing(Empty | Invalid) → Idle` on blur or on a valid commit.
//! Nothing typed into the field is propagated as an index until a commit
//! validates it.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JumpError {
    #[error("no index entered")]
    Empty,
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("index {value} is outside 1..={upper}")]
    OutOfRange { value: usize, upper: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditingReason {
    Empty,
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputState {
    #[default]
    Idle,
    Editing(EditingReason),
}

impl InputState {
    pub fn is_editing(&self) -> bool {
        matches!(self, InputState::Editing(_))
    }
}

#[derive(Debug, Default, Clone)]
pub struct JumpInput {
    state: InputState,
}

impl JumpInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InputState {
        self.state
    }

    /// Validate `raw` against `1..=upper`. Success returns the index and
    /// goes Idle; failure marks the field as editing.
    pub fn commit(&mut self, raw: &str, upper: usize) -> Result<usize, JumpError> {
        match parse_index(raw, upper) {
            Ok(index) => {
                self.state = InputState::Idle;
                Ok(index)
            }
            Err(err) => {
                self.state = InputState::Editing(match err {
                    JumpError::Empty => EditingReason::Empty,
                    _ => EditingReason::Invalid,
                });
                Err(err)
            }
        }
    }

    /// Focus left the field: drop whatever was being edited.
    pub fn blur(&mut self) {
        self.state = InputState::Idle;
    }
}

fn parse_index(raw: &str, upper: usize) -> Result<usize, JumpError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(JumpError::Empty);
    }
    let value: usize = trimmed
        .parse()
        .map_err(|_| JumpError::NotANumber(trimmed.to_string()))?;
    if value == 0 || value > upper {
        return Err(JumpError::OutOfRange { value, upper });
    }
    Ok(value)
}
