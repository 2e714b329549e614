use super::expectation::SharedExpectation;
use super::substitute::Substitute;
use crate::{Result, TeddyError};

/// How a substitute interprets the next method call
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Record the call, then answer with the stubbed value or run the original
    #[default]
    Idle,
    /// The call defines stubbed behavior
    ConfiguringStub,
    /// The call queries recorded history
    Asserting,
}

/// What the last call made in a configuration or assertion pass touched
#[derive(Clone, Debug, Default)]
pub(crate) enum Touched {
    #[default]
    Nothing,
    /// Asserted on a method that has never been stubbed or called
    Untouched { method: String },
    Expectation {
        method: String,
        expectation: SharedExpectation,
        match_count: usize,
    },
}

/// Transient mode flags of one substitute
#[derive(Debug)]
pub(crate) struct ModeState {
    pub(crate) mode: Mode,
    pub(crate) validate_arguments: bool,
    pub(crate) touched: Touched,
}

impl ModeState {
    pub(crate) fn enter(&mut self, mode: Mode, validate_arguments: bool) -> Result<()> {
        if self.mode != Mode::Idle {
            return Err(TeddyError::InvalidState(format!(
                "cannot start {:?} while the substitute is already in {:?} mode",
                mode, self.mode
            )));
        }
        self.mode = mode;
        self.validate_arguments = validate_arguments;
        self.touched = Touched::Nothing;
        Ok(())
    }

    pub(crate) fn reset(&mut self) {
        self.mode = Mode::Idle;
        self.validate_arguments = true;
        self.touched = Touched::Nothing;
    }
}

impl Default for ModeState {
    fn default() -> Self {
        Self {
            mode: Mode::Idle,
            validate_arguments: true,
            touched: Touched::Nothing,
        }
    }
}

/// Holds a substitute in a non-idle mode for one configuration or assertion
/// pass. Dropping the guard returns the substitute to [`Mode::Idle`], also
/// when the pass returned an error or panicked.
pub(crate) struct ModeGuard<'a> {
    substitute: &'a Substitute,
}

impl<'a> ModeGuard<'a> {
    pub(crate) fn enter(
        substitute: &'a Substitute,
        mode: Mode,
        validate_arguments: bool,
    ) -> Result<Self> {
        substitute.with_mode(|state| state.enter(mode, validate_arguments))?;
        Ok(Self { substitute })
    }

    pub(crate) fn take_touched(&self) -> Touched {
        self.substitute
            .with_mode(|state| std::mem::take(&mut state.touched))
    }
}

impl Drop for ModeGuard<'_> {
    fn drop(&mut self) {
        self.substitute.with_mode(ModeState::reset);
    }
}
