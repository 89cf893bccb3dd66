//! Wizard navigation — a linear cursor over the five step identifiers.
//!
//! DESIGN
//! ======
//! The navigator is a pure cursor: it holds no business data and enforces no
//! prerequisites. `next()` and `previous()` saturate at the ends instead of
//! wrapping or locking; `go_to` jumps anywhere (progress-bar clicks).
//! Prerequisite gating is advisory and lives in the step controllers.

use serde::{Deserialize, Serialize};

/// The five ordered wizard steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    Idea,
    Hook,
    Structure,
    Captions,
    Performance,
}

impl WizardStep {
    /// All steps in wizard order.
    pub const ALL: [Self; 5] = [Self::Idea, Self::Hook, Self::Structure, Self::Captions, Self::Performance];

    /// Zero-based position in the wizard order.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Idea => 0,
            Self::Hook => 1,
            Self::Structure => 2,
            Self::Captions => 3,
            Self::Performance => 4,
        }
    }

    /// Stable string identifier used in routes and progress rendering.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idea => "idea",
            Self::Hook => "hook",
            Self::Structure => "structure",
            Self::Captions => "captions",
            Self::Performance => "performance",
        }
    }

    /// Parse a step identifier. Returns `None` for anything unknown.
    #[must_use]
    pub fn from_str(raw: &str) -> Option<Self> {
        match raw {
            "idea" => Some(Self::Idea),
            "hook" => Some(Self::Hook),
            "structure" => Some(Self::Structure),
            "captions" => Some(Self::Captions),
            "performance" => Some(Self::Performance),
            _ => None,
        }
    }

    /// The step after this one, if any.
    #[must_use]
    pub fn successor(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// The step before this one, if any.
    #[must_use]
    pub fn predecessor(self) -> Option<Self> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }
}

/// Linear state machine over the wizard steps. Initial step is `Idea`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigator {
    current: WizardStep,
}

impl Navigator {
    #[must_use]
    pub fn new() -> Self {
        Self { current: WizardStep::Idea }
    }

    /// The active step.
    #[must_use]
    pub fn current(&self) -> WizardStep {
        self.current
    }

    /// Advance one step. No-op at `Performance`; there is no terminal lock.
    pub fn next(&mut self) -> WizardStep {
        if let Some(step) = self.current.successor() {
            self.current = step;
        }
        self.current
    }

    /// Retreat one step. No-op at `Idea`.
    pub fn previous(&mut self) -> WizardStep {
        if let Some(step) = self.current.predecessor() {
            self.current = step;
        }
        self.current
    }

    /// Jump directly to any step.
    pub fn go_to(&mut self, step: WizardStep) {
        self.current = step;
    }

    /// 1-based position and total step count, for progress rendering.
    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        (self.current.index() + 1, WizardStep::ALL.len())
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
