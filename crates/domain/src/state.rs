//! Check lifecycle.
//!
//! Every check moves through `Idle -> Requesting -> (Responded | Failed) -> Reported`
//! exactly once.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Where a check is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckPhase {
    /// Not started.
    #[default]
    Idle,
    /// Request in flight.
    Requesting,
    /// A response arrived (any status).
    Responded,
    /// The request could not complete or was rejected before sending.
    Failed,
    /// The outcome has been turned into a result.
    Reported,
}

impl CheckPhase {
    /// Returns the phase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Requesting => "requesting",
            Self::Responded => "responded",
            Self::Failed => "failed",
            Self::Reported => "reported",
        }
    }

    /// Whether moving to `next` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Requesting | Self::Failed)
                | (Self::Requesting, Self::Responded | Self::Failed)
                | (Self::Responded | Self::Failed, Self::Reported)
        )
    }

    /// Moves to `next`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPhaseTransition` if the lifecycle forbids the move.
    pub const fn transition(self, next: Self) -> DomainResult<Self> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::InvalidPhaseTransition {
                from: self.as_str(),
                to: next.as_str(),
            })
        }
    }

    /// Returns true once no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Reported)
    }
}

impl fmt::Display for CheckPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
