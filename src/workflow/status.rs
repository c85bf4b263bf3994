//! Provisioning lifecycle state machine.
//!
//! An instance moves through a fixed set of statuses, driven only by
//! the named transitions below. Operations apply a transition after the
//! corresponding remote effect has been confirmed, never before.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Lifecycle status of a provision instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Draft,
    Ready,
    InProgress,
    Active,
    Deactivate,
    Reprovision,
    Complete,
}

impl Status {
    /// The status every new instance starts in.
    pub const INITIAL: Status = Status::Draft;

    /// Stable identifier used in storage and logs.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Ready => "ready",
            Self::InProgress => "in_progress",
            Self::Active => "active",
            Self::Deactivate => "deactivate",
            Self::Reprovision => "reprovision",
            Self::Complete => "complete",
        }
    }

    /// Transitions that may be applied from this status.
    pub fn transitions(&self) -> &'static [Transition] {
        match self {
            Self::Draft => &[Transition::DraftToReady],
            Self::Ready => &[Transition::ReadyToInProgress],
            Self::InProgress => &[Transition::InProgressToActive],
            Self::Active => &[
                Transition::ActiveToDeactivate,
                Transition::ActiveToReprovision,
            ],
            Self::Deactivate => &[Transition::DeactivateToComplete],
            Self::Reprovision => &[
                Transition::ReprovisionToInProgress,
                Transition::ReprovisionToReady,
            ],
            Self::Complete => &[Transition::CompleteToReady],
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "draft" => Ok(Self::Draft),
            "ready" => Ok(Self::Ready),
            "in_progress" => Ok(Self::InProgress),
            "active" => Ok(Self::Active),
            "deactivate" => Ok(Self::Deactivate),
            "reprovision" => Ok(Self::Reprovision),
            "complete" => Ok(Self::Complete),
            other => Err(Error::Parse(format!("Unknown status: {}", other))),
        }
    }
}

/// A named, directional status transition.
///
/// The only regressions in the lifecycle are the re-provisioning loop
/// (`complete→ready`, `reprovision→ready`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    DraftToReady,
    ReadyToInProgress,
    InProgressToActive,
    ActiveToDeactivate,
    ActiveToReprovision,
    DeactivateToComplete,
    ReprovisionToInProgress,
    ReprovisionToReady,
    CompleteToReady,
}

impl Transition {
    /// All transitions the lifecycle defines.
    pub const ALL: [Transition; 9] = [
        Self::DraftToReady,
        Self::ReadyToInProgress,
        Self::InProgressToActive,
        Self::ActiveToDeactivate,
        Self::ActiveToReprovision,
        Self::DeactivateToComplete,
        Self::ReprovisionToInProgress,
        Self::ReprovisionToReady,
        Self::CompleteToReady,
    ];

    /// Stable identifier used in storage and logs.
    pub fn id(&self) -> &'static str {
        match self {
            Self::DraftToReady => "draft_to_ready",
            Self::ReadyToInProgress => "ready_to_inprogress",
            Self::InProgressToActive => "inprogress_to_active",
            Self::ActiveToDeactivate => "active_to_deactivate",
            Self::ActiveToReprovision => "active_to_reprovision",
            Self::DeactivateToComplete => "deactivate_to_complete",
            Self::ReprovisionToInProgress => "reprovision_to_inprogress",
            Self::ReprovisionToReady => "reprovision_to_ready",
            Self::CompleteToReady => "complete_to_ready",
        }
    }

    /// The status this transition starts from.
    pub fn from(&self) -> Status {
        match self {
            Self::DraftToReady => Status::Draft,
            Self::ReadyToInProgress => Status::Ready,
            Self::InProgressToActive => Status::InProgress,
            Self::ActiveToDeactivate | Self::ActiveToReprovision => Status::Active,
            Self::DeactivateToComplete => Status::Deactivate,
            Self::ReprovisionToInProgress | Self::ReprovisionToReady => Status::Reprovision,
            Self::CompleteToReady => Status::Complete,
        }
    }

    /// The status this transition lands in.
    pub fn to(&self) -> Status {
        match self {
            Self::DraftToReady | Self::ReprovisionToReady | Self::CompleteToReady => Status::Ready,
            Self::ReadyToInProgress | Self::ReprovisionToInProgress => Status::InProgress,
            Self::InProgressToActive => Status::Active,
            Self::ActiveToDeactivate => Status::Deactivate,
            Self::ActiveToReprovision => Status::Reprovision,
            Self::DeactivateToComplete => Status::Complete,
        }
    }

    /// Apply this transition to the current status.
    ///
    /// Refuses with [`Error::Transition`] when `current` is not this
    /// transition's source status; the state is never changed on refusal.
    pub fn apply(&self, current: Status) -> Result<Status> {
        if current != self.from() {
            return Err(Error::Transition {
                transition: self.id(),
                from: current,
            });
        }
        Ok(self.to())
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}
