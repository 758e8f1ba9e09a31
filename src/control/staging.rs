//! Stage-separation gate.
//!
//! Two states, `Attached` and `Separated`, with a single one-way transition
//! fired by an altitude threshold or a burn-time budget. The rigid joint
//! between the stages is released at most once per run.

use bevy::prelude::*;

/// Identifier of a rigid joint held by the physics collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JointId(pub u32);

/// Access to joint removal on the physics side.
pub trait JointRelease {
    /// Remove a joint. Returns `false` if it did not exist.
    fn release_joint(&mut self, joint: JointId) -> bool;
}

/// Conditions that end the attached phase. Whichever is met first wins.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct SeparationTrigger {
    /// Separate once altitude (km) reaches this value.
    pub altitude_km: Option<f64>,
    /// Separate once elapsed flight time reaches this value.
    pub burn_time: Option<f64>,
}

impl SeparationTrigger {
    /// A trigger that never fires (single-stack flights).
    pub const NEVER: SeparationTrigger = SeparationTrigger {
        altitude_km: None,
        burn_time: None,
    };

    /// Which condition, if any, is met.
    pub fn cause(&self, altitude_km: f64, elapsed: f64) -> Option<SeparationCause> {
        if self.altitude_km.is_some_and(|limit| altitude_km >= limit) {
            Some(SeparationCause::Altitude)
        } else if self.burn_time.is_some_and(|limit| elapsed >= limit) {
            Some(SeparationCause::BurnTime)
        } else {
            None
        }
    }
}

/// Current staging state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StageState {
    /// Booster and ship fly as one rigidly joined stack.
    #[default]
    Attached,
    /// The joint has been cut. There is no way back.
    Separated,
}

/// Why separation happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeparationCause {
    Altitude,
    BurnTime,
}

/// Emitted on the tick the gate transitions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeparationEvent {
    pub cause: SeparationCause,
    /// Booster altitude at separation (km)
    pub altitude_km: f64,
    /// Flight time at separation
    pub elapsed: f64,
}

/// Monotonic separation gate guarding a single joint release.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct StageGate {
    state: StageState,
    joint: Option<JointId>,
    released: bool,
}

impl StageGate {
    /// New attached gate guarding the given joint.
    ///
    /// `None` means the vehicles are not joined; separation still happens
    /// logically but there is nothing to release.
    pub fn new(joint: Option<JointId>) -> Self {
        Self {
            state: StageState::Attached,
            joint,
            released: false,
        }
    }

    pub fn state(&self) -> StageState {
        self.state
    }

    pub fn is_separated(&self) -> bool {
        self.state == StageState::Separated
    }

    /// Whether the joint has been released already.
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Check the trigger and transition if it is met.
    ///
    /// Returns the event only on the tick of the transition.
    pub fn evaluate(
        &mut self,
        trigger: &SeparationTrigger,
        altitude_km: f64,
        elapsed: f64,
    ) -> Option<SeparationEvent> {
        if self.state == StageState::Separated {
            return None;
        }
        let cause = trigger.cause(altitude_km, elapsed)?;
        self.state = StageState::Separated;
        info!(
            "Stage separation ({:?}) at {:.1} km, t={:.1}",
            cause, altitude_km, elapsed
        );
        Some(SeparationEvent {
            cause,
            altitude_km,
            elapsed,
        })
    }

    /// Release the joint if separated and not yet released.
    ///
    /// Returns `true` only for the call that actually removed the joint;
    /// every later call is a no-op.
    pub fn release(&mut self, joints: &mut impl JointRelease) -> bool {
        if self.state != StageState::Separated || self.released {
            return false;
        }
        self.released = true;

        let Some(joint) = self.joint else {
            return false;
        };
        if !joints.release_joint(joint) {
            warn!("Stage joint {:?} was already gone at separation", joint);
            return false;
        }
        true
    }
}
