//! Flight control for the launch stack.
//!
//! One controller, parameterized per scenario, covers every flight variant:
//! - staged-thrust ascent of the joined stack
//! - stage separation and joint release
//! - booster reorientation and boostback burn
//! - terminal hover over the landing site
//!
//! All mutable per-run flags live in [`FlightState`], which is passed into
//! [`FlightController::tick`] and returned from it. The controller itself
//! holds only configuration, so a single instance can drive any number of
//! independent flights.

pub mod boostback;
pub mod config;
pub mod hover;
pub mod staging;
pub mod thrust;

#[cfg(test)]
mod proptest_control;

use bevy::math::DQuat;
use bevy::prelude::*;

pub use config::{ConfigError, FlightControllerConfig};
pub use staging::{JointId, JointRelease, SeparationEvent, StageGate, StageState};
pub use thrust::ThrustCommand;

use crate::types::VehicleState;
use crate::vehicle::VehicleBody;

use self::boostback::{BoostbackState, burn_step, reorient_step};

/// Coarse flight phase of the booster, for telemetry and logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FlightPhase {
    /// Joined stack under staged thrust.
    #[default]
    Ascent,
    /// Booster turning toward the boostback attitude.
    Reorienting,
    /// Boostback engine firing.
    BoostbackBurn,
    /// Booster falling unpowered.
    Descent,
    /// Hover loop engaged.
    Hover,
}

impl FlightPhase {
    /// Display label for telemetry.
    pub fn label(&self) -> &'static str {
        match self {
            FlightPhase::Ascent => "Ascent",
            FlightPhase::Reorienting => "Reorienting",
            FlightPhase::BoostbackBurn => "Boostback burn",
            FlightPhase::Descent => "Descent",
            FlightPhase::Hover => "Hover",
        }
    }
}

/// Per-run controller state.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FlightState {
    /// Separation gate (monotonic)
    pub stage: StageGate,
    /// Boostback turn and burn progress
    pub boostback: BoostbackState,
    /// Set once the hover loop takes over; never cleared
    pub hover_engaged: bool,
    /// Phase reported on the last tick
    pub phase: FlightPhase,
}

impl FlightState {
    /// Fresh state for a flight whose stages are held by `joint`.
    pub fn new(joint: Option<JointId>) -> Self {
        Self {
            stage: StageGate::new(joint),
            ..Default::default()
        }
    }
}

/// Everything the controller reads at the start of a tick.
#[derive(Clone, Copy, Debug)]
pub struct TickInput {
    /// Booster (the whole stack while attached)
    pub booster: VehicleState,
    /// Ship, if the flight has one
    pub ship: Option<VehicleState>,
    /// Flight time at the start of the tick
    pub elapsed: f64,
    /// Fixed timestep
    pub dt: f64,
}

/// Everything the controller asks of the physics side for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct TickOutput {
    /// Force on the booster
    pub booster_thrust: Option<ThrustCommand>,
    /// Attitude override for the booster
    pub booster_attitude: Option<DQuat>,
    /// Force on the ship
    pub ship_thrust: Option<ThrustCommand>,
    /// Set on the tick separation happens
    pub separation: Option<SeparationEvent>,
    /// Booster phase after this tick
    pub phase: FlightPhase,
}

impl TickOutput {
    /// Submit the booster commands.
    pub fn apply_to_booster(&self, booster: &mut impl VehicleBody) {
        if let Some(q) = self.booster_attitude {
            booster.set_orientation(q);
        }
        if let Some(cmd) = self.booster_thrust {
            booster.apply_local_force(cmd.force, cmd.point);
        }
    }

    /// Submit the ship commands.
    pub fn apply_to_ship(&self, ship: &mut impl VehicleBody) {
        if let Some(cmd) = self.ship_thrust {
            ship.apply_local_force(cmd.force, cmd.point);
        }
    }
}

/// Stateless flight controller. See the module docs.
#[derive(Clone, Debug, PartialEq)]
pub struct FlightController {
    config: FlightControllerConfig,
}

impl FlightController {
    /// Build a controller from a validated configuration.
    pub fn new(config: FlightControllerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FlightControllerConfig {
        &self.config
    }

    /// Run one control tick.
    pub fn tick(&self, mut state: FlightState, input: &TickInput) -> (FlightState, TickOutput) {
        let previous = state.phase;
        let mut output = TickOutput {
            phase: previous,
            ..Default::default()
        };

        if !input.booster.is_finite() {
            return (state, output);
        }

        let planet = &self.config.planet;
        let altitude = planet.altitude(input.booster.position);

        if !state.stage.is_separated() {
            output.separation = state
                .stage
                .evaluate(&self.config.separation, altitude, input.elapsed);
            if output.separation.is_none() {
                output.booster_thrust = self.config.ascent.command_for(&input.booster, planet);
                output.phase = FlightPhase::Ascent;
                state.phase = output.phase;
                return (state, output);
            }
        }

        if let (Some(ship_config), Some(ship)) = (&self.config.ship, &input.ship)
            && ship.is_finite()
        {
            output.ship_thrust = ship_config.command_for(ship, planet);
        }

        output.phase = self.booster_after_separation(&mut state, input, altitude, &mut output);

        if output.phase != previous {
            info!(
                "Booster phase {} -> {} at {:.1} km, t={:.1}",
                previous.label(),
                output.phase.label(),
                altitude,
                input.elapsed
            );
        }
        state.phase = output.phase;
        (state, output)
    }

    fn booster_after_separation(
        &self,
        state: &mut FlightState,
        input: &TickInput,
        altitude: f64,
        output: &mut TickOutput,
    ) -> FlightPhase {
        let planet = &self.config.planet;
        let site = self.config.landing_site;

        if let Some(hover) = &self.config.hover {
            if !state.hover_engaged && altitude < hover.engage_altitude {
                state.hover_engaged = true;
                if let Some(bb) = &self.config.boostback
                    && !state.boostback.is_burn_complete(bb)
                {
                    warn!("Hover engaged before boostback finished; abandoning boostback");
                }
            }
            if state.hover_engaged {
                output.booster_thrust = hover.command(&input.booster, planet, site);
                return FlightPhase::Hover;
            }
        }

        let Some(bb) = &self.config.boostback else {
            return FlightPhase::Descent;
        };

        if let Some(q) = reorient_step(bb, &mut state.boostback, &input.booster, planet, site) {
            output.booster_attitude = Some(q);
            return FlightPhase::Reorienting;
        }
        if let Some(cmd) = burn_step(bb, &mut state.boostback, input.dt) {
            output.booster_thrust = Some(cmd);
            return FlightPhase::BoostbackBurn;
        }
        FlightPhase::Descent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::boostback::BoostbackConfig;
    use crate::control::hover::HoverConfig;
    use crate::control::staging::SeparationTrigger;
    use crate::control::thrust::StagedThrustConfig;
    use crate::vehicle::RecordingVehicle;
    use approx::assert_relative_eq;
    use bevy::math::DVec3;

    fn landing_config() -> FlightControllerConfig {
        FlightControllerConfig {
            ship: Some(StagedThrustConfig::ASCENT),
            separation: SeparationTrigger {
                altitude_km: Some(70.0),
                burn_time: None,
            },
            boostback: Some(BoostbackConfig::default()),
            hover: Some(HoverConfig::default()),
            ..Default::default()
        }
    }

    fn input_at(altitude: f64, velocity: DVec3) -> TickInput {
        TickInput {
            booster: VehicleState {
                velocity,
                ..VehicleState::at_rest(DVec3::new(0.0, altitude, 0.0), 2.0e6)
            },
            ship: Some(VehicleState::at_rest(DVec3::new(0.0, altitude + 0.06, 0.0), 1.0e6)),
            elapsed: 0.0,
            dt: 1.0,
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = landing_config();
        config.hover = Some(HoverConfig {
            min_thrust: 2.0,
            max_thrust: 1.0,
            ..Default::default()
        });
        assert!(FlightController::new(config).is_err());
    }

    #[test]
    fn test_ascent_low_slow_gets_band_one_plus_assist() {
        let controller = FlightController::new(landing_config()).unwrap();
        let (state, out) = controller.tick(FlightState::new(None), &input_at(50.0, DVec3::Y));

        assert_eq!(out.phase, FlightPhase::Ascent);
        assert!(!state.stage.is_separated());
        let cmd = out.booster_thrust.unwrap();
        // Upright stack has a 90° tangent error, so a small roll term is present
        assert_relative_eq!(cmd.force.y, 80_000.0 + 10_000.0, epsilon = 1e-9);
        assert_relative_eq!(cmd.force.x, 90.0 * 0.007, epsilon = 1e-6);
        assert!(out.ship_thrust.is_none());
    }

    #[test]
    fn test_separation_tick_switches_control() {
        let controller = FlightController::new(landing_config()).unwrap();
        let (state, out) = controller.tick(FlightState::new(Some(JointId(0))), &input_at(71.0, DVec3::Y));

        assert!(out.separation.is_some());
        assert!(state.stage.is_separated());
        assert!(out.ship_thrust.is_some(), "ship keeps climbing after separation");
        assert_eq!(out.phase, FlightPhase::Reorienting);
        assert!(out.booster_attitude.is_some());
        assert!(out.booster_thrust.is_none(), "no burn while turning");

        // Second tick reports no new separation
        let (_, out) = controller.tick(state, &input_at(72.0, DVec3::Y));
        assert!(out.separation.is_none());
    }

    #[test]
    fn test_burn_follows_turn() {
        let controller = FlightController::new(landing_config()).unwrap();
        let mut state = FlightState::new(None);
        let input = input_at(75.0, DVec3::new(1.0, 0.5, 0.0));

        let mut phases = Vec::new();
        for _ in 0..200 {
            let (next, out) = controller.tick(state, &input);
            state = next;
            phases.push(out.phase);
        }

        let first_burn = phases.iter().position(|p| *p == FlightPhase::BoostbackBurn).unwrap();
        assert!(phases[..first_burn].iter().all(|p| *p == FlightPhase::Reorienting));
        assert_eq!(state.boostback.t, 1.0);
        // 40 units of burn at dt = 1, then ballistic
        let burns = phases.iter().filter(|p| **p == FlightPhase::BoostbackBurn).count();
        assert_eq!(burns, 40);
        assert_eq!(*phases.last().unwrap(), FlightPhase::Descent);
    }

    #[test]
    fn test_hover_engages_below_threshold_when_separated() {
        let controller = FlightController::new(landing_config()).unwrap();
        let hover = HoverConfig::default();
        let mut state = FlightState::new(None);
        state.stage.evaluate(&landing_config().separation, 80.0, 0.0);

        let (state, out) = controller.tick(state, &input_at(55.0, DVec3::NEG_Y));
        assert!(state.hover_engaged);
        assert_eq!(out.phase, FlightPhase::Hover);
        assert!(out.booster_thrust.is_some());

        // At the target altitude with a slow sink, thrust is about the baseline
        let (_, out) = controller.tick(state, &input_at(hover.target_altitude, DVec3::new(0.0, -0.01, 0.0)));
        let cmd = out.booster_thrust.unwrap();
        assert!(cmd.force.y > hover.baseline);
        assert_relative_eq!(cmd.force.y, hover.baseline, max_relative = 0.05);
    }

    #[test]
    fn test_hover_never_disengages() {
        let controller = FlightController::new(landing_config()).unwrap();
        let mut state = FlightState::new(None);
        state.stage.evaluate(&landing_config().separation, 80.0, 0.0);

        let (state, _) = controller.tick(state, &input_at(30.0, DVec3::ZERO));
        let (state, out) = controller.tick(state, &input_at(90.0, DVec3::ZERO));
        assert!(state.hover_engaged);
        assert_eq!(out.phase, FlightPhase::Hover);
    }

    #[test]
    fn test_non_finite_state_is_skipped() {
        let controller = FlightController::new(landing_config()).unwrap();
        let mut input = input_at(10.0, DVec3::ZERO);
        input.booster.position.x = f64::NAN;
        let (state, out) = controller.tick(FlightState::new(None), &input);
        assert!(out.booster_thrust.is_none());
        assert_eq!(state, FlightState::new(None));
    }

    #[test]
    fn test_independent_flights_share_controller() {
        let controller = FlightController::new(landing_config()).unwrap();
        let (a, _) = controller.tick(FlightState::new(None), &input_at(75.0, DVec3::X));
        let (b, _) = controller.tick(FlightState::new(None), &input_at(10.0, DVec3::X));
        assert!(a.stage.is_separated());
        assert!(!b.stage.is_separated());
    }

    #[test]
    fn test_output_is_applied_through_vehicle_interface() {
        let controller = FlightController::new(landing_config()).unwrap();
        let input = input_at(10.0, DVec3::ZERO);
        let (_, out) = controller.tick(FlightState::new(None), &input);

        let mut booster = RecordingVehicle::new(input.booster);
        out.apply_to_booster(&mut booster);
        assert_eq!(booster.forces.len(), 1);
        assert_eq!(booster.forces[0].1, StagedThrustConfig::ASCENT.application_point);
    }
}
