//! Flight clock for the fixed-step simulation.
//!
//! Holds the simulated timestep and elapsed flight time, and gates every
//! flight system on the start/stop toggle.

use bevy::prelude::*;

use crate::types::FlightSystemSet;

/// Real-time rate at which fixed ticks run (Hz).
pub const TICK_RATE_HZ: f64 = 30.0;

/// Simulated time per tick used when a scenario does not override it.
pub const DEFAULT_DT: f64 = 1.0 / 30.0;

/// Plugin providing the flight clock.
pub struct ClockPlugin;

impl Plugin for ClockPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FlightClock>()
            .insert_resource(Time::<Fixed>::from_hz(TICK_RATE_HZ))
            .add_systems(
                FixedUpdate,
                advance_clock.after(FlightSystemSet::Physics),
            );
    }
}

/// Simulated flight time.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct FlightClock {
    /// Simulated seconds per fixed tick
    pub dt: f64,
    /// Simulated seconds since launch
    pub elapsed: f64,
    /// Whether the flight is advancing
    pub running: bool,
    /// Number of ticks taken since launch
    pub ticks: u64,
}

impl Default for FlightClock {
    fn default() -> Self {
        Self {
            dt: DEFAULT_DT,
            elapsed: 0.0,
            running: false,
            ticks: 0,
        }
    }
}

impl FlightClock {
    /// A stopped clock at t=0 with the given timestep.
    pub fn with_dt(dt: f64) -> Self {
        Self {
            dt,
            ..Default::default()
        }
    }

    /// Flip between running and stopped.
    pub fn toggle(&mut self) {
        self.running = !self.running;
        info!(
            "Flight {} at t={:.1}",
            if self.running { "started" } else { "stopped" },
            self.elapsed
        );
    }

    /// Back to t=0, stopped.
    pub fn reset(&mut self, dt: f64) {
        *self = Self::with_dt(dt);
    }

    fn tick(&mut self) {
        self.elapsed += self.dt;
        self.ticks += 1;
    }
}

fn advance_clock(mut clock: ResMut<FlightClock>) {
    if clock.running {
        clock.tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_clock_is_stopped() {
        let clock = FlightClock::default();
        assert!(!clock.running);
        assert_eq!(clock.elapsed, 0.0);
    }

    #[test]
    fn test_toggle_and_reset() {
        let mut clock = FlightClock::with_dt(1.0);
        clock.toggle();
        assert!(clock.running);
        clock.tick();
        clock.tick();
        assert_eq!(clock.elapsed, 2.0);
        assert_eq!(clock.ticks, 2);

        clock.reset(0.5);
        assert_eq!(clock, FlightClock::with_dt(0.5));
    }
}
