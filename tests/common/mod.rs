//! Common test utilities for integration tests.

#![allow(dead_code)]

use boostback::control::{FlightController, FlightPhase, FlightState, TickOutput};
use boostback::flight::{FlightVehicles, step_flight};
use boostback::physics::PhysicsWorld;
use boostback::scenarios::{Scenario, build_world, get_scenario};
use boostback::types::VehicleState;

/// A scenario flown without Bevy: controller tick, then physics step.
pub struct Flight {
    pub controller: FlightController,
    pub state: FlightState,
    pub world: PhysicsWorld,
    pub vehicles: FlightVehicles,
    pub elapsed: f64,
    pub dt: f64,
    /// Distinct booster phases in the order they were entered
    pub phases: Vec<FlightPhase>,
    /// Ticks that reported a separation
    pub separations: usize,
    /// Lowest booster altitude seen (km)
    pub min_altitude: f64,
}

impl Flight {
    pub fn new(scenario: &Scenario) -> Self {
        let setup = build_world(scenario).expect("preset world builds");
        let vehicles = FlightVehicles::new(&setup, scenario.controller.landing_site);
        let world = setup.world;
        let min_altitude = world
            .planet
            .altitude(world.body(vehicles.booster).unwrap().state.position);
        Self {
            controller: FlightController::new(scenario.controller).expect("preset config is valid"),
            state: FlightState::new(vehicles.joint),
            world,
            vehicles,
            elapsed: 0.0,
            dt: scenario.dt,
            phases: Vec::new(),
            separations: 0,
            min_altitude,
        }
    }

    pub fn load(id: &str) -> Self {
        Self::new(get_scenario(id).expect("preset exists"))
    }

    /// One fixed tick, in the same order the app runs it.
    pub fn tick(&mut self) -> TickOutput {
        let (state, _, output) = step_flight(
            &self.controller,
            self.state,
            &mut self.world,
            &self.vehicles,
            self.elapsed,
            self.dt,
        )
        .expect("vehicle bodies exist");
        self.state = state;
        self.world.step(self.dt).expect("positive dt");
        self.elapsed += self.dt;

        if self.phases.last() != Some(&output.phase) {
            self.phases.push(output.phase);
        }
        if output.separation.is_some() {
            self.separations += 1;
        }
        self.min_altitude = self.min_altitude.min(self.altitude());
        output
    }

    /// Tick until `seconds` of flight time have passed.
    pub fn run_for(&mut self, seconds: f64) {
        let end = self.elapsed + seconds;
        while self.elapsed < end - 1e-9 {
            self.tick();
        }
    }

    /// Tick until the predicate holds, giving up after `max_seconds`.
    pub fn run_until(&mut self, max_seconds: f64, mut done: impl FnMut(&Flight) -> bool) -> bool {
        let end = self.elapsed + max_seconds;
        while self.elapsed < end {
            self.tick();
            if done(self) {
                return true;
            }
        }
        false
    }

    pub fn booster(&self) -> VehicleState {
        self.world.body(self.vehicles.booster).unwrap().state
    }

    pub fn ship(&self) -> Option<VehicleState> {
        self.vehicles
            .ship
            .map(|h| self.world.body(h).unwrap().state)
    }

    pub fn altitude(&self) -> f64 {
        self.world.planet.altitude(self.booster().position)
    }

    /// Horizontal distance of the booster from the landing site (km).
    pub fn downrange(&self) -> f64 {
        self.world
            .planet
            .downrange(self.booster().position, self.vehicles.site)
    }
}
