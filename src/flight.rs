//! Flight orchestration: scenario loading, the control tick, telemetry.
//!
//! The control tick runs in FixedUpdate before the physics step. It reads
//! the vehicle states from the [`PhysicsWorld`], runs the controller, and
//! writes forces, attitude overrides and the joint release back.

use bevy::math::DVec3;
use bevy::prelude::*;

use crate::camera::CameraState;
use crate::clock::FlightClock;
use crate::control::{
    FlightController, FlightPhase, FlightState, JointId, SeparationEvent, StageState, TickInput,
    TickOutput,
};
use crate::physics::{BodyHandle, PhysicsWorld, WorldError};
use crate::scenarios::{CurrentScenario, FlightSetup, LoadScenario, build_world, get_scenario};
use crate::types::{FlightSystemSet, Planet};
use crate::vehicle::VehicleBody;

/// Plugin wiring scenarios, the controller and telemetry together.
#[derive(Default)]
pub struct FlightPlugin {
    /// Scenario to load at startup instead of the default.
    pub initial_scenario: Option<String>,
}

impl Plugin for FlightPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CurrentScenario>()
            .init_resource::<FlightTelemetry>()
            .insert_resource(InitialScenario(self.initial_scenario.clone()))
            .add_message::<LoadScenario>()
            .add_message::<ScenarioLoaded>()
            .add_systems(Startup, request_initial_scenario)
            .add_systems(Update, handle_load_scenario)
            .add_systems(FixedUpdate, flight_control.in_set(FlightSystemSet::Control));
    }
}

/// Scenario id requested on the command line.
#[derive(Resource, Default)]
struct InitialScenario(Option<String>);

/// Sent after a scenario has been loaded into the world.
#[derive(Message, Clone, Copy, Debug)]
pub struct ScenarioLoaded {
    pub scenario_id: &'static str,
}

/// Bodies of the current flight.
#[derive(Resource, Clone, Copy, Debug)]
pub struct FlightVehicles {
    pub booster: BodyHandle,
    pub ship: Option<BodyHandle>,
    pub joint: Option<JointId>,
    pub pad: BodyHandle,
    pub tower: BodyHandle,
    /// Pad / landing site (km)
    pub site: DVec3,
}

impl FlightVehicles {
    pub fn new(setup: &FlightSetup, site: DVec3) -> Self {
        Self {
            booster: setup.booster,
            ship: setup.ship,
            joint: setup.joint,
            pad: setup.pad,
            tower: setup.tower,
            site,
        }
    }
}

/// The controller flying the current scenario and its per-run state.
#[derive(Resource, Clone, Debug)]
pub struct ActiveFlight {
    pub controller: FlightController,
    pub state: FlightState,
}

/// Latest readings for the UI.
#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct FlightTelemetry {
    pub phase: FlightPhase,
    pub stage: StageState,
    pub hover_engaged: bool,
    /// Booster altitude (km)
    pub altitude: f64,
    /// Booster speed (km/s)
    pub speed: f64,
    /// Booster climb rate (km/s)
    pub vertical_speed: f64,
    /// Booster horizontal distance from the pad (km)
    pub downrange: f64,
    /// Booster thrust magnitude commanded this tick
    pub thrust: f64,
    pub ship_altitude: Option<f64>,
    pub ship_speed: Option<f64>,
    pub separation: Option<SeparationEvent>,
}

impl FlightTelemetry {
    /// Fold one tick into the readout.
    pub fn record(
        &mut self,
        planet: &Planet,
        site: DVec3,
        input: &TickInput,
        state: &FlightState,
        output: &TickOutput,
    ) {
        let booster = &input.booster;
        self.phase = output.phase;
        self.stage = state.stage.state();
        self.hover_engaged = state.hover_engaged;
        self.altitude = planet.altitude(booster.position);
        self.speed = booster.speed();
        self.vertical_speed = booster.vertical_velocity(planet);
        self.downrange = planet.downrange(booster.position, site);
        self.thrust = output.booster_thrust.map_or(0.0, |c| c.magnitude());
        self.ship_altitude = input.ship.map(|s| planet.altitude(s.position));
        self.ship_speed = input.ship.map(|s| s.speed());
        if output.separation.is_some() {
            self.separation = output.separation;
        }
    }
}

/// Run one control tick against the world.
///
/// Reads both vehicles, ticks the controller, submits the commands, and
/// releases the stage joint on the tick the gate opens.
pub fn step_flight(
    controller: &FlightController,
    state: FlightState,
    world: &mut PhysicsWorld,
    vehicles: &FlightVehicles,
    elapsed: f64,
    dt: f64,
) -> Result<(FlightState, TickInput, TickOutput), WorldError> {
    let booster = world.body_mut(vehicles.booster)?.snapshot();
    let ship = match vehicles.ship {
        Some(h) => Some(world.body_mut(h)?.snapshot()),
        None => None,
    };
    let input = TickInput {
        booster,
        ship,
        elapsed,
        dt,
    };

    let (mut state, output) = controller.tick(state, &input);

    output.apply_to_booster(&mut world.body_mut(vehicles.booster)?);
    if let Some(h) = vehicles.ship {
        output.apply_to_ship(&mut world.body_mut(h)?);
    }
    state.stage.release(world);
    Ok((state, input, output))
}

/// Resolve the startup scenario and ask for it to be loaded.
fn request_initial_scenario(
    initial: Res<InitialScenario>,
    current: Res<CurrentScenario>,
    mut load: MessageWriter<LoadScenario>,
) {
    let scenario_id = match initial.0.as_deref() {
        Some(requested) => match get_scenario(requested) {
            Some(scenario) => scenario.id,
            None => {
                warn!(
                    "Unknown scenario '{}', falling back to '{}'",
                    requested, current.id
                );
                current.id
            }
        },
        None => current.id,
    };
    load.write(LoadScenario { scenario_id });
}

/// Build the world and controller for each requested scenario.
pub fn handle_load_scenario(
    mut commands: Commands,
    mut requests: MessageReader<LoadScenario>,
    mut loaded: MessageWriter<ScenarioLoaded>,
    mut world: ResMut<PhysicsWorld>,
    mut clock: ResMut<FlightClock>,
    mut current: ResMut<CurrentScenario>,
    mut telemetry: ResMut<FlightTelemetry>,
    mut camera: ResMut<CameraState>,
) {
    for request in requests.read() {
        let Some(scenario) = get_scenario(request.scenario_id) else {
            warn!("Unknown scenario ID: {}", request.scenario_id);
            continue;
        };

        let controller = match scenario
            .validate()
            .and_then(|_| FlightController::new(scenario.controller))
        {
            Ok(controller) => controller,
            Err(err) => {
                error!("Scenario '{}' has an invalid configuration: {err}", scenario.id);
                continue;
            }
        };
        let setup = match build_world(scenario) {
            Ok(setup) => setup,
            Err(err) => {
                error!("Scenario '{}' could not be built: {err}", scenario.id);
                continue;
            }
        };

        info!("Loading scenario: {} ({})", scenario.name, scenario.id);

        commands.insert_resource(FlightVehicles::new(&setup, scenario.controller.landing_site));
        *world = setup.world;
        commands.insert_resource(ActiveFlight {
            controller,
            state: FlightState::new(setup.joint),
        });

        clock.reset(scenario.dt);
        *telemetry = FlightTelemetry::default();
        camera.view = scenario.camera_view;
        camera.zoom = 1.0;
        current.id = scenario.id;

        loaded.write(ScenarioLoaded {
            scenario_id: scenario.id,
        });
    }
}

/// Fixed-step control system.
fn flight_control(
    clock: Res<FlightClock>,
    vehicles: Option<Res<FlightVehicles>>,
    flight: Option<ResMut<ActiveFlight>>,
    mut world: ResMut<PhysicsWorld>,
    mut telemetry: ResMut<FlightTelemetry>,
) {
    if !clock.running {
        return;
    }
    let (Some(vehicles), Some(mut flight)) = (vehicles, flight) else {
        return;
    };

    let planet = world.planet;
    match step_flight(
        &flight.controller,
        flight.state,
        &mut world,
        &vehicles,
        clock.elapsed,
        clock.dt,
    ) {
        Ok((state, input, output)) => {
            telemetry.record(&planet, vehicles.site, &input, &state, &output);
            flight.state = state;
        }
        Err(err) => warn!("Flight tick skipped: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::presets::{BOOSTBACK_LANDING, HOVER_TEST};
    use crate::scenarios::Scenario;

    fn fly(scenario: &Scenario) -> (FlightController, FlightState, PhysicsWorld, FlightVehicles) {
        let setup = build_world(scenario).unwrap();
        let vehicles = FlightVehicles::new(&setup, scenario.controller.landing_site);
        (
            FlightController::new(scenario.controller).unwrap(),
            FlightState::new(setup.joint),
            setup.world,
            vehicles,
        )
    }

    #[test]
    fn test_stack_lifts_off() {
        let (controller, mut state, mut world, vehicles) = fly(&BOOSTBACK_LANDING);
        let dt = BOOSTBACK_LANDING.dt;
        for i in 0..20 {
            let (next, _, _) =
                step_flight(&controller, state, &mut world, &vehicles, i as f64 * dt, dt).unwrap();
            state = next;
            world.step(dt).unwrap();
        }
        let booster = world.body(vehicles.booster).unwrap().state;
        assert!(world.planet.altitude(booster.position) > 0.1);
        assert!(!state.stage.is_separated());
        assert!(world.constraint(vehicles.joint.unwrap()).is_some());
    }

    #[test]
    fn test_joint_released_on_separation() {
        // Stack already above the 70 km separation altitude
        let high = Scenario {
            start_altitude: 71.0,
            ..BOOSTBACK_LANDING
        };
        let (controller, state, mut world, vehicles) = fly(&high);

        let (state, _, output) =
            step_flight(&controller, state, &mut world, &vehicles, 0.0, 0.5).unwrap();
        assert!(output.separation.is_some());
        assert!(state.stage.is_released());
        assert!(world.constraints().is_empty());

        // Later ticks never touch the joint again
        let (state, _, output) =
            step_flight(&controller, state, &mut world, &vehicles, 0.5, 0.5).unwrap();
        assert!(output.separation.is_none());
        assert!(state.stage.is_released());
        assert!(output.ship_thrust.is_some());
    }

    #[test]
    fn test_hover_scenario_engages_immediately() {
        let (controller, state, mut world, vehicles) = fly(&HOVER_TEST);
        let (state, input, output) =
            step_flight(&controller, state, &mut world, &vehicles, 0.0, HOVER_TEST.dt).unwrap();
        assert!(state.hover_engaged);
        assert_eq!(output.phase, FlightPhase::Hover);
        // Controller saw the body as the world holds it
        let body = world.body(vehicles.booster).unwrap().state;
        assert_eq!(input.booster.position, body.position);
        assert_eq!(input.booster.velocity, body.velocity);
        assert_eq!(input.booster.mass, body.mass);
        assert!(input.ship.is_none());

        let mut telemetry = FlightTelemetry::default();
        telemetry.record(&world.planet, vehicles.site, &input, &state, &output);
        assert_eq!(telemetry.phase, FlightPhase::Hover);
        assert!(telemetry.hover_engaged);
        assert!(telemetry.altitude > 4.9);
        assert!(telemetry.ship_altitude.is_none());
    }
}
