//! Boostback - Launch, Staging and Landing Simulator
//!
//! A library crate providing the flight controller, a reference rigid-body
//! world and the Bevy plugins that fly them together.

pub mod camera;
pub mod clock;
pub mod control;
pub mod flight;
pub mod input;
pub mod physics;
pub mod render;
pub mod scenarios;
pub mod types;
pub mod ui;
pub mod vehicle;

#[cfg(test)]
pub mod test_utils;
