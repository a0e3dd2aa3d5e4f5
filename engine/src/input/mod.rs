//! Input Module
//!
//! Intent-level input for racers. Raw device state never reaches the
//! simulation.

pub mod intents;

pub use intents::{ControlLevels, IntentTracker, RacerIntents};
