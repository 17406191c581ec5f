//! A zoo that fills up while the room reads aloud and empties when it falls silent.
//!
//! [`population::Population`] owns the creatures and decides when new ones
//! appear; [`creature::Creature::update`] is the per-frame life cycle. The rest
//! wires those into a Bevy app.

pub mod audio;
pub mod config;
pub mod creature;
pub mod population;
pub mod render;
pub mod settings;
pub mod species;
pub mod zoo;

pub use audio::{SoundInput, VolumeIntensity, VolumeMeter};
pub use creature::{Creature, Frame, LifeState};
pub use population::{ConfigError, CreatureId, Population};
pub use settings::{SettingsError, SettingsStore, ZooSettings};
pub use species::Species;
pub use zoo::{Canvas, ReadingSession, SessionState};
