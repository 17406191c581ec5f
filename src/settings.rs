//! User preferences: what the settings window edits and what gets saved to disk.
//!
//! Loading never fails the app. A missing file means defaults; a broken one is
//! reported and replaced by defaults.

use crate::audio::VolumeMeter;
use crate::config::*;
use crate::population::{ConfigError, Population};
use crate::species::Species;
use bevy::prelude::*;
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("spawn interval must be between {min} and {max} seconds, got {value}")]
    SpawnInterval { value: u32, min: u32, max: u32 },
    #[error("select at least one species")]
    NoSpecies,
    #[error("max population must be between {min} and {max}, got {value}")]
    MaxPopulation { value: usize, min: usize, max: usize },
    #[error("volume threshold must be between 0 and 100, got {0}")]
    VolumeThreshold(f32),
    #[error("could not access settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse settings file: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("could not write settings: {0}")]
    Serialize(#[from] ron::Error),
    #[error(transparent)]
    Rejected(#[from] ConfigError),
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ZooSettings {
    /// Seconds between creatures at 1x speed
    pub spawn_interval: u32,
    pub enabled_species: Vec<Species>,
    pub max_population: usize,
    /// Volume (0-100) that counts as reading aloud
    pub volume_threshold: f32,
}

impl Default for ZooSettings {
    fn default() -> Self {
        Self {
            spawn_interval: DEFAULT_SPAWN_INTERVAL as u32,
            enabled_species: Species::ALL.to_vec(),
            max_population: DEFAULT_MAX_POPULATION,
            volume_threshold: DEFAULT_SOUND_THRESHOLD,
        }
    }
}

impl ZooSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        let (min, max) = SPAWN_INTERVAL_BOUNDS;
        if !(min..=max).contains(&self.spawn_interval) {
            return Err(SettingsError::SpawnInterval {
                value: self.spawn_interval,
                min,
                max,
            });
        }
        if self.enabled_species.is_empty() {
            return Err(SettingsError::NoSpecies);
        }
        let (min, max) = MAX_POPULATION_BOUNDS;
        if !(min..=max).contains(&self.max_population) {
            return Err(SettingsError::MaxPopulation {
                value: self.max_population,
                min,
                max,
            });
        }
        if !(0.0..=100.0).contains(&self.volume_threshold) {
            return Err(SettingsError::VolumeThreshold(self.volume_threshold));
        }
        Ok(())
    }

    pub fn is_enabled(&self, species: Species) -> bool {
        self.enabled_species.contains(&species)
    }

    /// Turn one species on or off, keeping the list free of duplicates
    pub fn set_enabled(&mut self, species: Species, enabled: bool) {
        self.enabled_species.retain(|&s| s != species);
        if enabled {
            self.enabled_species.push(species);
            self.enabled_species.sort();
        }
    }

    pub fn set_all_enabled(&mut self, enabled: bool) {
        self.enabled_species = if enabled { Species::ALL.to_vec() } else { Vec::new() };
    }

    pub fn from_ron(text: &str) -> Result<Self, SettingsError> {
        let settings: ZooSettings = ron::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_ron(&self) -> Result<String, SettingsError> {
        Ok(ron::ser::to_string_pretty(self, PrettyConfig::new())?)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path)?;
        Self::from_ron(&text)
    }

    /// Defaults when the file is missing or unusable
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!("No settings at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => {
                info!("Loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                warn!("Ignoring settings at {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    /// Validate, then write. Invalid settings are never persisted.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        self.validate()?;
        fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// Push these settings into the engine and the meter. Validation happens
    /// first, so a rejected update leaves both untouched.
    pub fn apply(&self, population: &mut Population, meter: &mut VolumeMeter) -> Result<(), SettingsError> {
        self.validate()?;
        population.set_spawn_interval(self.spawn_interval as f32)?;
        population.set_max_population(self.max_population)?;
        population.set_enabled_species(self.enabled_species.iter().copied())?;
        population.set_sound_threshold(self.volume_threshold)?;
        meter.set_threshold(self.volume_threshold);
        Ok(())
    }
}

/// Resource holding the applied settings, a draft the settings window edits,
/// and where they are saved
#[derive(Resource, Debug, Clone)]
pub struct SettingsStore {
    pub path: PathBuf,
    pub current: ZooSettings,
    pub draft: ZooSettings,
    /// Last outcome shown under the settings form
    pub status: Option<String>,
}

impl SettingsStore {
    pub fn new(path: PathBuf, current: ZooSettings) -> Self {
        Self {
            path,
            draft: current.clone(),
            current,
            status: None,
        }
    }

    /// Apply and persist the draft. On failure nothing changes except `status`.
    pub fn commit(&mut self, population: &mut Population, meter: &mut VolumeMeter) -> Result<(), SettingsError> {
        let result = self
            .draft
            .apply(population, meter)
            .and_then(|()| self.draft.save(&self.path));
        match &result {
            Ok(()) => {
                self.current = self.draft.clone();
                self.status = Some("Settings saved".to_string());
                info!("Settings saved to {}", self.path.display());
            }
            Err(err) => {
                self.status = Some(err.to_string());
                warn!("Settings rejected: {}", err);
            }
        }
        result
    }

    /// Put defaults in the draft; they take effect on the next commit
    pub fn reset_draft(&mut self) {
        self.draft = ZooSettings::default();
        self.status = Some("Defaults restored, save to apply".to_string());
    }

    /// Throw away unsaved edits
    pub fn revert_draft(&mut self) {
        self.draft = self.current.clone();
        self.status = None;
    }
}

/// System to read saved settings at startup and hand them to the engine
pub fn load_settings(
    mut store: ResMut<SettingsStore>,
    mut population: ResMut<Population>,
    mut meter: ResMut<VolumeMeter>,
) {
    let loaded = ZooSettings::load_or_default(&store.path);
    if let Err(err) = loaded.apply(&mut population, &mut meter) {
        warn!("Could not apply settings: {}", err);
    }
    let path = store.path.clone();
    *store = SettingsStore::new(path, loaded);
}
