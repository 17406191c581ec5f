use crate::config::*;
use crate::creature::{Creature, Frame};
use crate::species::Species;
use bevy::prelude::{Resource, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slotmap::{SlotMap, new_key_type};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

new_key_type! {
    /// Stable handle for a creature; never reused for a different creature.
    pub struct CreatureId;
}

/// Rejected configuration change. The engine keeps its previous value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("max population must be at least 1")]
    ZeroCapacity,
    #[error("at least one species must stay enabled")]
    NoSpecies,
    #[error("spawn interval must be a positive number of seconds, got {0}")]
    InvalidInterval(f32),
    #[error("speed multiplier must be positive, got {0}")]
    InvalidSpeed(f32),
    #[error("sound threshold must be within 0..=100, got {0}")]
    ThresholdOutOfRange(f32),
}

/// Owns every live creature and decides when new ones may appear
#[derive(Resource)]
pub struct Population {
    creatures: SlotMap<CreatureId, Creature>,
    /// Update (and render) order: oldest first
    order: Vec<CreatureId>,
    max_population: usize,
    enabled: BTreeSet<Species>,
    base_interval: f32,
    /// `None` once the gate has been reset, so the next check passes
    last_spawn_time: Option<f32>,
    sound_threshold: f32,
    bounds: Vec2,
    clock: f32,
    rng: StdRng,
}

impl Default for Population {
    fn default() -> Self {
        Self::new()
    }
}

impl Population {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic engine for tests and replays
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            creatures: SlotMap::with_key(),
            order: Vec::new(),
            max_population: DEFAULT_MAX_POPULATION,
            enabled: Species::ALL.into_iter().collect(),
            base_interval: DEFAULT_SPAWN_INTERVAL,
            last_spawn_time: Some(0.0),
            sound_threshold: DEFAULT_SOUND_THRESHOLD,
            bounds: Vec2::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT),
            clock: 0.0,
            rng,
        }
    }

    // ------------------------------------------------------------------
    // Spawning
    // ------------------------------------------------------------------

    pub fn is_full(&self) -> bool {
        self.creatures.len() >= self.max_population
    }

    /// Spawn one creature somewhere on the canvas. Returns `None` when the zoo
    /// is full or nothing is enabled; that is an ordinary outcome, not an error.
    pub fn spawn(&mut self, species: Option<Species>) -> Option<CreatureId> {
        if self.is_full() || self.enabled.is_empty() {
            return None;
        }

        let species = match species {
            Some(species) => species,
            None => {
                let pick = self.rng.gen_range(0..self.enabled.len());
                *self.enabled.iter().nth(pick)?
            }
        };

        let margin = species.size();
        let position = Vec2::new(
            self.random_axis(margin, self.bounds.x),
            self.random_axis(margin, self.bounds.y),
        );
        let velocity = Vec2::new(
            self.rng.gen_range(-SPAWN_SPEED_RANGE..SPAWN_SPEED_RANGE),
            self.rng.gen_range(-SPAWN_SPEED_RANGE..SPAWN_SPEED_RANGE),
        );
        let phase = self.rng.gen_range(0.0..std::f32::consts::TAU);

        let creature = Creature::new(species, position, velocity, self.clock, phase)
            .with_sound_threshold(self.sound_threshold);
        self.insert(creature)
    }

    /// Uniform in `[margin, extent - margin]`; centered when the canvas is too small
    fn random_axis(&mut self, margin: f32, extent: f32) -> f32 {
        let high = extent - margin;
        if high > margin {
            self.rng.gen_range(margin..=high)
        } else {
            extent * 0.5
        }
    }

    /// Add a prepared creature. Capacity still applies.
    pub fn insert(&mut self, creature: Creature) -> Option<CreatureId> {
        if self.is_full() {
            return None;
        }
        let id = self.creatures.insert(creature);
        self.order.push(id);
        Some(id)
    }

    /// Rate gate. Passes at most once per `base_interval / speed` seconds and
    /// restarts the interval when it does. Non-positive speeds never pass.
    pub fn should_spawn(&mut self, now: f32, speed: f32) -> bool {
        if !(speed > 0.0) {
            return false;
        }
        let interval = self.base_interval / speed;
        if let Some(last) = self.last_spawn_time {
            if now - last < interval {
                return false;
            }
        }
        self.last_spawn_time = Some(now);
        true
    }

    /// Full admission: rate gate, then a coin flip weighted by `speed`, then spawn.
    /// `speed` is the user speed times the audio speed multiplier.
    pub fn admit(&mut self, now: f32, speed: f32) -> Option<CreatureId> {
        if !self.should_spawn(now, speed) {
            return None;
        }
        let chance = (speed as f64 * SPAWN_CHANCE_PER_SPEED).clamp(0.0, MAX_SPAWN_CHANCE);
        if !self.rng.gen_bool(chance) {
            return None;
        }
        self.spawn(None)
    }

    /// Let the next gate check pass immediately
    pub fn reset_spawn_timer(&mut self) {
        self.last_spawn_time = None;
    }

    // ------------------------------------------------------------------
    // Per-frame update
    // ------------------------------------------------------------------

    /// Advance every creature by `dt` seconds and drop the ones whose life ran
    /// out. Each creature is updated and judged in one step. Returns the number
    /// culled. Zero, negative or NaN `dt` changes nothing.
    pub fn tick(&mut self, dt: f32, width: f32, height: f32, volume: f32) -> usize {
        self.resize(width, height);
        if !(dt > 0.0) {
            return 0;
        }
        self.clock += dt;

        let frame = Frame {
            now: self.clock,
            dt,
            bounds: self.bounds,
            volume,
        };

        let creatures = &mut self.creatures;
        let before = self.order.len();
        self.order.retain(|&id| {
            let Some(creature) = creatures.get_mut(id) else {
                return false;
            };
            creature.update(&frame);
            if creature.is_alive() {
                true
            } else {
                creatures.remove(id);
                false
            }
        });
        before - self.order.len()
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.bounds = Vec2::new(width.max(0.0), height.max(0.0));
    }

    pub fn clear(&mut self) {
        self.creatures.clear();
        self.order.clear();
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Lowering the cap below the live count removes the oldest creatures
    pub fn set_max_population(&mut self, max: usize) -> Result<(), ConfigError> {
        if max == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        self.max_population = max;
        let excess = self.order.len().saturating_sub(max);
        for id in self.order.drain(..excess) {
            self.creatures.remove(id);
        }
        Ok(())
    }

    pub fn set_enabled_species<I>(&mut self, species: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = Species>,
    {
        let enabled: BTreeSet<Species> = species.into_iter().collect();
        if enabled.is_empty() {
            return Err(ConfigError::NoSpecies);
        }
        self.enabled = enabled;
        Ok(())
    }

    pub fn set_spawn_interval(&mut self, seconds: f32) -> Result<(), ConfigError> {
        if !(seconds > 0.0) || !seconds.is_finite() {
            return Err(ConfigError::InvalidInterval(seconds));
        }
        self.base_interval = seconds;
        Ok(())
    }

    /// Applies to new creatures and to every creature already alive
    pub fn set_sound_threshold(&mut self, threshold: f32) -> Result<(), ConfigError> {
        if !(0.0..=100.0).contains(&threshold) {
            return Err(ConfigError::ThresholdOutOfRange(threshold));
        }
        self.sound_threshold = threshold;
        for creature in self.creatures.values_mut() {
            creature.sound_threshold = threshold;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.creatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty()
    }

    pub fn max_population(&self) -> usize {
        self.max_population
    }

    pub fn spawn_interval(&self) -> f32 {
        self.base_interval
    }

    pub fn sound_threshold(&self) -> f32 {
        self.sound_threshold
    }

    pub fn enabled_species(&self) -> impl Iterator<Item = Species> + '_ {
        self.enabled.iter().copied()
    }

    pub fn is_enabled(&self, species: Species) -> bool {
        self.enabled.contains(&species)
    }

    /// Seconds of simulated time so far
    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    pub fn get(&self, id: CreatureId) -> Option<&Creature> {
        self.creatures.get(id)
    }

    pub fn contains(&self, id: CreatureId) -> bool {
        self.creatures.contains_key(id)
    }

    /// Live creatures in update order
    pub fn iter(&self) -> impl Iterator<Item = (CreatureId, &Creature)> + '_ {
        self.order
            .iter()
            .filter_map(|&id| self.creatures.get(id).map(|creature| (id, creature)))
    }

    /// Live count per species; species with no live creature are omitted
    pub fn census(&self) -> BTreeMap<Species, usize> {
        let mut census = BTreeMap::new();
        for creature in self.creatures.values() {
            *census.entry(creature.species).or_insert(0) += 1;
        }
        census
    }
}
