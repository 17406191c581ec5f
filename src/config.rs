//! Configuration constants for the reading zoo

// ============================================================================
// SPAWN SETTINGS
// ============================================================================

/// Default seconds between spawns at 1x speed
pub const DEFAULT_SPAWN_INTERVAL: f32 = 10.0;

/// Default upper bound on live creatures
pub const DEFAULT_MAX_POPULATION: usize = 100;

/// Rendered size of a creature with size factor 1.0 (canvas units)
pub const BASE_CREATURE_SIZE: f32 = 32.0;

/// Spawn velocity is drawn from ±SPAWN_SPEED_RANGE on each axis (units per second)
pub const SPAWN_SPEED_RANGE: f32 = 25.0;

/// Admission chance per unit of combined speed multiplier
pub const SPAWN_CHANCE_PER_SPEED: f64 = 0.15;

/// Ceiling on the admission chance
pub const MAX_SPAWN_CHANCE: f64 = 0.8;

// ============================================================================
// LIFECYCLE
// ============================================================================

/// Scale gained per second while popping in
pub const GROWTH_RATE: f32 = 3.0;

/// Scale a creature grows towards after spawning
pub const TARGET_SCALE: f32 = 1.0;

/// Life regained per second while sound is above the creature's threshold
pub const RECOVERY_RATE: f32 = 0.5;

/// Seconds of silence tolerated before a creature starts disappearing
pub const SILENCE_GRACE_PERIOD: f32 = 3.0;

/// Seconds over which life falls from full to zero once the grace period is over
pub const DECAY_WINDOW: f32 = 2.0;

/// Volume a creature must hear to count as sound (0-100)
pub const DEFAULT_SOUND_THRESHOLD: f32 = 30.0;

// ============================================================================
// MOTION
// ============================================================================

/// Amplitude of the idle floating bob (canvas units)
pub const FLOAT_AMPLITUDE: f32 = 2.0;

/// Fraction of speed kept (with the sign flipped) after hitting a wall
pub const RESTITUTION: f32 = 0.8;

/// Rotation per unit of horizontal velocity while stable
pub const STABLE_ROTATION_RATE: f32 = 0.01;

/// Rotation per unit of horizontal velocity while disappearing
pub const DISTRESS_ROTATION_RATE: f32 = 0.05;

// ============================================================================
// AUDIO
// ============================================================================

/// Weight kept from the previous level when smoothing (the rest comes from the new sample)
pub const VOLUME_SMOOTHING: f32 = 0.7;

/// Number of smoothed levels kept for the running average
pub const VOLUME_HISTORY_LEN: usize = 100;

/// Raw RMS of a spectrum frame is multiplied by this before clamping to 0-100
pub const RMS_GAIN: f32 = 2.0;

/// Spawn speed multiplier reached at full volume
pub const MAX_AUDIO_SPEED: f32 = 5.0;

/// Width of the low and medium intensity bands above the threshold
pub const INTENSITY_BAND: f32 = 20.0;

/// Raw level produced while the shout key is held
pub const DEFAULT_SHOUT_LEVEL: f32 = 85.0;

// ============================================================================
// SESSION & SETTINGS BOUNDS
// ============================================================================

/// User speed presets offered in the control panel (label, multiplier)
pub const SPEED_PRESETS: [(&str, f32); 5] = [
    ("0.5x", 0.5),
    ("1x", 1.0),
    ("2x", 2.0),
    ("3x", 3.0),
    ("5x", 5.0),
];

/// User speed multiplier selected at startup
pub const DEFAULT_USER_SPEED: f32 = 2.0;

/// Allowed spawn interval range in whole seconds
pub const SPAWN_INTERVAL_BOUNDS: (u32, u32) = (1, 60);

/// Allowed max population range
pub const MAX_POPULATION_BOUNDS: (usize, usize) = (10, 500);

/// Default location of the persisted settings file
pub const DEFAULT_SETTINGS_PATH: &str = "zoo_settings.ron";

// ============================================================================
// CANVAS
// ============================================================================

/// Canvas size used before the window reports its own
pub const DEFAULT_CANVAS_WIDTH: f32 = 1200.0;
pub const DEFAULT_CANVAS_HEIGHT: f32 = 600.0;

/// The canvas never grows wider than this
pub const MAX_CANVAS_WIDTH: f32 = 1200.0;
