use crate::audio::VolumeMeter;
use crate::config::*;
use crate::population::{ConfigError, Population};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

/// Where the reading session is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Not started yet; nothing is listening
    #[default]
    Idle,
    Reading,
    Paused,
}

/// Resource tracking the reading session and the user's chosen speed
#[derive(Resource, Debug, Clone)]
pub struct ReadingSession {
    state: SessionState,
    speed: f32,
    total_spawned: u64,
    started_at: Option<f32>,
}

impl Default for ReadingSession {
    fn default() -> Self {
        Self {
            state: SessionState::Idle,
            speed: DEFAULT_USER_SPEED,
            total_spawned: 0,
            started_at: None,
        }
    }
}

impl ReadingSession {
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Only an idle session can start
    pub fn start(&mut self, now: f32) -> bool {
        if self.state != SessionState::Idle {
            return false;
        }
        self.state = SessionState::Reading;
        self.started_at = Some(now);
        true
    }

    /// Reading <-> Paused. Returns the new state, or `None` while idle.
    pub fn toggle_pause(&mut self) -> Option<SessionState> {
        self.state = match self.state {
            SessionState::Idle => return None,
            SessionState::Reading => SessionState::Paused,
            SessionState::Paused => SessionState::Reading,
        };
        Some(self.state)
    }

    /// Sound only reaches the zoo (and new creatures only arrive) while reading
    pub fn is_listening(&self) -> bool {
        self.state == SessionState::Reading
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) -> Result<(), ConfigError> {
        if !(speed > 0.0) || !speed.is_finite() {
            return Err(ConfigError::InvalidSpeed(speed));
        }
        self.speed = speed;
        Ok(())
    }

    pub fn total_spawned(&self) -> u64 {
        self.total_spawned
    }

    pub fn record_spawn(&mut self) {
        self.total_spawned += 1;
    }

    /// Seconds since the session started (pauses included)
    pub fn elapsed(&self, now: f32) -> f32 {
        self.started_at.map_or(0.0, |start| (now - start).max(0.0))
    }
}

/// Size of the area creatures live in
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
        }
    }
}

impl Canvas {
    /// Canvas coordinates have the origin top-left with y growing down;
    /// the 2D camera is centered with y growing up.
    pub fn to_world(&self, point: Vec2) -> Vec2 {
        Vec2::new(point.x - self.width * 0.5, self.height * 0.5 - point.y)
    }
}

/// System to keep the canvas the size of the window
pub fn fit_canvas_to_window(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut canvas: ResMut<Canvas>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let fitted = Canvas {
        width: window.width().min(MAX_CANVAS_WIDTH),
        height: window.height(),
    };
    if *canvas != fitted {
        *canvas = fitted;
    }
}

/// System for the per-frame update: creatures hear the room, move, fade and die,
/// then a new one may be admitted
pub fn advance_zoo(
    time: Res<Time>,
    canvas: Res<Canvas>,
    meter: Res<VolumeMeter>,
    mut session: ResMut<ReadingSession>,
    mut population: ResMut<Population>,
) {
    let volume = if session.is_listening() { meter.level() } else { 0.0 };

    let culled = population.tick(time.delta_secs(), canvas.width, canvas.height, volume);
    if culled > 0 {
        debug!("{} creature(s) faded away, {} left", culled, population.len());
    }

    if !session.is_listening() || !meter.is_above_threshold() {
        return;
    }

    let speed = session.speed() * meter.spawn_speed_multiplier();
    let now = population.clock();
    if let Some(id) = population.admit(now, speed) {
        session.record_spawn();
        if let Some(creature) = population.get(id) {
            info!(
                "A {} joined the zoo (speed {:.2}x, volume {:.1}, {} alive)",
                creature.species,
                speed,
                volume,
                population.len()
            );
        }
    }
}

/// Pick a new user speed; the spawn gate restarts so it applies right away
pub fn select_speed(
    session: &mut ReadingSession,
    population: &mut Population,
    speed: f32,
) -> Result<(), ConfigError> {
    session.set_speed(speed)?;
    population.reset_spawn_timer();
    info!("Spawn speed set to {}x", speed);
    Ok(())
}

/// Empty the zoo and forget the spawn total
pub fn clear_zoo(session: &mut ReadingSession, population: &mut Population) {
    let removed = population.len();
    population.clear();
    session.total_spawned = 0;
    info!("Zoo cleared ({} creature(s) removed)", removed);
}
