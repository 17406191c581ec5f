use crate::config::*;
use crate::species::Species;
use bevy::math::Vec2;

/// Everything a creature needs to advance by one frame
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    /// Engine clock after this frame's elapsed time was added (seconds)
    pub now: f32,
    /// Elapsed time for this frame (seconds)
    pub dt: f32,
    /// Canvas width and height
    pub bounds: Vec2,
    /// Smoothed volume level, 0-100
    pub volume: f32,
}

/// Coarse life state, derived from `life` and `disappearing`.
/// Growing in is tracked separately through `scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeState {
    Stable,
    Disappearing,
    Dead,
}

/// One creature in the zoo
#[derive(Debug, Clone, PartialEq)]
pub struct Creature {
    pub species: Species,
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    /// Normalized health, also the rendered opacity. Always within [0, max_life].
    pub life: f32,
    pub max_life: f32,
    pub birth_time: f32,
    pub last_sound_time: f32,
    pub sound_threshold: f32,
    pub disappearing: bool,
    pub scale: f32,
    pub rotation: f32,
    /// Phase of the idle floating bob, in radians
    pub float_phase: f32,
}

impl Creature {
    pub fn new(species: Species, position: Vec2, velocity: Vec2, now: f32, float_phase: f32) -> Self {
        Self {
            species,
            position,
            velocity,
            size: species.size(),
            life: 1.0,
            max_life: 1.0,
            birth_time: now,
            last_sound_time: now,
            sound_threshold: DEFAULT_SOUND_THRESHOLD,
            disappearing: false,
            scale: 0.0,
            rotation: 0.0,
            float_phase,
        }
    }

    pub fn with_sound_threshold(mut self, threshold: f32) -> Self {
        self.sound_threshold = threshold;
        self
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    pub fn life_state(&self) -> LifeState {
        if !self.is_alive() {
            LifeState::Dead
        } else if self.disappearing {
            LifeState::Disappearing
        } else {
            LifeState::Stable
        }
    }

    pub fn is_growing_in(&self) -> bool {
        self.scale < TARGET_SCALE
    }

    pub fn age(&self, now: f32) -> f32 {
        (now - self.birth_time).max(0.0)
    }

    /// Wall margin; the creature's center stays at least this far from every edge
    pub fn margin(&self) -> f32 {
        self.size
    }

    /// Advance one frame. The steps run in a fixed order and later steps read
    /// what earlier ones wrote.
    pub fn update(&mut self, frame: &Frame) {
        let dt = frame.dt;
        if !(dt > 0.0) {
            return;
        }

        // Pop-in
        if self.scale < TARGET_SCALE {
            self.scale = (self.scale + dt * GROWTH_RATE).min(TARGET_SCALE);
        }

        // Sound feeds the creature
        if frame.volume > self.sound_threshold {
            self.last_sound_time = frame.now;
            if self.life < self.max_life {
                self.life = (self.life + dt * RECOVERY_RATE).min(self.max_life);
            }
            self.disappearing = false;
        }

        // Life after the grace period is a function of silence length, not an accumulator
        let silence = frame.now - self.last_sound_time;
        if silence > SILENCE_GRACE_PERIOD {
            self.disappearing = true;
            let fade = (silence - SILENCE_GRACE_PERIOD) / DECAY_WINDOW;
            self.life = (1.0 - fade).max(0.0).min(self.max_life);
        }

        if !self.is_alive() {
            return;
        }

        self.position += self.velocity * dt * self.life;
        let bob = (frame.now + self.float_phase).sin() * FLOAT_AMPLITUDE;
        self.position.y += bob * dt * self.life;

        self.bounce(frame.bounds);

        let rate = if self.disappearing {
            DISTRESS_ROTATION_RATE
        } else {
            STABLE_ROTATION_RATE
        };
        self.rotation += self.velocity.x * dt * rate;
    }

    fn bounce(&mut self, bounds: Vec2) {
        let margin = self.margin();
        let (x, vx) = reflect(self.position.x, self.velocity.x, margin, bounds.x - margin);
        let (y, vy) = reflect(self.position.y, self.velocity.y, margin, bounds.y - margin);
        self.position = Vec2::new(x, y);
        self.velocity = Vec2::new(vx, vy);
    }
}

/// Reflect one axis off `[low, high]`. A canvas narrower than two margins
/// pins the creature to `low`.
fn reflect(position: f32, velocity: f32, low: f32, high: f32) -> (f32, f32) {
    if position < low || position > high {
        (position.min(high).max(low), -velocity * RESTITUTION)
    } else {
        (position, velocity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: Vec2 = Vec2::new(800.0, 600.0);

    fn creature_at(position: Vec2, velocity: Vec2) -> Creature {
        Creature::new(Species::Cat, position, velocity, 0.0, 0.0)
    }

    fn frame(now: f32, dt: f32, volume: f32) -> Frame {
        Frame {
            now,
            dt,
            bounds: BOUNDS,
            volume,
        }
    }

    #[test]
    fn starts_full_and_invisible() {
        let c = creature_at(Vec2::new(400.0, 300.0), Vec2::ZERO);
        assert_eq!(c.life, 1.0);
        assert_eq!(c.scale, 0.0);
        assert!(!c.disappearing);
        assert!(c.is_growing_in());
        assert_eq!(c.life_state(), LifeState::Stable);
    }

    #[test]
    fn scale_grows_then_clamps() {
        let mut c = creature_at(Vec2::new(400.0, 300.0), Vec2::ZERO);
        c.update(&frame(0.1, 0.1, 50.0));
        assert!((c.scale - 0.3).abs() < 1e-5);
        c.update(&frame(1.1, 1.0, 50.0));
        assert_eq!(c.scale, TARGET_SCALE);
        assert!(!c.is_growing_in());
    }

    #[test]
    fn four_seconds_of_silence_halves_life() {
        let mut c = creature_at(Vec2::new(400.0, 300.0), Vec2::ZERO);
        c.update(&frame(4.0, 0.016, 0.0));
        assert!((c.life - 0.5).abs() < 1e-5);
        assert!(c.disappearing);
        assert_eq!(c.life_state(), LifeState::Disappearing);
    }

    #[test]
    fn silence_within_grace_keeps_full_life() {
        let mut c = creature_at(Vec2::new(400.0, 300.0), Vec2::ZERO);
        c.update(&frame(2.9, 0.016, 0.0));
        assert_eq!(c.life, 1.0);
        assert!(!c.disappearing);
    }

    #[test]
    fn decay_is_recomputed_not_accumulated() {
        let mut stepped = creature_at(Vec2::new(400.0, 300.0), Vec2::ZERO);
        let mut t = 0.0;
        while t < 4.2 {
            t += 0.05;
            stepped.update(&frame(t, 0.05, 0.0));
        }
        let mut jumped = creature_at(Vec2::new(400.0, 300.0), Vec2::ZERO);
        jumped.update(&frame(t, 0.05, 0.0));
        assert!((stepped.life - jumped.life).abs() < 1e-5);
    }

    #[test]
    fn life_hits_zero_after_grace_plus_window() {
        let mut c = creature_at(Vec2::new(400.0, 300.0), Vec2::new(10.0, 0.0));
        c.update(&frame(5.5, 0.016, 0.0));
        assert_eq!(c.life, 0.0);
        assert!(!c.is_alive());
        assert_eq!(c.life_state(), LifeState::Dead);
    }

    #[test]
    fn sound_recovers_life_at_bounded_rate() {
        let mut c = creature_at(Vec2::new(400.0, 300.0), Vec2::ZERO);
        c.life = 0.4;
        c.disappearing = true;
        c.update(&frame(0.5, 0.5, 60.0));
        assert!((c.life - 0.65).abs() < 1e-5);
        assert!(!c.disappearing);
        assert_eq!(c.last_sound_time, 0.5);

        c.update(&frame(2.5, 2.0, 60.0));
        assert_eq!(c.life, 1.0);
    }

    #[test]
    fn volume_at_threshold_is_not_sound() {
        let mut c = creature_at(Vec2::new(400.0, 300.0), Vec2::ZERO);
        c.update(&frame(1.0, 0.1, DEFAULT_SOUND_THRESHOLD));
        assert_eq!(c.last_sound_time, 0.0);
    }

    #[test]
    fn motion_slows_with_life() {
        let mut healthy = creature_at(Vec2::new(400.0, 300.0), Vec2::new(20.0, 0.0));
        healthy.update(&frame(1.0, 1.0, 100.0));
        assert!((healthy.position.x - 420.0).abs() < 1e-4);

        // deaf creature inside the grace period: life is left alone
        let mut dim = creature_at(Vec2::new(400.0, 300.0), Vec2::new(20.0, 0.0));
        dim.life = 0.25;
        dim.sound_threshold = 100.0;
        dim.update(&frame(1.0, 1.0, 0.0));
        assert!((dim.position.x - 405.0).abs() < 1e-4);
    }

    #[test]
    fn wall_hit_flips_and_damps_velocity() {
        let margin = Species::Cat.size();
        let mut c = creature_at(Vec2::new(BOUNDS.x - margin - 0.5, 300.0), Vec2::new(25.0, 0.0));
        c.update(&frame(0.1, 0.1, 50.0));
        assert_eq!(c.position.x, BOUNDS.x - margin);
        assert!((c.velocity.x + 20.0).abs() < 1e-4);

        let mut left = creature_at(Vec2::new(margin + 0.5, 300.0), Vec2::new(-25.0, 0.0));
        left.update(&frame(0.1, 0.1, 50.0));
        assert_eq!(left.position.x, margin);
        assert!((left.velocity.x - 20.0).abs() < 1e-4);
    }

    #[test]
    fn rotation_speeds_up_in_distress() {
        let mut calm = creature_at(Vec2::new(400.0, 300.0), Vec2::new(10.0, 0.0));
        calm.update(&frame(1.0, 1.0, 50.0));
        assert!((calm.rotation - 0.1).abs() < 1e-5);

        let mut scared = creature_at(Vec2::new(400.0, 300.0), Vec2::new(10.0, 0.0));
        scared.update(&frame(3.5, 1.0, 0.0));
        assert!(scared.disappearing);
        assert!((scared.rotation - 0.5).abs() < 1e-5);
    }

    #[test]
    fn non_positive_dt_is_a_no_op() {
        let mut c = creature_at(Vec2::new(400.0, 300.0), Vec2::new(10.0, 10.0));
        let before = c.clone();
        c.update(&frame(10.0, 0.0, 0.0));
        c.update(&frame(10.0, -1.0, 0.0));
        c.update(&frame(10.0, f32::NAN, 0.0));
        assert_eq!(c, before);
    }

    #[test]
    fn tiny_canvas_pins_to_margin() {
        let mut c = creature_at(Vec2::new(10.0, 10.0), Vec2::new(5.0, 5.0));
        let tiny = Frame {
            now: 0.1,
            dt: 0.1,
            bounds: Vec2::new(20.0, 20.0),
            volume: 50.0,
        };
        c.update(&tiny);
        assert_eq!(c.position, Vec2::splat(c.margin()));
    }
}
