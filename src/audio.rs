use crate::config::*;
use crate::zoo::ReadingSession;
use bevy::prelude::*;
use std::collections::VecDeque;

/// How loud the room is relative to the threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeIntensity {
    Silent,
    Low,
    Medium,
    High,
}

impl VolumeIntensity {
    pub fn label(self) -> &'static str {
        match self {
            VolumeIntensity::Silent => "silent",
            VolumeIntensity::Low => "low",
            VolumeIntensity::Medium => "medium",
            VolumeIntensity::High => "high",
        }
    }
}

/// Smoothed room volume on a 0-100 scale plus the threshold that counts as sound.
///
/// Raw samples go in through [`VolumeMeter::push_level`] or
/// [`VolumeMeter::push_spectrum`]; everything else reads the smoothed level.
#[derive(Resource, Debug, Clone)]
pub struct VolumeMeter {
    level: f32,
    threshold: f32,
    history: VecDeque<f32>,
}

impl Default for VolumeMeter {
    fn default() -> Self {
        Self {
            level: 0.0,
            threshold: DEFAULT_SOUND_THRESHOLD,
            history: VecDeque::with_capacity(VOLUME_HISTORY_LEN),
        }
    }
}

impl VolumeMeter {
    /// Feed one frame of frequency magnitudes (0-255 per bin)
    pub fn push_spectrum(&mut self, bins: &[u8]) -> f32 {
        if bins.is_empty() {
            return self.push_level(0.0);
        }
        let sum: f32 = bins.iter().map(|&b| (b as f32) * (b as f32)).sum();
        let rms = (sum / bins.len() as f32).sqrt();
        self.push_level(rms * RMS_GAIN)
    }

    /// Feed one raw level; values are clamped to 0-100 before smoothing
    pub fn push_level(&mut self, raw: f32) -> f32 {
        let raw = if raw.is_finite() { raw.clamp(0.0, 100.0) } else { 0.0 };
        self.level = self.level * VOLUME_SMOOTHING + raw * (1.0 - VOLUME_SMOOTHING);
        if self.history.len() == VOLUME_HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(self.level);
        self.level
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    /// Mean of the recent smoothed levels
    pub fn average(&self) -> f32 {
        if self.history.is_empty() {
            return 0.0;
        }
        self.history.iter().sum::<f32>() / self.history.len() as f32
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold.clamp(0.0, 100.0);
    }

    pub fn is_above_threshold(&self) -> bool {
        self.level >= self.threshold
    }

    pub fn intensity(&self) -> VolumeIntensity {
        let excess = self.level - self.threshold;
        if excess < 0.0 {
            VolumeIntensity::Silent
        } else if excess < INTENSITY_BAND {
            VolumeIntensity::Low
        } else if excess < INTENSITY_BAND * 2.0 {
            VolumeIntensity::Medium
        } else {
            VolumeIntensity::High
        }
    }

    /// 0 below the threshold, then a linear ramp from 1x at the threshold to
    /// `MAX_AUDIO_SPEED` at full volume
    pub fn spawn_speed_multiplier(&self) -> f32 {
        if self.level < self.threshold {
            return 0.0;
        }
        let headroom = 100.0 - self.threshold;
        if headroom <= 0.0 {
            return MAX_AUDIO_SPEED;
        }
        let excess = self.level - self.threshold;
        (1.0 + excess / headroom * (MAX_AUDIO_SPEED - 1.0)).min(MAX_AUDIO_SPEED)
    }

    pub fn reset(&mut self) {
        self.level = 0.0;
        self.history.clear();
    }
}

/// Stand-in for a microphone: a manual level plus a hold-to-shout key
#[derive(Resource, Debug, Clone)]
pub struct SoundInput {
    pub manual_level: f32,
    pub shout_level: f32,
    pub shout_key: KeyCode,
}

impl Default for SoundInput {
    fn default() -> Self {
        Self {
            manual_level: 0.0,
            shout_level: DEFAULT_SHOUT_LEVEL,
            shout_key: KeyCode::Space,
        }
    }
}

impl SoundInput {
    pub fn raw_level(&self, keys: &ButtonInput<KeyCode>) -> f32 {
        if keys.pressed(self.shout_key) {
            self.shout_level.max(self.manual_level)
        } else {
            self.manual_level
        }
    }
}

/// System to feed the meter once per frame while the session is listening
pub fn sample_volume(
    keys: Res<ButtonInput<KeyCode>>,
    input: Res<SoundInput>,
    session: Res<ReadingSession>,
    mut meter: ResMut<VolumeMeter>,
) {
    if session.is_listening() {
        meter.push_level(input.raw_level(&keys));
    } else if meter.level() > 0.0 {
        // microphone is off: let the level settle back to silence
        meter.push_level(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meter_at(level: f32) -> VolumeMeter {
        let mut meter = VolumeMeter::default();
        for _ in 0..200 {
            meter.push_level(level);
        }
        meter
    }

    #[test]
    fn smoothing_moves_thirty_percent_towards_sample() {
        let mut meter = VolumeMeter::default();
        assert!((meter.push_level(100.0) - 30.0).abs() < 1e-4);
        assert!((meter.push_level(100.0) - 51.0).abs() < 1e-4);
        assert!((meter.push_level(0.0) - 35.7).abs() < 1e-3);
    }

    #[test]
    fn raw_levels_are_clamped() {
        let mut meter = VolumeMeter::default();
        meter.push_level(1_000.0);
        assert!((meter.level() - 30.0).abs() < 1e-4);
        meter.push_level(f32::NAN);
        assert!(meter.level().is_finite());
    }

    #[test]
    fn spectrum_rms_is_doubled() {
        let mut meter = VolumeMeter::default();
        // rms of [10, 10, 10, 10] is 10, raw level 20
        meter.push_spectrum(&[10, 10, 10, 10]);
        assert!((meter.level() - 6.0).abs() < 1e-4);

        let mut loud = VolumeMeter::default();
        loud.push_spectrum(&[255; 128]);
        assert!((loud.level() - 30.0).abs() < 1e-4);
    }

    #[test]
    fn history_is_bounded_and_averaged() {
        let mut meter = VolumeMeter::default();
        for _ in 0..(VOLUME_HISTORY_LEN * 2) {
            meter.push_level(50.0);
        }
        assert_eq!(meter.history.len(), VOLUME_HISTORY_LEN);
        assert!((meter.average() - 50.0).abs() < 0.5);
        meter.reset();
        assert_eq!(meter.average(), 0.0);
        assert_eq!(meter.level(), 0.0);
    }

    #[test]
    fn threshold_is_inclusive_and_clamped() {
        let mut meter = VolumeMeter::default();
        meter.level = 40.0;
        meter.set_threshold(40.0);
        assert!(meter.is_above_threshold());
        meter.set_threshold(40.5);
        assert!(!meter.is_above_threshold());
        meter.set_threshold(150.0);
        assert_eq!(meter.threshold(), 100.0);
        meter.set_threshold(-5.0);
        assert_eq!(meter.threshold(), 0.0);
    }

    #[test]
    fn intensity_bands() {
        let cases = [
            (10.0, VolumeIntensity::Silent),
            (35.0, VolumeIntensity::Low),
            (60.0, VolumeIntensity::Medium),
            (90.0, VolumeIntensity::High),
        ];
        for (level, expected) in cases {
            assert_eq!(meter_at(level).intensity(), expected, "level {level}");
        }
    }

    #[test]
    fn speed_multiplier_ramps_from_one_to_five() {
        assert_eq!(meter_at(10.0).spawn_speed_multiplier(), 0.0);

        let mut meter = VolumeMeter::default();
        meter.level = 30.0;
        assert!((meter.spawn_speed_multiplier() - 1.0).abs() < 1e-5);
        meter.level = 65.0;
        assert!((meter.spawn_speed_multiplier() - 3.0).abs() < 1e-5);
        meter.level = 100.0;
        assert!((meter.spawn_speed_multiplier() - 5.0).abs() < 1e-5);

        meter.set_threshold(100.0);
        assert_eq!(meter.spawn_speed_multiplier(), MAX_AUDIO_SPEED);
    }

    #[test]
    fn shout_key_overrides_manual_level() {
        let input = SoundInput {
            manual_level: 12.0,
            ..Default::default()
        };
        let mut keys = ButtonInput::<KeyCode>::default();
        assert_eq!(input.raw_level(&keys), 12.0);
        keys.press(KeyCode::Space);
        assert_eq!(input.raw_level(&keys), DEFAULT_SHOUT_LEVEL);
    }
}
