//! Linear-to-logarithmic volume mapping.
//!
//! UI sliders are linear; gain is expressed in base-2 steps so that equal
//! slider movements sound evenly spaced. A gain of 0 is unity, -1 is half
//! amplitude, and a linear volume of zero maps to [`SILENT_GAIN`] with the
//! output muted.

/// Gain used when the linear volume is zero.
pub const SILENT_GAIN: f64 = -6.0;

/// Normalized volume used when nothing has been configured.
pub const DEFAULT_VOLUME: f64 = 0.7;

/// Converts a linear volume (0.0–1.0) to a base-2 gain.
pub fn linear_to_log(linear: f64) -> f64 {
    if linear <= 0.0 {
        SILENT_GAIN
    } else {
        linear.log2()
    }
}

/// Playback volume, normalized to 0.0–1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume {
    linear: f64,
}

impl Volume {
    /// Creates a volume from a 0–100 slider value, clamping out-of-range input.
    pub fn from_percent(percent: i32) -> Self {
        Self {
            linear: f64::from(percent.clamp(0, 100)) / 100.0,
        }
    }

    /// Creates a volume from a normalized value, clamped to 0.0–1.0.
    pub fn from_linear(linear: f64) -> Self {
        Self {
            linear: linear.clamp(0.0, 1.0),
        }
    }

    /// Normalized linear volume.
    pub fn linear(&self) -> f64 {
        self.linear
    }

    /// Base-2 gain.
    pub fn gain(&self) -> f64 {
        linear_to_log(self.linear)
    }

    /// Returns true if output should be muted.
    pub fn is_silent(&self) -> bool {
        self.linear <= 0.0
    }

    /// Amplitude multiplier for the output device (`2^gain`, or 0 when silent).
    pub fn amplitude(&self) -> f32 {
        if self.is_silent() {
            0.0
        } else {
            2f64.powf(self.gain()) as f32
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::from_linear(DEFAULT_VOLUME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_to_log() {
        assert_eq!(linear_to_log(1.0), 0.0);
        assert!((linear_to_log(0.5) + 1.0).abs() < 1e-9);
        assert!((linear_to_log(0.25) + 2.0).abs() < 1e-9);
        assert_eq!(linear_to_log(0.0), SILENT_GAIN);
        assert_eq!(linear_to_log(-0.5), SILENT_GAIN);
    }

    #[test]
    fn test_from_percent_clamps() {
        assert_eq!(Volume::from_percent(-10).linear(), 0.0);
        assert_eq!(Volume::from_percent(150).linear(), 1.0);
        assert!((Volume::from_percent(50).linear() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_silent_volume() {
        let volume = Volume::from_percent(0);
        assert!(volume.is_silent());
        assert_eq!(volume.gain(), SILENT_GAIN);
        assert_eq!(volume.amplitude(), 0.0);
    }

    #[test]
    fn test_amplitude_follows_gain() {
        let volume = Volume::from_percent(50);
        assert!((volume.amplitude() - 0.5).abs() < 1e-6);
        assert!((Volume::from_percent(100).amplitude() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_default_volume() {
        assert!((Volume::default().linear() - DEFAULT_VOLUME).abs() < 1e-9);
    }
}
