//! Audio system error types.
//!
//! None of these reach the caller of a play operation: the engine turns them
//! into a `trackInfo` status string.

use thiserror::Error;

/// Errors that can occur in the audio playback system.
#[derive(Debug, Error)]
pub enum AudioError {
    /// Audio device is not available (e.g., no speakers connected).
    #[error("audio device not available: {0}")]
    DeviceNotAvailable(String),

    /// Audio file was not found or could not be opened.
    #[error("cannot open audio file: {0}")]
    FileNotFound(String),

    /// Failed to decode the audio file.
    #[error("cannot decode audio file: {0}")]
    DecodeError(String),

    /// Failed to create a playback stream on the device.
    #[error("cannot create audio stream: {0}")]
    StreamError(String),

    /// Failed to list a music folder.
    #[error("cannot scan folder: {0}")]
    ScanError(String),
}

impl AudioError {
    /// Returns true if this error is related to device availability.
    #[must_use]
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::DeviceNotAvailable(_) | Self::StreamError(_))
    }

    /// Returns true if this error is related to the audio file.
    #[must_use]
    pub fn is_file_error(&self) -> bool {
        matches!(self, Self::FileNotFound(_) | Self::DecodeError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AudioError::DeviceNotAvailable("no device".to_string());
        assert!(err.to_string().contains("no device"));

        let err = AudioError::FileNotFound("/music/rain.mp3".to_string());
        assert!(err.to_string().contains("/music/rain.mp3"));

        let err = AudioError::DecodeError("invalid frame".to_string());
        assert!(err.to_string().contains("invalid frame"));

        let err = AudioError::ScanError("permission denied".to_string());
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn test_is_device_error() {
        assert!(AudioError::DeviceNotAvailable("x".into()).is_device_error());
        assert!(AudioError::StreamError("x".into()).is_device_error());
        assert!(!AudioError::FileNotFound("x".into()).is_device_error());
        assert!(!AudioError::DecodeError("x".into()).is_device_error());
    }

    #[test]
    fn test_is_file_error() {
        assert!(AudioError::FileNotFound("x".into()).is_file_error());
        assert!(AudioError::DecodeError("x".into()).is_file_error());
        assert!(!AudioError::StreamError("x".into()).is_file_error());
        assert!(!AudioError::ScanError("x".into()).is_file_error());
    }
}
