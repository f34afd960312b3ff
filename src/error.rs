//! Central error type for the push layer.
//!
//! Errors implement `Serialize` so shell commands can hand them to the WebView.

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PushError {
    /// Reading or writing the persisted queue failed
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image server answered with a non-success status
    #[error("Image request for {url} failed with status {status}")]
    ImageStatus { url: String, status: u16 },

    /// Image request could not complete (connect, timeout, body read)
    #[error("Image fetch error: {0}")]
    ImageFetch(String),

    /// Image bytes were not a decodable picture
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    /// The platform notification surface rejected the notification
    #[error("Notification error: {0}")]
    Notification(String),

    /// Configuration file could not be read
    #[error("Config error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for PushError {
    fn from(err: reqwest::Error) -> Self {
        PushError::ImageFetch(err.to_string())
    }
}

impl From<image::ImageError> for PushError {
    fn from(err: image::ImageError) -> Self {
        PushError::ImageDecode(err.to_string())
    }
}

impl Serialize for PushError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type PushResult<T> = Result<T, PushError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serializes_as_display_string() {
        let err = PushError::ImageStatus {
            url: "https://cdn.example.com/a.png".to_string(),
            status: 404,
        };
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(
            json,
            "\"Image request for https://cdn.example.com/a.png failed with status 404\""
        );
    }

    #[test]
    fn test_io_error_converts_to_storage() {
        let err: PushError = std::io::Error::new(std::io::ErrorKind::Other, "disk full").into();
        assert!(matches!(err, PushError::Storage(_)));
    }
}
