use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum TouristError {
    #[error("Pin not found: {0}")]
    PinNotFound(Uuid),

    #[error("Photo not found: {0}")]
    PhotoNotFound(Uuid),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    /// The search endpoint answered with `stat != "ok"`.
    #[error("Flickr API error ({code}): {message}")]
    Flickr { code: i64, message: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, TouristError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flickr_error_display() {
        let err = TouristError::Flickr {
            code: 100,
            message: "Invalid API Key (Key has invalid format)".into(),
        };
        assert_eq!(
            err.to_string(),
            "Flickr API error (100): Invalid API Key (Key has invalid format)"
        );
    }

    #[test]
    fn status_error_display() {
        let err = TouristError::Status {
            status: 503,
            url: "https://live.staticflickr.com/1/2_3_q.jpg".into(),
        };
        assert!(err.to_string().contains("503"));
    }
}
