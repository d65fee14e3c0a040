use thiserror::Error;

/// Everything that can go wrong while assigning a client id or delivering a
/// hit. None of these ever fail the image response: the relay handler logs
/// them and serves the badge regardless.
#[derive(Error, Debug)]
pub enum BeaconError {
    #[error("entropy source unavailable: {0}")]
    RandomSource(#[from] rand::Error),

    #[error("failed to encode hit payload: {0}")]
    PayloadSerialization(#[from] serde_urlencoded::ser::Error),

    #[error("failed to reach collector: {0}")]
    DeliveryRequest(#[from] reqwest::Error),

    #[error("collector rejected hit with status {0}")]
    DeliveryStatus(reqwest::StatusCode),
}

impl BeaconError {
    /// Label used for the drop-cause counter.
    pub fn cause(&self) -> &'static str {
        match self {
            BeaconError::RandomSource(_) => "random_source",
            BeaconError::PayloadSerialization(_) => "payload_serialization",
            BeaconError::DeliveryRequest(_) => "transport",
            BeaconError::DeliveryStatus(_) => "collector_status",
        }
    }
}
