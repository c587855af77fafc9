use thiserror::Error;

/// Errors raised while ingesting location data.
///
/// Everything past ingestion (projection, picking, timers) is infallible; a
/// pointer ray that misses every marker is a normal outcome, not an error.
#[derive(Debug, Error)]
pub enum GlobeError {
    #[error("invalid coordinates lat={lat} lng={lng}")]
    InvalidGeoPoint { lat: f32, lng: f32 },

    #[error("location at index {index} has an empty id")]
    EmptyId { index: usize },

    #[error("duplicate location id `{0}`")]
    DuplicateId(String),

    #[error("{count} locations exceed the marker limit of {max}")]
    TooManyLocations { count: usize, max: usize },

    #[error("failed to parse locations: {0}")]
    Parse(#[from] serde_json::Error),
}
