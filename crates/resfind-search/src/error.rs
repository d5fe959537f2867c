use thiserror::Error;

/// Caller mistakes in a search request.
///
/// Upstream and data problems never surface here; they degrade to an empty
/// result list instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RankError {
    #[error("search request needs a category or a keyword")]
    MissingSearchDimension,

    #[error("coordinates out of range: lat={lat}, lon={lon}")]
    InvalidCoordinates { lat: f64, lon: f64 },
}
