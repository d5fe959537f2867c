//! Upstream request and response shapes.
//!
//! Response records are deliberately left untyped: field names vary across
//! upstream API versions, so [`RawResult`] wraps a `serde_json::Value` and the
//! normalizer probes candidate fields in priority order.

use resfind_core::Coordinates;
use serde::Serialize;

use crate::error::UpstreamError;

/// Spatial filter sent with a search.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamLocation {
    Zip(String),
    Coords(Coordinates),
}

impl UpstreamLocation {
    /// Wire encoding: the ZIP as-is, or `"lon:<lon>_lat:<lat>"`.
    #[must_use]
    pub fn to_param(&self) -> String {
        match self {
            UpstreamLocation::Zip(zip) => zip.trim().to_string(),
            UpstreamLocation::Coords(c) => format!("lon:{}_lat:{}", c.lon, c.lat),
        }
    }
}

/// One loosely-typed record from the upstream `results`/`resources` array.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResult(pub serde_json::Value);

impl RawResult {
    #[must_use]
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

impl From<serde_json::Value> for RawResult {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// JSON body for the POST calling convention.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchBody<'a> {
    pub search: &'a str,
    pub input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_mode: Option<&'a str>,
    pub keyword_is_taxonomy_code: bool,
}

/// Pulls the result records out of a response body.
///
/// Accepts `{"results": [...]}`, `{"resources": [...]}` or a bare array. Any
/// other object is treated as zero results.
///
/// # Errors
///
/// Returns [`UpstreamError::UnexpectedShape`] when the body is a scalar.
pub(crate) fn extract_results(
    body: serde_json::Value,
    context: &str,
) -> Result<Vec<RawResult>, UpstreamError> {
    match body {
        serde_json::Value::Array(items) => Ok(items.into_iter().map(RawResult).collect()),
        serde_json::Value::Object(mut map) => {
            let items = ["results", "resources"]
                .iter()
                .find_map(|key| match map.remove(*key) {
                    Some(serde_json::Value::Array(items)) => Some(items),
                    _ => None,
                })
                .unwrap_or_default();
            Ok(items.into_iter().map(RawResult).collect())
        }
        _ => Err(UpstreamError::UnexpectedShape {
            context: context.to_string(),
        }),
    }
}
