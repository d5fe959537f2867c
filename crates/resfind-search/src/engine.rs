//! Search orchestration: term resolution, upstream call, normalization,
//! distance computation, sorting and pagination.

use std::fmt;
use std::sync::Arc;

use resfind_core::{
    normalize_zip, Coordinates, Resource, SearchRequest, SearchTerm, SortBy, Taxonomy,
    TaxonomyError, ZipGeocoder,
};
use resfind_upstream::{normalize, UpstreamClient, UpstreamLocation};
use serde::Serialize;

use crate::error::RankError;
use crate::sort::{effective_sort, paginate, sort_resources};

/// Why a search returned an empty list without the upstream saying so.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum Degradation {
    UnknownCategory(String),
    UpstreamUnavailable(String),
}

impl Degradation {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownCategory(_) => "unknown_category",
            Self::UpstreamUnavailable(_) => "upstream_unavailable",
        }
    }
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCategory(id) => write!(f, "unknown category: {id}"),
            Self::UpstreamUnavailable(reason) => write!(f, "upstream unavailable: {reason}"),
        }
    }
}

/// Outcome of [`RankingEngine::rank_detailed`].
#[derive(Debug, Clone)]
pub struct RankedResults {
    /// The requested page, in final order.
    pub resources: Vec<Resource>,
    /// Result count before pagination.
    pub total: usize,
    pub sort_applied: SortBy,
    /// The point distances were measured from, if one was resolved.
    pub origin: Option<Coordinates>,
    pub degraded: Option<Degradation>,
}

impl RankedResults {
    fn empty(sort_applied: SortBy, degraded: Degradation) -> Self {
        Self {
            resources: Vec::new(),
            total: 0,
            sort_applied,
            origin: None,
            degraded: Some(degraded),
        }
    }
}

/// Answers [`SearchRequest`]s with normalized, distance-annotated resources.
///
/// Holds the upstream client plus the read-only taxonomy and ZIP table; safe
/// to share across tasks behind an `Arc`.
pub struct RankingEngine {
    upstream: UpstreamClient,
    taxonomy: Arc<Taxonomy>,
    geocoder: Arc<ZipGeocoder>,
}

impl RankingEngine {
    #[must_use]
    pub fn new(upstream: UpstreamClient, taxonomy: Arc<Taxonomy>, geocoder: Arc<ZipGeocoder>) -> Self {
        Self {
            upstream,
            taxonomy,
            geocoder,
        }
    }

    #[must_use]
    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    #[must_use]
    pub fn geocoder(&self) -> &ZipGeocoder {
        &self.geocoder
    }

    /// Runs a search and returns the ranked page of resources.
    ///
    /// Unknown categories and upstream failures yield an empty list; use
    /// [`Self::rank_detailed`] to tell those apart from a genuine zero-hit
    /// search.
    ///
    /// # Errors
    ///
    /// Returns [`RankError`] only for malformed requests.
    pub async fn rank(&self, request: &SearchRequest) -> Result<Vec<Resource>, RankError> {
        Ok(self.rank_detailed(request).await?.resources)
    }

    /// Like [`Self::rank`], but also reports the applied sort, the total
    /// before pagination, and any degradation.
    ///
    /// # Errors
    ///
    /// - [`RankError::MissingSearchDimension`] when neither a category nor a
    ///   keyword is given.
    /// - [`RankError::InvalidCoordinates`] when `coords` is out of range.
    pub async fn rank_detailed(&self, request: &SearchRequest) -> Result<RankedResults, RankError> {
        validate(request)?;
        let sort_applied = effective_sort(request.sort_by, request.has_location());

        let term = match self.resolve_term(request) {
            Ok(term) => term,
            Err(TaxonomyError::UnknownCategory(id)) => {
                tracing::warn!(category = %id, "unknown category; returning no results");
                return Ok(RankedResults::empty(
                    sort_applied,
                    Degradation::UnknownCategory(id),
                ));
            }
        };

        let location = upstream_location(request);
        let raw = match self.upstream.search(&term, location.as_ref()).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(term = %term, error = %e, "upstream search failed; returning no results");
                return Ok(RankedResults::empty(
                    sort_applied,
                    Degradation::UpstreamUnavailable(e.to_string()),
                ));
            }
        };

        let mut resources: Vec<Resource> = raw
            .iter()
            .map(|record| normalize(record, &self.taxonomy))
            .collect();

        let origin = self.origin(request);
        if let Some(origin) = origin {
            self.attach_distances(&mut resources, origin);
        }

        sort_resources(&mut resources, sort_applied);
        let total = resources.len();
        let resources = paginate(resources, request.offset, request.limit);

        tracing::info!(
            term = %term,
            total,
            returned = resources.len(),
            sort = %sort_applied,
            located = origin.is_some(),
            "search ranked"
        );

        Ok(RankedResults {
            resources,
            total,
            sort_applied,
            origin,
            degraded: None,
        })
    }

    /// Keyword searches first try to route to a category, so "food bank"
    /// gets the food taxonomy code instead of a loose text match.
    fn resolve_term(&self, request: &SearchRequest) -> Result<SearchTerm, TaxonomyError> {
        if let Some(keyword) = request.keyword_text() {
            return Ok(match self.taxonomy.match_keyword(keyword) {
                Some(category) => {
                    tracing::debug!(keyword, category = %category.id, "keyword routed to category");
                    category.search_term()
                }
                None => SearchTerm::Keyword(keyword.to_string()),
            });
        }

        // validate() guarantees a category when there is no keyword
        let category = request.category_text().unwrap_or_default();
        let subcategory = request
            .subcategory_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        self.taxonomy.resolve(category, subcategory)
    }

    /// The user's point: explicit coordinates win over a ZIP lookup.
    fn origin(&self, request: &SearchRequest) -> Option<Coordinates> {
        if let Some(coords) = request.coords {
            return Some(coords);
        }
        let zip = request.zip_code.as_deref()?;
        let found = self.geocoder.lookup(zip);
        if found.is_none() {
            tracing::debug!(zip, "user ZIP not in table; distances unavailable");
        }
        found
    }

    fn attach_distances(&self, resources: &mut [Resource], origin: Coordinates) {
        for resource in resources {
            resource.distance_miles = resource
                .rankable_zip()
                .and_then(|zip| self.geocoder.lookup(zip))
                .map(|point| origin.miles_to(&point));
        }
    }
}

fn validate(request: &SearchRequest) -> Result<(), RankError> {
    if request.keyword_text().is_none() && request.category_text().is_none() {
        return Err(RankError::MissingSearchDimension);
    }
    if let Some(coords) = request.coords {
        if !coords.is_valid() {
            return Err(RankError::InvalidCoordinates {
                lat: coords.lat,
                lon: coords.lon,
            });
        }
    }
    Ok(())
}

fn upstream_location(request: &SearchRequest) -> Option<UpstreamLocation> {
    if let Some(coords) = request.coords {
        return Some(UpstreamLocation::Coords(coords));
    }
    let zip = request.zip_code.as_deref().map(str::trim).filter(|z| !z.is_empty())?;
    Some(UpstreamLocation::Zip(
        normalize_zip(zip).unwrap_or_else(|| zip.to_string()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_without_category_or_keyword_is_rejected() {
        let request = SearchRequest::default().with_zip("93101");
        assert_eq!(validate(&request), Err(RankError::MissingSearchDimension));

        let blank = SearchRequest::keyword("   ");
        assert_eq!(validate(&blank), Err(RankError::MissingSearchDimension));
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        let request = SearchRequest::category("food").with_coords(Coordinates::new(91.0, 0.0));
        assert!(matches!(
            validate(&request),
            Err(RankError::InvalidCoordinates { .. })
        ));
    }

    #[test]
    fn coords_take_precedence_over_zip_upstream() {
        let request = SearchRequest::category("food")
            .with_zip("93101")
            .with_coords(Coordinates::new(34.0, -118.0));
        assert!(matches!(
            upstream_location(&request),
            Some(UpstreamLocation::Coords(_))
        ));
    }

    #[test]
    fn short_zip_is_padded_for_upstream() {
        let request = SearchRequest::category("food").with_zip(" 501 ");
        assert_eq!(
            upstream_location(&request),
            Some(UpstreamLocation::Zip("00501".into()))
        );
    }

    #[test]
    fn blank_zip_means_global_search() {
        let request = SearchRequest::category("food").with_zip("  ");
        assert_eq!(upstream_location(&request), None);
    }

    #[test]
    fn degradation_codes() {
        assert_eq!(
            Degradation::UnknownCategory("x".into()).code(),
            "unknown_category"
        );
        assert_eq!(
            Degradation::UpstreamUnavailable("timeout".into()).code(),
            "upstream_unavailable"
        );
    }
}
