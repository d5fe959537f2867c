use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;

pub const UNNAMED_SERVICE: &str = "Unnamed Service";
pub const NO_DESCRIPTION: &str = "No description available";
pub const DEFAULT_LANGUAGE: &str = "English";

/// A social-service resource normalized from one upstream search record.
///
/// Built fresh for each search and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Upstream identifier; unique within one response only.
    pub id: String,
    pub name: String,
    /// Plain text with HTML tags removed. Entities are left as-is.
    pub description: String,
    /// Application category resolved from the upstream taxonomy code; may be
    /// the lower-cased root of an unrecognized code, or empty.
    pub category_id: String,
    /// Slug of the upstream taxonomy term label.
    pub subcategory_id: Option<String>,
    /// Human-readable place name (city or site name).
    pub location: String,
    pub zip_code: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub url: Option<String>,
    /// Distance from the searcher, computed locally from two ZIP-resolved
    /// points. `None` means unknown, never zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
    pub languages: Vec<String>,
    pub eligibility: Option<String>,
    /// Schedule descriptions joined with `"; "`.
    pub hours: Option<String>,
}

impl Resource {
    /// The resource ZIP when it is exactly five ASCII digits.
    ///
    /// Only such ZIPs take part in distance ranking.
    #[must_use]
    pub fn rankable_zip(&self) -> Option<&str> {
        self.zip_code
            .as_deref()
            .filter(|zip| zip.len() == 5 && zip.bytes().all(|b| b.is_ascii_digit()))
    }
}

/// Requested result ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Upstream order, passed through unchanged.
    #[default]
    Relevance,
    /// Ascending distance; unknown distances trail in upstream order.
    Distance,
    Name,
}

impl std::fmt::Display for SortBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortBy::Relevance => write!(f, "relevance"),
            SortBy::Distance => write!(f, "distance"),
            SortBy::Name => write!(f, "name"),
        }
    }
}

impl std::str::FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relevance" => Ok(SortBy::Relevance),
            "distance" => Ok(SortBy::Distance),
            "name" => Ok(SortBy::Name),
            other => Err(format!(
                "unknown sort mode '{other}'; expected relevance, distance, or name"
            )),
        }
    }
}

/// One search against the resource directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub category_id: Option<String>,
    pub subcategory_id: Option<String>,
    pub keyword: Option<String>,
    pub zip_code: Option<String>,
    pub coords: Option<Coordinates>,
    #[serde(default)]
    pub sort_by: SortBy,
    /// Maximum number of results after sorting; `None` returns everything.
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: usize,
}

impl SearchRequest {
    /// A category search with no location.
    #[must_use]
    pub fn category(category_id: impl Into<String>) -> Self {
        Self {
            category_id: Some(category_id.into()),
            ..Self::default()
        }
    }

    /// A free-text keyword search with no location.
    #[must_use]
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_subcategory(mut self, subcategory_id: impl Into<String>) -> Self {
        self.subcategory_id = Some(subcategory_id.into());
        self
    }

    #[must_use]
    pub fn with_zip(mut self, zip: impl Into<String>) -> Self {
        self.zip_code = Some(zip.into());
        self
    }

    #[must_use]
    pub fn with_coords(mut self, coords: Coordinates) -> Self {
        self.coords = Some(coords);
        self
    }

    #[must_use]
    pub fn sorted_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    #[must_use]
    pub fn paged(mut self, limit: Option<usize>, offset: usize) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    /// Keyword text with surrounding whitespace removed; blank counts as absent.
    #[must_use]
    pub fn keyword_text(&self) -> Option<&str> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Category id with surrounding whitespace removed; blank counts as absent.
    #[must_use]
    pub fn category_text(&self) -> Option<&str> {
        self.category_id
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// `true` when the caller supplied a ZIP or coordinates.
    #[must_use]
    pub fn has_location(&self) -> bool {
        self.coords.is_some()
            || self
                .zip_code
                .as_deref()
                .is_some_and(|zip| !zip.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource_with_zip(zip: Option<&str>) -> Resource {
        Resource {
            id: "1".to_string(),
            name: "Food Bank".to_string(),
            description: NO_DESCRIPTION.to_string(),
            category_id: "food".to_string(),
            subcategory_id: None,
            location: "Santa Barbara".to_string(),
            zip_code: zip.map(str::to_string),
            address: None,
            phone: None,
            email: None,
            url: None,
            distance_miles: None,
            languages: vec![DEFAULT_LANGUAGE.to_string()],
            eligibility: None,
            hours: None,
        }
    }

    #[test]
    fn rankable_zip_requires_five_digits() {
        assert_eq!(resource_with_zip(Some("93101")).rankable_zip(), Some("93101"));
        assert_eq!(resource_with_zip(Some("931")).rankable_zip(), None);
        assert_eq!(resource_with_zip(Some("93101-1234")).rankable_zip(), None);
        assert_eq!(resource_with_zip(Some("9310a")).rankable_zip(), None);
        assert_eq!(resource_with_zip(None).rankable_zip(), None);
    }

    #[test]
    fn resource_serializes_camel_case_and_omits_unknown_distance() {
        let json = serde_json::to_value(resource_with_zip(Some("93101"))).expect("serialize");
        assert_eq!(json["zipCode"], "93101");
        assert_eq!(json["categoryId"], "food");
        assert!(json.get("distanceMiles").is_none());
    }

    #[test]
    fn sort_by_parses_case_insensitively() {
        assert_eq!("Distance".parse::<SortBy>(), Ok(SortBy::Distance));
        assert_eq!("name".parse::<SortBy>(), Ok(SortBy::Name));
        assert!("nearest".parse::<SortBy>().is_err());
        assert_eq!(SortBy::default(), SortBy::Relevance);
    }

    #[test]
    fn search_request_location_presence() {
        assert!(!SearchRequest::category("food").has_location());
        assert!(!SearchRequest::category("food").with_zip("  ").has_location());
        assert!(SearchRequest::category("food").with_zip("93101").has_location());
        assert!(SearchRequest::category("food")
            .with_coords(Coordinates::new(34.4, -119.7))
            .has_location());
    }

    #[test]
    fn blank_keyword_counts_as_absent() {
        let req = SearchRequest::keyword("   ");
        assert_eq!(req.keyword_text(), None);
        assert_eq!(SearchRequest::keyword(" rent ").keyword_text(), Some("rent"));
    }
}
