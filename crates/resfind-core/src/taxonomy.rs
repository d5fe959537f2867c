//! Category → upstream vocabulary mapping.
//!
//! The taxonomy table is static configuration loaded once at startup. Each
//! category carries either an upstream taxonomy code (optionally with search
//! keywords) or, when the upstream has no code for it, a non-empty keyword
//! list. Declaration order is significant: [`Taxonomy::match_keyword`] returns
//! the first category that matches.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, TaxonomyError};

/// The term sent to the upstream search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTerm {
    /// A structured taxonomy code; the upstream must be told it is a code.
    TaxonomyCode(String),
    /// Free text matched by the upstream keyword engine.
    Keyword(String),
}

impl SearchTerm {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            SearchTerm::TaxonomyCode(term) | SearchTerm::Keyword(term) => term,
        }
    }

    #[must_use]
    pub fn is_code(&self) -> bool {
        matches!(self, SearchTerm::TaxonomyCode(_))
    }
}

impl std::fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a category is expressed in the upstream vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryVocabulary {
    Code {
        taxonomy_code: String,
        /// Free-text aliases used only for keyword → category matching.
        keywords: Vec<String>,
    },
    /// Guaranteed non-empty by construction.
    Keywords(Vec<String>),
}

impl CategoryVocabulary {
    #[must_use]
    pub fn taxonomy_code(&self) -> Option<&str> {
        match self {
            CategoryVocabulary::Code { taxonomy_code, .. } => Some(taxonomy_code),
            CategoryVocabulary::Keywords(_) => None,
        }
    }

    #[must_use]
    pub fn keywords(&self) -> &[String] {
        match self {
            CategoryVocabulary::Code { keywords, .. } | CategoryVocabulary::Keywords(keywords) => {
                keywords
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxonomy_code: Option<String>,
}

/// One application category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CategoryFile", into = "CategoryFile")]
pub struct Category {
    pub id: String,
    pub label: String,
    pub vocabulary: CategoryVocabulary,
    pub subcategories: Vec<Subcategory>,
}

/// On-disk shape of a category entry, before the code/keyword invariant is
/// enforced.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CategoryFile {
    id: String,
    label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    taxonomy_code: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    subcategories: Vec<Subcategory>,
}

impl TryFrom<CategoryFile> for Category {
    type Error = String;

    fn try_from(raw: CategoryFile) -> Result<Self, Self::Error> {
        let keywords: Vec<String> = raw
            .keywords
            .into_iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        let code = raw
            .taxonomy_code
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let vocabulary = match code {
            Some(taxonomy_code) => CategoryVocabulary::Code {
                taxonomy_code,
                keywords,
            },
            None if !keywords.is_empty() => CategoryVocabulary::Keywords(keywords),
            None => {
                return Err(format!(
                    "category '{}' needs a taxonomy_code or at least one keyword",
                    raw.id
                ))
            }
        };

        Ok(Category {
            id: raw.id,
            label: raw.label,
            vocabulary,
            subcategories: raw.subcategories,
        })
    }
}

impl From<Category> for CategoryFile {
    fn from(category: Category) -> Self {
        let (taxonomy_code, keywords) = match category.vocabulary {
            CategoryVocabulary::Code {
                taxonomy_code,
                keywords,
            } => (Some(taxonomy_code), keywords),
            CategoryVocabulary::Keywords(keywords) => (None, keywords),
        };
        CategoryFile {
            id: category.id,
            label: category.label,
            taxonomy_code,
            keywords,
            subcategories: category.subcategories,
        }
    }
}

impl Category {
    #[must_use]
    pub fn subcategory(&self, id: &str) -> Option<&Subcategory> {
        self.subcategories.iter().find(|s| s.id == id)
    }

    /// The term to search for this category alone: its code, else its first
    /// keyword.
    #[must_use]
    pub fn search_term(&self) -> SearchTerm {
        match &self.vocabulary {
            CategoryVocabulary::Code { taxonomy_code, .. } => {
                SearchTerm::TaxonomyCode(taxonomy_code.clone())
            }
            CategoryVocabulary::Keywords(keywords) => {
                SearchTerm::Keyword(keywords.first().cloned().unwrap_or_default())
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct TaxonomyFile {
    categories: Vec<Category>,
}

/// The validated, read-only taxonomy table.
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    categories: Vec<Category>,
}

impl Taxonomy {
    /// Builds a taxonomy, preserving the given declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for empty or duplicate ids.
    pub fn new(categories: Vec<Category>) -> Result<Self, ConfigError> {
        validate_categories(&categories)?;
        Ok(Self { categories })
    }

    /// Parses and validates a taxonomy from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TaxonomyFileParse`] for malformed YAML or a
    /// category violating the code/keyword invariant, and
    /// [`ConfigError::Validation`] for empty or duplicate ids.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let file: TaxonomyFile = serde_yaml::from_str(content)?;
        Self::new(file.categories)
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Resolves a category (and optional subcategory) to an upstream term.
    ///
    /// Fallback chain: subcategory code, then category code, then the
    /// category's first keyword.
    ///
    /// # Errors
    ///
    /// Returns [`TaxonomyError::UnknownCategory`] when `category_id` is not in
    /// the table.
    pub fn resolve(
        &self,
        category_id: &str,
        subcategory_id: Option<&str>,
    ) -> Result<SearchTerm, TaxonomyError> {
        let category = self
            .category(category_id)
            .ok_or_else(|| TaxonomyError::UnknownCategory(category_id.to_string()))?;

        let subcategory_code = subcategory_id
            .and_then(|id| category.subcategory(id))
            .and_then(|sub| sub.taxonomy_code.as_deref())
            .filter(|code| !code.trim().is_empty());

        if let Some(code) = subcategory_code {
            return Ok(SearchTerm::TaxonomyCode(code.trim().to_string()));
        }

        Ok(category.search_term())
    }

    /// Maps free text to the first category (in declaration order) whose
    /// keyword list overlaps it. Matching is case-insensitive containment in
    /// either direction.
    #[must_use]
    pub fn match_keyword(&self, text: &str) -> Option<&Category> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        self.categories.iter().find(|category| {
            category
                .vocabulary
                .keywords()
                .iter()
                .any(|kw| needle.contains(kw.as_str()) || kw.contains(needle.as_str()))
        })
    }

    /// Maps an upstream taxonomy code back to an application category id.
    ///
    /// Tries an exact match against category and subcategory codes, then the
    /// longest category code that prefixes `code`. Unrecognized codes degrade
    /// to their lower-cased root segment (`"XY-1000.5"` → `"xy"`). Blank input
    /// yields an empty string.
    #[must_use]
    pub fn category_for_code(&self, code: &str) -> String {
        let code = code.trim();
        if code.is_empty() {
            return String::new();
        }

        let exact = self.categories.iter().find(|category| {
            category
                .vocabulary
                .taxonomy_code()
                .is_some_and(|c| c.eq_ignore_ascii_case(code))
                || category.subcategories.iter().any(|sub| {
                    sub.taxonomy_code
                        .as_deref()
                        .is_some_and(|c| c.eq_ignore_ascii_case(code))
                })
        });
        if let Some(category) = exact {
            return category.id.clone();
        }

        let upper = code.to_ascii_uppercase();
        let prefixed = self
            .categories
            .iter()
            .filter_map(|category| {
                category
                    .vocabulary
                    .taxonomy_code()
                    .map(|c| (category, c.to_ascii_uppercase()))
            })
            .filter(|(_, c)| upper.starts_with(c.as_str()))
            .max_by_key(|(_, c)| c.len());
        if let Some((category, _)) = prefixed {
            return category.id.clone();
        }

        code.split(['-', '.', ' '])
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }
}

/// Load and validate the taxonomy table from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_taxonomy(path: &Path) -> Result<Taxonomy, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TaxonomyFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    Taxonomy::from_yaml_str(&content)
}

fn validate_categories(categories: &[Category]) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for category in categories {
        if category.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "category id must be non-empty".to_string(),
            ));
        }

        if !seen_ids.insert(category.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate category id: '{}'",
                category.id
            )));
        }

        let mut seen_subs = HashSet::new();
        for sub in &category.subcategories {
            if sub.id.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "category '{}' has a subcategory with an empty id",
                    category.id
                )));
            }
            if !seen_subs.insert(sub.id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate subcategory id '{}' in category '{}'",
                    sub.id, category.id
                )));
            }
        }
    }

    Ok(())
}

/// Generate a URL-safe slug: lower-case ASCII alphanumerics joined by single
/// dashes. Other characters are dropped.
#[must_use]
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else if c.is_whitespace() || c == '/' || c == '&' || c == '_' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|&c| c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
#[path = "taxonomy_test.rs"]
mod tests;
