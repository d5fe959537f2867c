pub mod app_config;
pub mod config;
pub mod error;
pub mod geo;
pub mod resource;
pub mod taxonomy;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, TaxonomyError};
pub use geo::{haversine_miles, normalize_zip, Coordinates, ZipGeocoder};
pub use resource::{Resource, SearchRequest, SortBy};
pub use taxonomy::{
    load_taxonomy, slugify, Category, CategoryVocabulary, SearchTerm, Subcategory, Taxonomy,
};
