//! `resfind search`: runs one ranked search against the live upstream.

use std::sync::Arc;

use clap::Args;
use resfind_core::{Coordinates, Resource, SearchRequest, SortBy, ZipGeocoder};
use resfind_search::RankingEngine;
use resfind_upstream::{UpstreamClient, UpstreamSettings};

#[derive(Debug, Args)]
pub(crate) struct SearchArgs {
    /// Category id from the taxonomy (e.g., food)
    #[arg(long)]
    pub category: Option<String>,
    /// Subcategory id within the category (e.g., food-pantries)
    #[arg(long, requires = "category")]
    pub subcategory: Option<String>,
    /// Free-text keyword; mapped to a category when it matches one
    #[arg(long)]
    pub keyword: Option<String>,
    /// ZIP code to search near
    #[arg(long)]
    pub zip: Option<String>,
    /// Latitude to search near (requires --lon)
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,
    /// Longitude to search near (requires --lat)
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,
    /// Result order: relevance, distance, or name
    #[arg(long, default_value = "relevance")]
    pub sort: SortBy,
    /// Maximum number of results to show
    #[arg(long)]
    pub limit: Option<usize>,
    /// Number of results to skip
    #[arg(long, default_value = "0")]
    pub offset: usize,
    /// Print results as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl SearchArgs {
    pub(crate) fn to_request(&self) -> SearchRequest {
        let coords = self.lat.zip(self.lon).map(|(lat, lon)| Coordinates::new(lat, lon));
        SearchRequest {
            category_id: self.category.clone(),
            subcategory_id: self.subcategory.clone(),
            keyword: self.keyword.clone(),
            zip_code: self.zip.clone(),
            coords,
            sort_by: self.sort,
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// Loads config and reference data, runs the search, and prints the results.
///
/// # Errors
///
/// Returns an error if configuration or reference data cannot be loaded, or
/// the request is malformed. Upstream failures print a warning and an empty
/// result instead.
pub(crate) async fn run_search(args: SearchArgs) -> anyhow::Result<()> {
    let config = resfind_core::load_app_config()?;
    let taxonomy = Arc::new(resfind_core::load_taxonomy(&config.taxonomy_path)?);
    let geocoder = Arc::new(ZipGeocoder::load(&config.zip_table_path)?);
    let upstream = UpstreamClient::new(&UpstreamSettings::from_app_config(&config))?;
    let engine = RankingEngine::new(upstream, taxonomy, geocoder);

    let request = args.to_request();
    tracing::debug!(?request, "running search");
    let ranked = engine.rank_detailed(&request).await?;

    if let Some(degraded) = &ranked.degraded {
        eprintln!("warning: {degraded}");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&ranked.resources)?);
        return Ok(());
    }

    if ranked.resources.is_empty() {
        println!("no resources found");
        return Ok(());
    }

    println!(
        "{} of {} results (sorted by {})",
        ranked.resources.len(),
        ranked.total,
        ranked.sort_applied
    );
    print_table(&ranked.resources);
    Ok(())
}

fn print_table(resources: &[Resource]) {
    let header = format!(
        "{:<10}{:<20}{:<16}{:<8}NAME",
        "MILES", "LOCATION", "PHONE", "ZIP"
    );
    println!("{header}");
    for resource in resources {
        println!(
            "{:<10}{:<20}{:<16}{:<8}{}",
            fmt_miles(resource.distance_miles),
            truncate(&resource.location, 18),
            resource.phone.as_deref().unwrap_or("\u{2014}"),
            resource.zip_code.as_deref().unwrap_or("\u{2014}"),
            truncate(&resource.name, 50)
        );
    }
}

/// Format a distance for display, returning `"—"` when unknown.
pub(crate) fn fmt_miles(miles: Option<f64>) -> String {
    miles.map_or_else(|| "\u{2014}".to_string(), |m| format!("{m:.1}"))
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_string()
    }
}
