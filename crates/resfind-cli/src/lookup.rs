//! Offline commands that only read the reference data files.

use std::path::Path;

use resfind_core::{normalize_zip, ZipGeocoder};

/// Print every category with its upstream search vocabulary.
///
/// # Errors
///
/// Returns an error if the taxonomy file cannot be read or is invalid.
pub(crate) fn run_categories(path: &Path) -> anyhow::Result<()> {
    let taxonomy = resfind_core::load_taxonomy(path)?;

    println!("{:<20}{:<24}SEARCH TERM", "ID", "LABEL");
    for category in taxonomy.categories() {
        let term = category.search_term();
        let kind = if term.is_code() { "code" } else { "keyword" };
        println!("{:<20}{:<24}{} ({kind})", category.id, category.label, term);
        for sub in &category.subcategories {
            println!(
                "  {:<18}{:<24}{}",
                sub.id,
                sub.label,
                sub.taxonomy_code.as_deref().unwrap_or("\u{2014}")
            );
        }
    }

    Ok(())
}

/// Print the coordinates on file for one ZIP code.
///
/// # Errors
///
/// Returns an error if the ZIP is malformed, the table cannot be loaded, or
/// the ZIP is not in the table.
pub(crate) fn run_zip(zip: &str, table: &Path) -> anyhow::Result<()> {
    let Some(normalized) = normalize_zip(zip) else {
        anyhow::bail!("'{zip}' is not a US ZIP code");
    };
    let geocoder = ZipGeocoder::load(table)?;
    let coords = geocoder
        .lookup(&normalized)
        .ok_or_else(|| anyhow::anyhow!("ZIP {normalized} not found in {}", table.display()))?;

    println!("{normalized}\t{:.4}\t{:.4}", coords.lat, coords.lon);
    Ok(())
}
