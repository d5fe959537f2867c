//! ZIP-code geocoding and great-circle distance.
//!
//! [`ZipGeocoder`] is a static ZIP → coordinate table with no network access.
//! It is built once at startup and passed explicitly to whoever needs it, so
//! tests can construct one from a handful of fixture rows.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const EARTH_RADIUS_MILES: f64 = 3959.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// `true` when both components are finite and inside the WGS84 ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Great-circle distance to `other` in miles.
    #[must_use]
    pub fn miles_to(&self, other: &Coordinates) -> f64 {
        haversine_miles(self.lat, self.lon, other.lat, other.lon)
    }
}

/// Great-circle distance in miles between two points (Earth radius 3959 mi).
///
/// Identical points yield exactly `0.0`; the result is never negative.
#[must_use]
pub fn haversine_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let lat1_r = lat1.to_radians();
    let lat2_r = lat2.to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1_r.cos() * lat2_r.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair outside [0, 1] for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_MILES * c
}

/// Normalizes a user-supplied ZIP code to its zero-padded 5-digit form.
///
/// Accepts 1–5 ASCII digits (surrounding whitespace ignored). Anything else,
/// including ZIP+4 and 6+ digit strings, returns `None`.
#[must_use]
pub fn normalize_zip(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.len() > 5 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{trimmed:0>5}"))
}

/// Static ZIP → [`Coordinates`] lookup table.
#[derive(Debug, Clone, Default)]
pub struct ZipGeocoder {
    table: HashMap<String, Coordinates>,
}

impl ZipGeocoder {
    /// Builds a geocoder from `(zip, lat, lon)` rows. Rows whose ZIP does not
    /// normalize are skipped.
    #[must_use]
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64, f64)>,
        S: AsRef<str>,
    {
        let table = entries
            .into_iter()
            .filter_map(|(zip, lat, lon)| {
                normalize_zip(zip.as_ref()).map(|zip| (zip, Coordinates::new(lat, lon)))
            })
            .collect();
        Self { table }
    }

    /// Parses `zip,lat,lon` CSV text. A leading header row, blank lines and
    /// `#` comments are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZipTableParse`] for rows with the wrong number of
    /// columns, an invalid ZIP, or unparseable coordinates.
    pub fn from_csv_str(content: &str) -> Result<Self, ConfigError> {
        let mut table = HashMap::new();

        for (idx, line) in content.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if idx == 0 && fields.first().is_some_and(|f| f.eq_ignore_ascii_case("zip")) {
                continue;
            }
            let &[zip, lat, lon] = fields.as_slice() else {
                return Err(ConfigError::ZipTableParse {
                    line: line_no,
                    reason: format!("expected 3 columns, found {}", fields.len()),
                });
            };

            let zip = normalize_zip(zip).ok_or_else(|| ConfigError::ZipTableParse {
                line: line_no,
                reason: format!("invalid ZIP code '{zip}'"),
            })?;
            let parse_coord = |raw: &str| {
                raw.parse::<f64>().map_err(|e| ConfigError::ZipTableParse {
                    line: line_no,
                    reason: format!("invalid coordinate '{raw}': {e}"),
                })
            };
            let coords = Coordinates::new(parse_coord(lat)?, parse_coord(lon)?);
            if !coords.is_valid() {
                return Err(ConfigError::ZipTableParse {
                    line: line_no,
                    reason: format!("coordinates out of range for {zip}"),
                });
            }

            table.insert(zip, coords);
        }

        Ok(Self { table })
    }

    /// Loads a ZIP table from a CSV file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZipTableIo`] if the file cannot be read, or
    /// [`ConfigError::ZipTableParse`] for malformed rows.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ZipTableIo {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_csv_str(&content)
    }

    /// Looks up the coordinates of a ZIP code. Input is normalized first, so
    /// `"101"` and `"00101"` resolve identically; invalid input yields `None`.
    #[must_use]
    pub fn lookup(&self, zip: &str) -> Option<Coordinates> {
        let zip = normalize_zip(zip)?;
        self.table.get(&zip).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
