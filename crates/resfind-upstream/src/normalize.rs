//! Normalization of raw upstream records into [`resfind_core::Resource`].
//!
//! The upstream schema drifts between API versions, so nothing here
//! deserializes into a fixed struct. Each field is probed across its known
//! spellings in priority order and degrades to a documented default when
//! absent. [`normalize`] is total: it never fails and never drops a record.

use std::sync::LazyLock;

use regex::Regex;
use resfind_core::resource::{DEFAULT_LANGUAGE, NO_DESCRIPTION, UNNAMED_SERVICE};
use resfind_core::{slugify, Resource, Taxonomy};
use serde_json::Value;

use crate::types::RawResult;

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid html tag regex"));
static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").expect("valid phone regex")
});
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email regex")
});
static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("valid url regex"));
static HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)href\s*=\s*["']?(https?://[^"'\s>]+)"#).expect("valid href regex")
});

const ID_KEYS: &[&str] = &[
    "id",
    "idServiceAtLocation",
    "serviceAtLocationId",
    "idService",
    "serviceId",
];
const NAME_KEYS: &[&str] = &["nameService", "nameServiceAtLocation", "name", "serviceName"];
const DESCRIPTION_KEYS: &[&str] = &["descriptionService", "description"];
const STREET_KEYS: &[&str] = &["streetAddress", "address1", "street", "line1"];
const CITY_KEYS: &[&str] = &["city", "locality"];
const STATE_KEYS: &[&str] = &["state", "stateProvince", "region"];
const POSTAL_KEYS: &[&str] = &["postalCode", "zip", "zipCode", "postal"];

/// Removes anything that looks like an HTML tag and trims the result.
///
/// Entities such as `&amp;` are left untouched.
#[must_use]
pub fn strip_html(text: &str) -> String {
    HTML_TAG.replace_all(text, "").trim().to_string()
}

/// Converts one upstream record into a [`Resource`].
///
/// `taxonomy` maps the record's taxonomy code back to an application
/// category. The returned resource never carries a distance; that is
/// computed later from ZIP coordinates.
#[must_use]
pub fn normalize(raw: &RawResult, taxonomy: &Taxonomy) -> Resource {
    let record = unwrap_document(raw.as_value());
    let detailed = record.get("detailedService").filter(|v| v.is_object());

    let id = text(record, ID_KEYS).unwrap_or_default();
    let name = text(record, NAME_KEYS).unwrap_or_else(|| UNNAMED_SERVICE.to_string());

    let raw_description = text(record, DESCRIPTION_KEYS)
        .or_else(|| detailed.and_then(|d| text(d, DESCRIPTION_KEYS)));
    let description = raw_description
        .as_deref()
        .map(strip_html)
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());

    let block = address_block(record);
    let city = block.and_then(|b| text(b, CITY_KEYS));
    let zip_code = block
        .and_then(|b| text(b, POSTAL_KEYS))
        .or_else(|| text(record, POSTAL_KEYS));
    let address = address_line(record, block);
    let location = city
        .or_else(|| {
            record
                .get("location")
                .filter(|v| v.is_object())
                .and_then(|l| text(l, &["name", "nameLocation"]))
        })
        .or_else(|| text(record, &["nameLocation", "locationName"]))
        .unwrap_or_default();

    let phone = text(record, &["phone", "phoneNumber"])
        .or_else(|| first_phone(record.get("phones")))
        .or_else(|| detailed.and_then(|d| first_phone(d.get("phones"))))
        .or_else(|| find_match(&PHONE, &description));
    let email = text(record, &["email"])
        .or_else(|| detailed.and_then(|d| text(d, &["email"])))
        .or_else(|| find_match(&EMAIL, &description));
    let url = text(record, &["website", "url"])
        .or_else(|| detailed.and_then(|d| text(d, &["website", "url"])))
        .or_else(|| find_url(&description))
        .or_else(|| raw_description.as_deref().and_then(find_href));

    let (category_id, subcategory_id) = taxonomy_fields(record, detailed, taxonomy);

    let languages = languages(record.get("languages"))
        .or_else(|| detailed.and_then(|d| languages(d.get("languages"))))
        .unwrap_or_else(|| vec![DEFAULT_LANGUAGE.to_string()]);

    let eligibility = detailed
        .and_then(|d| prose(d.get("eligibility")))
        .or_else(|| prose(record.get("eligibility")));
    let hours = detailed
        .and_then(|d| schedules(d.get("schedules")))
        .or_else(|| schedules(record.get("schedules")))
        .or_else(|| text(record, &["hours"]));

    Resource {
        id,
        name,
        description,
        category_id,
        subcategory_id,
        location,
        zip_code,
        address,
        phone,
        email,
        url,
        distance_miles: None,
        languages,
        eligibility,
        hours,
    }
}

/// Some API versions wrap each record as `{"document": {...}}`.
fn unwrap_document(value: &Value) -> &Value {
    value
        .get("document")
        .filter(|d| d.is_object())
        .unwrap_or(value)
}

/// First non-blank string (or number, rendered) found under any of `keys`.
fn text(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| scalar_text(value.get(*key)?))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn address_block(record: &Value) -> Option<&Value> {
    let location = record.get("location").filter(|v| v.is_object());
    record
        .get("address")
        .filter(|v| v.is_object())
        .or_else(|| location.and_then(|l| l.get("address")).filter(|v| v.is_object()))
        .or(location)
}

fn address_line(record: &Value, block: Option<&Value>) -> Option<String> {
    if let Some(flat) = record.get("address").and_then(scalar_text) {
        return Some(flat);
    }
    let block = block?;

    let street = text(block, STREET_KEYS);
    let city = text(block, CITY_KEYS);
    let region = [text(block, STATE_KEYS), text(block, POSTAL_KEYS)]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    let parts: Vec<String> = [street, city, Some(region)]
        .into_iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .collect();

    (!parts.is_empty()).then(|| parts.join(", "))
}

fn first_phone(phones: Option<&Value>) -> Option<String> {
    phones?.as_array()?.iter().find_map(|entry| {
        scalar_text(entry).or_else(|| text(entry, &["number", "phone", "phoneNumber"]))
    })
}

fn find_match(pattern: &Regex, haystack: &str) -> Option<String> {
    pattern.find(haystack).map(|m| m.as_str().to_string())
}

fn find_url(haystack: &str) -> Option<String> {
    URL.find(haystack)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ')']).to_string())
}

/// Link targets vanish with the tags, so anchors are read from the raw text.
fn find_href(raw: &str) -> Option<String> {
    HREF.captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn taxonomy_fields(
    record: &Value,
    detailed: Option<&Value>,
    taxonomy: &Taxonomy,
) -> (String, Option<String>) {
    let entry = record
        .get("taxonomy")
        .or_else(|| detailed.and_then(|d| d.get("taxonomy")))
        .and_then(|t| match t {
            Value::Array(items) => items.iter().find(|item| item.is_object()),
            Value::Object(_) => Some(t),
            _ => None,
        });
    let Some(entry) = entry else {
        return (String::new(), None);
    };

    let category_id = text(entry, &["taxonomyCode", "code"])
        .map(|code| taxonomy.category_for_code(&code))
        .unwrap_or_default();
    let subcategory_id = text(entry, &["taxonomyTerm", "term", "name", "label"])
        .map(|label| slugify(&label))
        .filter(|slug| !slug.is_empty());

    (category_id, subcategory_id)
}

fn languages(value: Option<&Value>) -> Option<Vec<String>> {
    let names: Vec<String> = match value? {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| scalar_text(item).or_else(|| text(item, &["name", "language"])))
            .collect(),
        Value::String(s) => s
            .split([',', ';'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };
    (!names.is_empty()).then_some(names)
}

/// Free text that may arrive bare or wrapped as `{"description": ...}`.
fn prose(value: Option<&Value>) -> Option<String> {
    let value = value?;
    scalar_text(value)
        .or_else(|| text(value, &["description", "text"]))
        .map(|s| strip_html(&s))
        .filter(|s| !s.is_empty())
}

fn schedules(value: Option<&Value>) -> Option<String> {
    let entries: Vec<String> = value?
        .as_array()?
        .iter()
        .filter_map(|entry| {
            scalar_text(entry).or_else(|| text(entry, &["description", "schedule", "hours"]))
        })
        .map(|s| strip_html(&s))
        .filter(|s| !s.is_empty())
        .collect();
    (!entries.is_empty()).then(|| entries.join("; "))
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
