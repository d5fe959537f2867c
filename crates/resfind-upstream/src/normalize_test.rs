use serde_json::json;

use super::*;

fn taxonomy() -> Taxonomy {
    Taxonomy::from_yaml_str(
        r"
categories:
  - id: food
    label: Food
    taxonomy_code: BD-1800
    keywords: [food]
    subcategories:
      - id: food-pantries
        label: Food Pantries
        taxonomy_code: BD-1800.2000
  - id: housing
    label: Housing
    taxonomy_code: BH
    keywords: [housing]
",
    )
    .expect("fixture taxonomy")
}

fn norm(value: serde_json::Value) -> Resource {
    normalize(&RawResult(value), &taxonomy())
}

// -----------------------------------------------------------------------
// Totality
// -----------------------------------------------------------------------

#[test]
fn empty_object_gets_documented_defaults() {
    let r = norm(json!({}));
    assert_eq!(r.id, "");
    assert_eq!(r.name, "Unnamed Service");
    assert_eq!(r.description, "No description available");
    assert_eq!(r.category_id, "");
    assert_eq!(r.subcategory_id, None);
    assert_eq!(r.location, "");
    assert_eq!(r.zip_code, None);
    assert_eq!(r.address, None);
    assert_eq!(r.phone, None);
    assert_eq!(r.email, None);
    assert_eq!(r.url, None);
    assert_eq!(r.distance_miles, None);
    assert_eq!(r.languages, vec!["English".to_string()]);
    assert_eq!(r.eligibility, None);
    assert_eq!(r.hours, None);
}

#[test]
fn malformed_inputs_never_panic() {
    let inputs = [
        json!(null),
        json!(42),
        json!("just a string"),
        json!([1, 2, 3]),
        json!({"name": 12, "description": ["a"], "address": 5, "taxonomy": "BD"}),
        json!({"taxonomy": [null, 7, "x"], "languages": {"weird": true}, "phones": "nope"}),
        json!({"detailedService": "not-an-object", "location": [], "document": "str"}),
        json!({"address": {"postalCode": {"nested": true}}, "schedules": [null, {}]}),
        json!({"nameService": "   ", "descriptionService": "<p></p>"}),
    ];
    for input in inputs {
        let r = norm(input);
        assert!(!r.name.is_empty());
        assert!(!r.description.is_empty());
        assert!(!r.languages.is_empty());
        assert_eq!(r.distance_miles, None);
    }
}

#[test]
fn blank_name_and_empty_html_description_use_defaults() {
    let r = norm(json!({"nameService": "   ", "descriptionService": "<p> </p>"}));
    assert_eq!(r.name, "Unnamed Service");
    assert_eq!(r.description, "No description available");
}

// -----------------------------------------------------------------------
// Field fallback chains
// -----------------------------------------------------------------------

#[test]
fn name_prefers_name_service_then_at_location_then_name() {
    assert_eq!(
        norm(json!({"nameService": "A", "nameServiceAtLocation": "B", "name": "C"})).name,
        "A"
    );
    assert_eq!(norm(json!({"nameServiceAtLocation": "B", "name": "C"})).name, "B");
    assert_eq!(norm(json!({"name": "C"})).name, "C");
}

#[test]
fn numeric_id_is_rendered_as_string() {
    assert_eq!(norm(json!({"id": 9876})).id, "9876");
    assert_eq!(norm(json!({"idServiceAtLocation": "sal-1"})).id, "sal-1");
}

#[test]
fn description_strips_tags_but_keeps_entities() {
    let r = norm(json!({"descriptionService": "<p>Meals &amp; <b>groceries</b></p>"}));
    assert_eq!(r.description, "Meals &amp; groceries");
}

#[test]
fn description_falls_back_to_detailed_service() {
    let r = norm(json!({"detailedService": {"description": "Hot meals daily"}}));
    assert_eq!(r.description, "Hot meals daily");
}

#[test]
fn nested_address_block_is_composed() {
    let r = norm(json!({
        "address": {
            "streetAddress": "123 State St",
            "city": "Santa Barbara",
            "stateProvince": "CA",
            "postalCode": "93101"
        }
    }));
    assert_eq!(r.address.as_deref(), Some("123 State St, Santa Barbara, CA 93101"));
    assert_eq!(r.location, "Santa Barbara");
    assert_eq!(r.zip_code.as_deref(), Some("93101"));
}

#[test]
fn address_under_location_object() {
    let r = norm(json!({
        "location": {
            "name": "Westside Center",
            "address": {"address1": "423 W Victoria St", "city": "Santa Barbara", "zip": 93101}
        }
    }));
    assert_eq!(r.zip_code.as_deref(), Some("93101"));
    assert_eq!(r.location, "Santa Barbara");
    assert_eq!(r.address.as_deref(), Some("423 W Victoria St, Santa Barbara, 93101"));
}

#[test]
fn location_name_used_when_no_city() {
    let r = norm(json!({"location": {"name": "Westside Center"}}));
    assert_eq!(r.location, "Westside Center");
}

#[test]
fn flat_address_string_is_kept() {
    let r = norm(json!({"address": "1 Main St, Goleta CA", "zipCode": "93117"}));
    assert_eq!(r.address.as_deref(), Some("1 Main St, Goleta CA"));
    assert_eq!(r.zip_code.as_deref(), Some("93117"));
}

#[test]
fn non_conforming_zip_is_kept_verbatim() {
    let r = norm(json!({"address": {"postalCode": "93101-2211"}}));
    assert_eq!(r.zip_code.as_deref(), Some("93101-2211"));
    assert_eq!(r.rankable_zip(), None);
}

// -----------------------------------------------------------------------
// Contact extraction
// -----------------------------------------------------------------------

#[test]
fn structured_contact_fields_win_over_description() {
    let r = norm(json!({
        "description": "Call (805) 555-0100 or email other@example.org, see https://other.example.org",
        "phone": "805-555-9999",
        "email": "info@example.org",
        "website": "https://example.org"
    }));
    assert_eq!(r.phone.as_deref(), Some("805-555-9999"));
    assert_eq!(r.email.as_deref(), Some("info@example.org"));
    assert_eq!(r.url.as_deref(), Some("https://example.org"));
}

#[test]
fn contact_fields_extracted_from_description() {
    let r = norm(json!({
        "description": "Call (805) 555-0100 or write help@foodbank.org. Visit https://foodbank.org/get-help."
    }));
    assert_eq!(r.phone.as_deref(), Some("(805) 555-0100"));
    assert_eq!(r.email.as_deref(), Some("help@foodbank.org"));
    assert_eq!(r.url.as_deref(), Some("https://foodbank.org/get-help"));
}

#[test]
fn url_recovered_from_anchor_when_only_in_markup() {
    let r = norm(json!({
        "descriptionService": "<p>Apply <a href=\"https://pantry.example.org/apply\">online</a> today.</p>"
    }));
    assert_eq!(r.description, "Apply online today.");
    assert_eq!(r.url.as_deref(), Some("https://pantry.example.org/apply"));
}

#[test]
fn visible_url_preferred_over_anchor_target() {
    let r = norm(json!({
        "description": "See https://visible.example.org or <a href='https://hidden.example.org'>here</a>"
    }));
    assert_eq!(r.url.as_deref(), Some("https://visible.example.org"));
}

#[test]
fn phone_from_phones_arrays() {
    let r = norm(json!({"phones": [{"number": "805.555.0111"}]}));
    assert_eq!(r.phone.as_deref(), Some("805.555.0111"));

    let r = norm(json!({"detailedService": {"phones": [{"type": "fax"}, {"number": "805 555 0122"}]}}));
    assert_eq!(r.phone.as_deref(), Some("805 555 0122"));
}

#[test]
fn missing_contact_fields_are_none() {
    let r = norm(json!({"description": "Walk-ins welcome."}));
    assert_eq!(r.phone, None);
    assert_eq!(r.email, None);
    assert_eq!(r.url, None);
}

// -----------------------------------------------------------------------
// Taxonomy
// -----------------------------------------------------------------------

#[test]
fn taxonomy_code_maps_to_category_and_term_to_slug() {
    let r = norm(json!({
        "taxonomy": [{"taxonomyCode": "BD-1800.2000", "taxonomyTerm": "Food Pantries"}]
    }));
    assert_eq!(r.category_id, "food");
    assert_eq!(r.subcategory_id.as_deref(), Some("food-pantries"));
}

#[test]
fn unrecognized_taxonomy_code_degrades_to_root_segment() {
    let r = norm(json!({"taxonomy": [{"code": "LH-2700.6000", "term": "Home Health Care"}]}));
    assert_eq!(r.category_id, "lh");
    assert_eq!(r.subcategory_id.as_deref(), Some("home-health-care"));
}

#[test]
fn taxonomy_under_detailed_service() {
    let r = norm(json!({"detailedService": {"taxonomy": [{"taxonomyCode": "BH-1800"}]}}));
    assert_eq!(r.category_id, "housing");
    assert_eq!(r.subcategory_id, None);
}

// -----------------------------------------------------------------------
// Languages, eligibility, hours
// -----------------------------------------------------------------------

#[test]
fn languages_from_array_or_delimited_string() {
    assert_eq!(
        norm(json!({"languages": ["English", "Spanish"]})).languages,
        vec!["English", "Spanish"]
    );
    assert_eq!(
        norm(json!({"languages": "Spanish; Mixteco, English"})).languages,
        vec!["Spanish", "Mixteco", "English"]
    );
    assert_eq!(
        norm(json!({"detailedService": {"languages": [{"name": "Tagalog"}]}})).languages,
        vec!["Tagalog"]
    );
    assert_eq!(norm(json!({"languages": []})).languages, vec!["English"]);
}

#[test]
fn detailed_service_eligibility_and_schedules() {
    let r = norm(json!({
        "detailedService": {
            "eligibility": {"description": "<p>Santa Barbara County residents</p>"},
            "schedules": [
                {"description": "Mon-Fri 9am-5pm"},
                "Sat 10am-2pm",
                {"other": true}
            ]
        }
    }));
    assert_eq!(r.eligibility.as_deref(), Some("Santa Barbara County residents"));
    assert_eq!(r.hours.as_deref(), Some("Mon-Fri 9am-5pm; Sat 10am-2pm"));
}

#[test]
fn upstream_distance_is_never_copied() {
    let r = norm(json!({"name": "Pantry", "distance": 1.5, "distanceMiles": 2.0}));
    assert_eq!(r.distance_miles, None);
}

#[test]
fn document_wrapper_is_unwrapped() {
    let r = norm(json!({"document": {"id": "d-1", "nameService": "Wrapped Pantry"}}));
    assert_eq!(r.id, "d-1");
    assert_eq!(r.name, "Wrapped Pantry");
}

#[test]
fn strip_html_removes_tags_only() {
    assert_eq!(strip_html("<div class=\"x\">A &lt;b&gt;</div>"), "A &lt;b&gt;");
    assert_eq!(strip_html("no tags"), "no tags");
}
