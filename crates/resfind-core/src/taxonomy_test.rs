use std::path::Path;

use super::*;

const FIXTURE: &str = r"
categories:
  - id: food
    label: Food
    taxonomy_code: BD-1800
    keywords: [food, Meals]
    subcategories:
      - id: food-pantries
        label: Food Pantries
        taxonomy_code: BD-1800.2000
      - id: community-gardens
        label: Community Gardens
  - id: benefits
    label: Benefits
    taxonomy_code: NL
    keywords: [food stamps, snap]
  - id: childcare
    label: Childcare
    keywords: [daycare, child care]
";

fn fixture() -> Taxonomy {
    Taxonomy::from_yaml_str(FIXTURE).expect("fixture taxonomy should parse")
}

#[test]
fn resolve_prefers_subcategory_code() {
    let term = fixture().resolve("food", Some("food-pantries")).unwrap();
    assert_eq!(term, SearchTerm::TaxonomyCode("BD-1800.2000".to_string()));
    assert!(term.is_code());
}

#[test]
fn resolve_subcategory_without_code_falls_back_to_category_code() {
    let term = fixture()
        .resolve("food", Some("community-gardens"))
        .unwrap();
    assert_eq!(term, SearchTerm::TaxonomyCode("BD-1800".to_string()));
}

#[test]
fn resolve_unknown_subcategory_falls_back_to_category_code() {
    let term = fixture().resolve("food", Some("no-such-sub")).unwrap();
    assert_eq!(term.as_str(), "BD-1800");
    assert!(term.is_code());
}

#[test]
fn resolve_keyword_only_category_uses_first_keyword() {
    let term = fixture().resolve("childcare", None).unwrap();
    assert_eq!(term, SearchTerm::Keyword("daycare".to_string()));
    assert!(!term.is_code());
}

#[test]
fn resolve_unknown_category_fails() {
    let err = fixture().resolve("pets", None).unwrap_err();
    assert_eq!(err, TaxonomyError::UnknownCategory("pets".to_string()));
}

#[test]
fn match_keyword_first_declared_category_wins() {
    // Both `food` and `benefits` carry a keyword containing "food".
    let taxonomy = fixture();
    let matched = taxonomy.match_keyword("food").expect("should match");
    assert_eq!(matched.id, "food");

    let matched = taxonomy.match_keyword("Food Stamps office").expect("should match");
    assert_eq!(matched.id, "food");
}

#[test]
fn match_keyword_is_case_insensitive() {
    let taxonomy = fixture();
    assert_eq!(taxonomy.match_keyword("DAYCARE").map(|c| c.id.as_str()), Some("childcare"));
    assert_eq!(taxonomy.match_keyword("hot meals").map(|c| c.id.as_str()), Some("food"));
}

#[test]
fn match_keyword_no_match_or_blank() {
    let taxonomy = fixture();
    assert!(taxonomy.match_keyword("veterinarian").is_none());
    assert!(taxonomy.match_keyword("   ").is_none());
}

#[test]
fn category_for_code_exact_and_subcategory_codes() {
    let taxonomy = fixture();
    assert_eq!(taxonomy.category_for_code("BD-1800"), "food");
    assert_eq!(taxonomy.category_for_code("bd-1800.2000"), "food");
    assert_eq!(taxonomy.category_for_code("NL"), "benefits");
}

#[test]
fn category_for_code_prefix_match() {
    assert_eq!(fixture().category_for_code("NL-6000.2000"), "benefits");
}

#[test]
fn category_for_code_unrecognized_degrades_to_root_segment() {
    assert_eq!(fixture().category_for_code("YZ-1500.0300"), "yz");
    assert_eq!(fixture().category_for_code(""), "");
}

#[test]
fn category_without_code_or_keywords_is_rejected() {
    let yaml = "categories:\n  - id: empty\n    label: Empty\n";
    let err = Taxonomy::from_yaml_str(yaml).unwrap_err();
    assert!(matches!(err, ConfigError::TaxonomyFileParse(_)), "{err:?}");
}

#[test]
fn blank_keywords_do_not_satisfy_invariant() {
    let yaml = "categories:\n  - id: empty\n    label: Empty\n    keywords: ['  ']\n";
    assert!(Taxonomy::from_yaml_str(yaml).is_err());
}

#[test]
fn duplicate_category_ids_are_rejected() {
    let yaml = "categories:\n  - id: food\n    label: A\n    keywords: [a]\n  - id: food\n    label: B\n    keywords: [b]\n";
    let err = Taxonomy::from_yaml_str(yaml).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref msg) if msg.contains("duplicate")));
}

#[test]
fn duplicate_subcategory_ids_are_rejected() {
    let yaml = r"
categories:
  - id: food
    label: Food
    taxonomy_code: BD
    subcategories:
      - { id: pantry, label: Pantry }
      - { id: pantry, label: Pantry Again }
";
    assert!(matches!(
        Taxonomy::from_yaml_str(yaml),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn declaration_order_is_preserved() {
    let taxonomy = fixture();
    let ids: Vec<&str> = taxonomy.categories().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["food", "benefits", "childcare"]);
}

#[test]
fn category_serializes_back_to_file_shape() {
    let taxonomy = fixture();
    let json = serde_json::to_value(taxonomy.category("childcare").unwrap()).unwrap();
    assert_eq!(json["id"], "childcare");
    assert!(json.get("taxonomy_code").is_none());
    assert_eq!(json["keywords"][0], "daycare");
}

#[test]
fn shipped_taxonomy_file_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/taxonomy.yaml");
    let taxonomy = load_taxonomy(&path).expect("shipped taxonomy should load");
    assert!(taxonomy.category("food").is_some());

    for category in taxonomy.categories() {
        for keyword in category.vocabulary.keywords() {
            assert_eq!(
                taxonomy.match_keyword(keyword).map(|c| c.id.as_str()),
                Some(category.id.as_str()),
                "keyword {keyword:?} should route to {}",
                category.id
            );
        }
    }
}

#[test]
fn shipped_taxonomy_routes_overlapping_phrases_to_narrower_category() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/taxonomy.yaml");
    let taxonomy = load_taxonomy(&path).expect("shipped taxonomy should load");
    let route = |text: &str| taxonomy.match_keyword(text).map(|c| c.id.clone());

    assert_eq!(route("mental health").as_deref(), Some("mental-health"));
    assert_eq!(route("health").as_deref(), Some("healthcare"));
    assert_eq!(route("food stamps").as_deref(), Some("benefits"));
    assert_eq!(route("food").as_deref(), Some("food"));
    assert_eq!(route("Food Bank").as_deref(), Some("food"));
}

#[test]
fn load_taxonomy_missing_file() {
    let err = load_taxonomy(Path::new("/nonexistent/taxonomy.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::TaxonomyFileIo { .. }));
}

#[test]
fn slugify_term_labels() {
    assert_eq!(slugify("Food Pantries"), "food-pantries");
    assert_eq!(slugify("Rent/Mortgage Payment Assistance"), "rent-mortgage-payment-assistance");
    assert_eq!(slugify("  Women's  Shelters "), "womens-shelters");
    assert_eq!(slugify("Food & Meals"), "food-meals");
}
