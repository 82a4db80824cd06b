use cumple_core::ids::trust_code::{self, TRUST_CODE_LEN};
use cumple_core::{is_valid_slug, slugify, unique_slug};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

#[test]
fn container_names_slugify_to_expected_ids() {
    assert_eq!(slugify("Brains - Las Palmas"), "brains-las-palmas");
    assert_eq!(slugify("Superheroes - infantil"), "superheroes-infantil");
    assert_eq!(unique_slug("Brains", &["brains"]), "brains-1");
    assert_eq!(unique_slug("Brains", &["brains", "brains-1"]), "brains-2");
}

#[test]
fn accented_letters_are_dropped() {
    assert_eq!(slugify("Clase Pequeño Búho"), "clase-pequeo-bho");
    assert_eq!(slugify("¡¡!!"), "");
}

#[test]
fn ten_thousand_generated_codes_are_valid() {
    let mut distinct = HashSet::new();
    for _ in 0..10_000 {
        let code = trust_code::generate();
        assert_eq!(code.len(), TRUST_CODE_LEN);
        assert!(trust_code::is_valid(&code), "invalid code {code}");
        distinct.insert(code);
    }
    // 36^6 codes; a handful of birthday collisions is expected, hundreds are not.
    assert!(distinct.len() > 9_950, "too many collisions: {}", distinct.len());
}

#[test]
fn seeded_generator_is_reproducible() {
    let first = trust_code::generate_with(&mut StdRng::seed_from_u64(7));
    let second = trust_code::generate_with(&mut StdRng::seed_from_u64(7));
    assert_eq!(first, second);
    assert!(trust_code::is_valid(&first));
}

#[test]
fn user_input_normalizes_to_canonical_code() {
    assert_eq!(trust_code::normalize(" abc-123 "), "ABC123");
    assert_eq!(trust_code::format("ABC123"), "ABC-123");
    assert_eq!(trust_code::format("AB12"), "AB12");
    assert!(!trust_code::is_valid("abc123"));
    assert!(!trust_code::is_valid("ABC-123"));
}

proptest! {
    #[test]
    fn slugify_is_idempotent(text in "\\PC{0,40}") {
        let once = slugify(&text);
        prop_assert_eq!(slugify(&once), once.clone());
        prop_assert!(once.is_empty() || is_valid_slug(&once));
    }

    #[test]
    fn unique_slug_avoids_existing(
        name in "[A-Za-z][A-Za-z0-9 ]{0,12}",
        existing in prop::collection::vec("[a-z]{1,3}(-[0-9])?", 0..12),
    ) {
        let slug = unique_slug(&name, &existing);
        prop_assert!(!existing.contains(&slug));
        if !existing.contains(&slugify(&name)) {
            prop_assert_eq!(slug, slugify(&name));
        }
    }

    #[test]
    fn format_and_normalize_round_trip(code in "[A-Za-z0-9]{3}-?[A-Za-z0-9]{3}") {
        let canonical = trust_code::normalize(&code);
        prop_assert!(trust_code::is_valid(&canonical));
        prop_assert_eq!(trust_code::normalize(&trust_code::format(&canonical)), canonical);
    }
}
