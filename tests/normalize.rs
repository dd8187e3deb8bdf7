//! Property tests for the value cleaners and way member ordering.

use proptest::prelude::*;

use osm_shaper::data::ShapedElement;
use osm_shaper::etl::reader::ElementCursor;
use osm_shaper::etl::shape::shape_element;
use osm_shaper::normalize::{update_phone_number, update_street_name};

proptest! {
    #[test]
    fn phone_format_ignores_separators(
        area in "[0-9]{3}",
        prefix in "[0-9]{3}",
        line in "[0-9]{4}",
        lead in "[ (+]{0,2}",
        sep1 in "[ ().-]{0,3}",
        sep2 in "[ .-]{0,3}",
        tail in "[ a-z]{0,5}",
    ) {
        let raw = format!("{lead}{area}{sep1}{prefix}{sep2}{line}{tail}");
        prop_assert_eq!(update_phone_number(&raw), format!("({area}) {prefix} - {line}"));
    }

    #[test]
    fn phone_without_ten_digits_is_unchanged(
        raw in "[a-z ()+.-]{0,8}[0-9]{0,9}[a-z ()+.-]{0,8}",
    ) {
        prop_assert_eq!(update_phone_number(&raw), raw);
    }

    #[test]
    fn street_with_full_suffix_is_unchanged(
        name in "[A-Z][a-z]{3,10}",
        suffix in prop::sample::select(vec![
            "Street", "Avenue", "Boulevard", "Drive", "Court", "Place",
            "Square", "Lane", "Road", "Trail", "Parkway", "Commons",
        ]),
    ) {
        let street = format!("{name} {suffix}");
        prop_assume!(update_street_name(&name) == name);
        prop_assert_eq!(update_street_name(&street), street.clone());
        prop_assert_eq!(update_street_name(&update_street_name(&street)), street);
    }

    #[test]
    fn way_node_positions_follow_document_order(refs in prop::collection::vec(1i64..10_000, 0..40)) {
        let nds: String = refs.iter().map(|r| format!(r#"<nd ref="{r}"/>"#)).collect();
        let document = format!(r#"<osm><way id="5">{nds}<tag k="highway" v="path"/></way></osm>"#);

        let element = ElementCursor::new(document.as_bytes()).next().unwrap().unwrap();
        let ShapedElement::Way { nodes, .. } = shape_element(&element).unwrap() else {
            panic!("expected a way");
        };

        prop_assert_eq!(nodes.len(), refs.len());
        for (i, (record, reference)) in nodes.iter().zip(&refs).enumerate() {
            prop_assert_eq!(record.position, i);
            prop_assert_eq!(record.node_id, *reference);
            prop_assert_eq!(record.id, 5);
        }
    }
}

#[test]
fn abbreviation_expands_only_its_token() {
    for (abbreviation, expansion) in [("St", "Street"), ("ave.", "Avenue"), ("TRL", "Trail"), ("Cv.", "Cove")] {
        let street = format!("North Lamar {abbreviation}");
        assert_eq!(update_street_name(&street), format!("North Lamar {expansion}"));
    }
}
