use harvest_core::build_index;
use harvest_model::{ExtractedOrganization, Identifier, Identity, Organization, Text};
use proptest::prelude::*;

fn organization(id: usize, labels: &[String]) -> ExtractedOrganization {
    let key = format!("org-{id}");
    ExtractedOrganization::new(
        Identity {
            identifier: Identifier::from_seed(&format!("{key}:identifier")),
            had_primary_source: Identifier::from_seed("registry"),
            identifier_in_primary_source: key.clone(),
            stable_target_id: Identifier::from_seed(&key),
        },
        Organization {
            official_name: labels.iter().map(Text::plain).collect(),
            ..Organization::default()
        },
    )
}

fn labels(entity: &ExtractedOrganization) -> Vec<String> {
    entity
        .attributes
        .official_name
        .iter()
        .map(|text| text.value.clone())
        .collect()
}

proptest! {
    #[test]
    fn every_owner_is_kept_in_processing_order(
        declared in prop::collection::vec(
            prop::collection::vec(prop::sample::select(vec!["RKI", "BfR", "PEI"]), 0..3),
            0..10,
        )
    ) {
        let organizations: Vec<ExtractedOrganization> = declared
            .iter()
            .enumerate()
            .map(|(id, labels)| {
                let labels: Vec<String> = labels.iter().map(|l| (*l).to_string()).collect();
                organization(id, &labels)
            })
            .collect();
        let index = build_index(&organizations, labels);

        for label in ["RKI", "BfR", "PEI"] {
            let expected: Vec<Identifier> = organizations
                .iter()
                .filter(|org| org.attributes.official_name.iter().any(|t| t.value == label))
                .map(|org| org.stable_target_id().clone())
                .collect();
            prop_assert_eq!(index.get(label), expected.as_slice());
        }
    }
}
