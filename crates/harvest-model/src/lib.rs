pub mod entities;
pub mod error;
pub mod ids;
pub mod mapping;
pub mod temporal;
pub mod text;
pub mod vocabulary;

pub use entities::{
    AccessPlatform, Activity, AnyExtractedEntity, EntityAttributes, EntityKind, Extracted,
    ExtractedAccessPlatform, ExtractedActivity, ExtractedOrganization,
    ExtractedOrganizationalUnit, ExtractedPerson, ExtractedPrimarySource, ExtractedResource,
    ExtractedVariable, ExtractedVariableGroup, Identity, Organization, OrganizationalUnit, Person,
    PrimarySource, Resource, Variable, VariableGroup,
};
pub use error::{ModelError, Result};
pub use ids::Identifier;
pub use mapping::{Mapping, MappingRule, MappingRuleGroup, SetValue};
pub use temporal::Temporal;
pub use text::{Link, Text};
pub use vocabulary::{Concept, Language, scheme};

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(seed: &str) -> Identity {
        Identity {
            identifier: Identifier::from_seed(&format!("{seed}-extracted")),
            had_primary_source: Identifier::from_seed("source"),
            identifier_in_primary_source: seed.to_string(),
            stable_target_id: Identifier::from_seed(seed),
        }
    }

    #[test]
    fn any_entity_serializes_with_kind_tag() {
        let activity = Extracted::new(
            identity("P-1"),
            Activity {
                title: vec![Text::de("Surveillance")],
                ..Activity::default()
            },
        );
        let entity = AnyExtractedEntity::from(activity);
        assert_eq!(entity.kind(), EntityKind::Activity);

        let json = serde_json::to_value(&entity).expect("serialize entity");
        assert_eq!(json["entityType"], "ExtractedActivity");
        assert_eq!(json["identifierInPrimarySource"], "P-1");
        assert_eq!(json["title"][0]["language"], "de");
        assert!(json.get("contact").is_none());
    }

    #[test]
    fn any_entity_round_trips_through_json() {
        let unit = Extracted::new(
            identity("FG12"),
            OrganizationalUnit {
                short_name: vec![Text::plain("FG12")],
                parent_unit: Some(Identifier::from_seed("parent")),
                ..OrganizationalUnit::default()
            },
        );
        let entity = AnyExtractedEntity::from(unit);
        let json = serde_json::to_string(&entity).expect("serialize");
        let round: AnyExtractedEntity = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(round, entity);
    }
}
