//! Extracted entities: the unified output of every transformer.
//!
//! An entity is an [`Identity`] (who it is, and where it came from) plus a
//! kind-specific attribute struct. Attribute structs derive `Default` so
//! transformers can fill only what a source provides.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Concept, Identifier, Link, Temporal, Text};

/// The kinds of entity the pipeline produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    PrimarySource,
    Person,
    Organization,
    OrganizationalUnit,
    Activity,
    Resource,
    AccessPlatform,
    VariableGroup,
    Variable,
}

impl EntityKind {
    pub const ALL: [EntityKind; 9] = [
        EntityKind::PrimarySource,
        EntityKind::Person,
        EntityKind::Organization,
        EntityKind::OrganizationalUnit,
        EntityKind::Activity,
        EntityKind::Resource,
        EntityKind::AccessPlatform,
        EntityKind::VariableGroup,
        EntityKind::Variable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::PrimarySource => "ExtractedPrimarySource",
            EntityKind::Person => "ExtractedPerson",
            EntityKind::Organization => "ExtractedOrganization",
            EntityKind::OrganizationalUnit => "ExtractedOrganizationalUnit",
            EntityKind::Activity => "ExtractedActivity",
            EntityKind::Resource => "ExtractedResource",
            EntityKind::AccessPlatform => "ExtractedAccessPlatform",
            EntityKind::VariableGroup => "ExtractedVariableGroup",
            EntityKind::Variable => "ExtractedVariable",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of an extracted entity.
///
/// `(had_primary_source, identifier_in_primary_source)` is the natural key and
/// is unique within a run. `stable_target_id` is the merged identifier every
/// downstream reference uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub identifier: Identifier,
    pub had_primary_source: Identifier,
    pub identifier_in_primary_source: String,
    pub stable_target_id: Identifier,
}

impl Identity {
    pub fn natural_key(&self) -> (&Identifier, &str) {
        (&self.had_primary_source, &self.identifier_in_primary_source)
    }
}

/// Attribute payload of one entity kind.
pub trait EntityAttributes: Clone + fmt::Debug + Serialize {
    const KIND: EntityKind;
}

/// An identity together with its attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extracted<T> {
    #[serde(flatten)]
    pub identity: Identity,
    #[serde(flatten)]
    pub attributes: T,
}

impl<T: EntityAttributes> Extracted<T> {
    pub fn new(identity: Identity, attributes: T) -> Self {
        Self {
            identity,
            attributes,
        }
    }

    pub fn kind(&self) -> EntityKind {
        T::KIND
    }

    pub fn stable_target_id(&self) -> &Identifier {
        &self.identity.stable_target_id
    }

    pub fn identifier_in_primary_source(&self) -> &str {
        &self.identity.identifier_in_primary_source
    }

    pub fn had_primary_source(&self) -> &Identifier {
        &self.identity.had_primary_source
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimarySource {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub title: Vec<Text>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub email: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub full_name: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given_name: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub family_name: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub member_of: Vec<Identifier>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub official_name: Vec<Text>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternative_name: Vec<Text>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationalUnit {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<Text>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternative_name: Vec<Text>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub short_name: Vec<Text>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub email: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_unit: Option<Identifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unit_of: Vec<Identifier>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub title: Vec<Text>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub short_name: Vec<Text>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternative_title: Vec<Text>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub activity_type: Vec<Concept>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contact: Vec<Identifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub responsible_unit: Vec<Identifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub involved_person: Vec<Identifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub funder_or_commissioner: Vec<Identifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_associate: Vec<Identifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub start: Vec<Temporal>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub end: Vec<Temporal>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub theme: Vec<Concept>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub succeeds: Vec<Identifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub website: Vec<Link>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documentation: Vec<Link>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub title: Vec<Text>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternative_title: Vec<Text>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub description: Vec<Text>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keyword: Vec<Text>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contact: Vec<Identifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unit_in_charge: Vec<Identifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_restriction: Option<Concept>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub theme: Vec<Concept>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub spatial: Vec<Text>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub language: Vec<Concept>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<Temporal>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub is_part_of: Vec<Identifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub was_generated_by: Option<Identifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub publisher: Vec<Identifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documentation: Vec<Link>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource_type_general: Vec<Concept>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub access_platform: Vec<Identifier>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessPlatform {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub title: Vec<Text>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_accessibility: Option<Concept>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<Link>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub landing_page: Vec<Link>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contact: Vec<Identifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unit_in_charge: Vec<Identifier>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableGroup {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub label: Vec<Text>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contained_by: Vec<Identifier>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub label: Vec<Text>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub description: Vec<Text>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<Concept>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub value_set: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub belongs_to: Vec<Identifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub used_in: Vec<Identifier>,
}

pub type ExtractedPrimarySource = Extracted<PrimarySource>;
pub type ExtractedPerson = Extracted<Person>;
pub type ExtractedOrganization = Extracted<Organization>;
pub type ExtractedOrganizationalUnit = Extracted<OrganizationalUnit>;
pub type ExtractedActivity = Extracted<Activity>;
pub type ExtractedResource = Extracted<Resource>;
pub type ExtractedAccessPlatform = Extracted<AccessPlatform>;
pub type ExtractedVariableGroup = Extracted<VariableGroup>;
pub type ExtractedVariable = Extracted<Variable>;

macro_rules! any_entity {
    ($($variant:ident => $attrs:ident as $tag:literal),+ $(,)?) => {
        $(
            impl EntityAttributes for $attrs {
                const KIND: EntityKind = EntityKind::$variant;
            }

            impl From<Extracted<$attrs>> for AnyExtractedEntity {
                fn from(entity: Extracted<$attrs>) -> Self {
                    AnyExtractedEntity::$variant(entity)
                }
            }
        )+

        /// Any extracted entity, tagged with its kind for serialization.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "entityType")]
        pub enum AnyExtractedEntity {
            $(
                #[serde(rename = $tag)]
                $variant(Extracted<$attrs>),
            )+
        }

        impl AnyExtractedEntity {
            pub fn identity(&self) -> &Identity {
                match self {
                    $(AnyExtractedEntity::$variant(entity) => &entity.identity,)+
                }
            }

            pub fn kind(&self) -> EntityKind {
                match self {
                    $(AnyExtractedEntity::$variant(_) => EntityKind::$variant,)+
                }
            }
        }
    };
}

any_entity! {
    PrimarySource => PrimarySource as "ExtractedPrimarySource",
    Person => Person as "ExtractedPerson",
    Organization => Organization as "ExtractedOrganization",
    OrganizationalUnit => OrganizationalUnit as "ExtractedOrganizationalUnit",
    Activity => Activity as "ExtractedActivity",
    Resource => Resource as "ExtractedResource",
    AccessPlatform => AccessPlatform as "ExtractedAccessPlatform",
    VariableGroup => VariableGroup as "ExtractedVariableGroup",
    Variable => Variable as "ExtractedVariable",
}

impl AnyExtractedEntity {
    pub fn stable_target_id(&self) -> &Identifier {
        &self.identity().stable_target_id
    }
}
