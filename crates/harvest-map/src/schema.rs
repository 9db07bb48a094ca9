//! Target-field schemas that a mapping tree is coerced against.

use std::collections::BTreeSet;

use harvest_model::EntityKind;

const IDENTITY_FIELDS: &[&str] = &["hadPrimarySource", "identifierInPrimarySource"];

/// The target fields a mapping file may, and must, contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingSchema {
    name: String,
    required: BTreeSet<String>,
    allowed: Option<BTreeSet<String>>,
}

impl MappingSchema {
    /// A schema that accepts any target field.
    pub fn open(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: BTreeSet::new(),
            allowed: None,
        }
    }

    /// A schema restricted to the attribute fields of an entity kind.
    pub fn for_kind(kind: EntityKind) -> Self {
        let fields: &[&str] = match kind {
            EntityKind::PrimarySource => &["title"],
            EntityKind::Person => &["email", "fullName", "givenName", "familyName", "memberOf"],
            EntityKind::Organization => &["officialName", "alternativeName"],
            EntityKind::OrganizationalUnit => &[
                "name",
                "alternativeName",
                "shortName",
                "email",
                "parentUnit",
                "unitOf",
            ],
            EntityKind::Activity => &[
                "title",
                "shortName",
                "alternativeTitle",
                "activityType",
                "contact",
                "responsibleUnit",
                "involvedPerson",
                "fundingProgram",
                "funderOrCommissioner",
                "externalAssociate",
                "start",
                "end",
                "theme",
                "succeeds",
                "website",
                "documentation",
            ],
            EntityKind::Resource => &[
                "title",
                "alternativeTitle",
                "description",
                "keyword",
                "contact",
                "unitInCharge",
                "accessRestriction",
                "theme",
                "spatial",
                "language",
                "created",
                "isPartOf",
                "wasGeneratedBy",
                "publisher",
                "documentation",
                "resourceTypeGeneral",
                "accessPlatform",
            ],
            EntityKind::AccessPlatform => &[
                "title",
                "technicalAccessibility",
                "endpointUrl",
                "landingPage",
                "contact",
                "unitInCharge",
            ],
            EntityKind::VariableGroup => &["label", "containedBy"],
            EntityKind::Variable => &[
                "label",
                "description",
                "dataType",
                "valueSet",
                "belongsTo",
                "usedIn",
            ],
        };
        let allowed = fields
            .iter()
            .chain(IDENTITY_FIELDS)
            .map(|field| (*field).to_string())
            .collect();
        Self {
            name: kind.as_str().to_string(),
            required: BTreeSet::new(),
            allowed: Some(allowed),
        }
    }

    /// Mark fields as required. Required fields are also allowed.
    #[must_use]
    pub fn require<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            let field = field.into();
            if let Some(allowed) = self.allowed.as_mut() {
                allowed.insert(field.clone());
            }
            self.required.insert(field);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_required(&self, field: &str) -> bool {
        self.required.contains(field)
    }

    pub fn is_allowed(&self, field: &str) -> bool {
        self.allowed
            .as_ref()
            .is_none_or(|allowed| allowed.contains(field))
    }

    pub fn required(&self) -> impl Iterator<Item = &str> {
        self.required.iter().map(String::as_str)
    }
}
