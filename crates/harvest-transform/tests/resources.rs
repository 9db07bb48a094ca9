use harvest_core::{
    CrossReferenceIndex, HashingIdentityProvider, MemorySink, extract_primary_source,
};
use harvest_model::{ExtractedPerson, ExtractedPrimarySource, Mapping, Temporal, Text};
use harvest_transform::{
    IssueKind, PersonRecord, ResourceReferences, SampleRecord, TransformContext, UnitRecord,
    VariableRecord, VariableReferences, persons_by_email, resources_by_identifier,
    transform_access_platform, transform_disease_resources, transform_persons,
    transform_sample_resources, transform_units, transform_variables, units_by_synonym,
};

struct Fixture {
    provider: HashingIdentityProvider,
    sink: MemorySink,
    source: ExtractedPrimarySource,
    units: CrossReferenceIndex,
    persons: Vec<ExtractedPerson>,
}

impl Fixture {
    fn new() -> Self {
        let mut provider = HashingIdentityProvider::new();
        let mut sink = MemorySink::new();
        let directory = extract_primary_source(&mut provider, "directory");
        let (units, persons) = {
            let mut ctx = TransformContext::new(&directory, &mut provider, &mut sink);
            let units = transform_units(
                &[UnitRecord {
                    id: "u-12".into(),
                    short_name: "FG12".into(),
                    ..UnitRecord::default()
                }],
                None,
                &mut ctx,
            );
            let persons = transform_persons(
                &[PersonRecord {
                    account: "jdoe".into(),
                    email: vec!["Jane.Doe@example.org".into()],
                    display_name: Some("Jane Doe".into()),
                    ..PersonRecord::default()
                }],
                &units_by_synonym(&units),
                &mut ctx,
            );
            (units_by_synonym(&units), persons)
        };
        let source = extract_primary_source(&mut provider, "laboratory");
        Self {
            provider,
            sink,
            source,
            units,
            persons,
        }
    }

    fn context(&mut self) -> TransformContext<'_> {
        TransformContext::new(&self.source, &mut self.provider, &mut self.sink)
    }
}

fn sample(date: &str, title: &str) -> SampleRecord {
    SampleRecord {
        sample_id: "S1".into(),
        platform: "PLATFORM-X".into(),
        version_date: date.into(),
        run_id: 1,
        title: title.into(),
        unit: "FG12".into(),
        contact_email: vec!["jane.doe@EXAMPLE.org".into()],
        ..SampleRecord::default()
    }
}

const RESOURCE_MAPPING: &str = r#"
accessRestriction:
  - mappingRules:
      - setValues: ["access-restriction/restricted"]
resourceTypeGeneral:
  - mappingRules:
      - setValues: ["resource-type-general/data-set"]
"#;

#[test]
fn only_latest_sample_version_becomes_a_resource() {
    let mut fixture = Fixture::new();
    let persons_by_email = persons_by_email(&fixture.persons);
    let units = fixture.units.clone();
    let mapping: Mapping = serde_yaml::from_str(RESOURCE_MAPPING).expect("mapping");
    let activities = CrossReferenceIndex::new();
    let references = ResourceReferences {
        units: &units,
        persons_by_email: &persons_by_email,
        activities: &activities,
        access_platform: None,
    };

    let mut ctx = fixture.context();
    let resources = transform_sample_resources(
        vec![sample("2023-01-01", "old"), sample("2023-06-15", "new")],
        &mapping,
        &references,
        &mut ctx,
    );

    assert_eq!(resources.len(), 1);
    let resource = &resources[0];
    assert_eq!(resource.identifier_in_primary_source(), "S1.PLATFORM-X");
    assert_eq!(resource.attributes.title, vec![Text::de("new")]);
    assert_eq!(
        resource.attributes.created,
        Temporal::parse("2023-06-15").ok()
    );
    assert_eq!(resource.attributes.contact, persons_by_email.get("jane.doe@example.org"));
    assert_eq!(
        resource.attributes.access_restriction.as_ref().map(|c| c.as_str()),
        Some("access-restriction/restricted")
    );
    assert_eq!(resource.attributes.was_generated_by, None);
}

#[test]
fn sample_with_unknown_unit_is_skipped() {
    let mut fixture = Fixture::new();
    let units = fixture.units.clone();
    let empty = CrossReferenceIndex::new();
    let references = ResourceReferences {
        units: &units,
        persons_by_email: &empty,
        activities: &empty,
        access_platform: None,
    };
    let mut orphan = sample("2023-01-01", "orphan");
    orphan.unit = "FG99".into();

    let mut ctx = fixture.context();
    let resources =
        transform_sample_resources(vec![orphan], &Mapping::default(), &references, &mut ctx);
    assert!(resources.is_empty());
    let report = ctx.into_report();
    assert_eq!(report.count(IssueKind::UnresolvedRequiredReference), 1);
    assert_eq!(report.issues[0].record, "S1.PLATFORM-X");
    assert_eq!(report.issues[0].dependency, "unitInCharge");
}

const DISEASE_MAPPING: &str = r#"
title:
  - fieldInPrimarySource: Krankheit
    mappingRules:
      - forValues: ["COVID"]
        setValues: [{value: COVID-19, language: de}]
      - forValues: ["MASERN"]
        setValues: [{value: Masern, language: de}]
alternativeTitle:
  - mappingRules:
      - forValues: ["COVID"]
        setValues: [{value: SARS-CoV-2, language: en}]
documentation:
  - mappingRules:
      - forValues: ["MASERN"]
        setValues: [{url: "https://example.org/masern", title: Steckbrief}]
unitInCharge:
  - mappingRules:
      - setValues: ["FG12"]
"#;

#[test]
fn disease_fan_out_tolerates_missing_siblings() {
    let mut fixture = Fixture::new();
    let units = fixture.units.clone();
    let mapping: Mapping = serde_yaml::from_str(DISEASE_MAPPING).expect("mapping");
    let mut ctx = fixture.context();
    let resources = transform_disease_resources(&mapping, &units, None, &mut ctx);

    let keys: Vec<&str> = resources
        .iter()
        .map(|resource| resource.identifier_in_primary_source())
        .collect();
    assert_eq!(keys, vec!["disease-COVID", "disease-MASERN"]);

    let covid = &resources[0].attributes;
    assert_eq!(covid.title, vec![Text::de("COVID-19")]);
    assert_eq!(covid.alternative_title, vec![Text::en("SARS-CoV-2")]);
    assert!(covid.documentation.is_empty());

    let measles = &resources[1].attributes;
    assert!(measles.alternative_title.is_empty());
    assert_eq!(measles.documentation[0].url, "https://example.org/masern");
    assert_eq!(measles.unit_in_charge, units.get("fg12"));
}

const PLATFORM_MAPPING: &str = r#"
identifierInPrimarySource:
  - mappingRules:
      - setValues: ["lab-portal"]
title:
  - mappingRules:
      - setValues: [{value: Laborportal, language: de}]
technicalAccessibility:
  - mappingRules:
      - setValues: ["technical-accessibility/internal"]
endpointUrl:
  - mappingRules:
      - setValues: [{url: "https://lab.example.org/api"}]
contact:
  - mappingRules:
      - setValues: ["JANE.DOE@example.org", "nobody@example.org"]
unitInCharge:
  - mappingRules:
      - setValues: ["FG12"]
"#;

#[test]
fn access_platform_from_defaults() {
    let mut fixture = Fixture::new();
    let units = fixture.units.clone();
    let persons_by_email = persons_by_email(&fixture.persons);
    let mapping: Mapping = serde_yaml::from_str(PLATFORM_MAPPING).expect("mapping");
    let mut ctx = fixture.context();

    let platform = transform_access_platform(&mapping, &units, &persons_by_email, &mut ctx)
        .expect("platform is built");
    assert_eq!(platform.identifier_in_primary_source(), "lab-portal");
    assert_eq!(platform.attributes.title, vec![Text::de("Laborportal")]);
    assert_eq!(platform.attributes.contact.len(), 1);
    assert_eq!(
        platform.attributes.endpoint_url.as_ref().map(|link| link.url.as_str()),
        Some("https://lab.example.org/api")
    );
    assert_eq!(
        platform.attributes.technical_accessibility.as_ref().map(|c| c.as_str()),
        Some("technical-accessibility/internal")
    );
}

#[test]
fn variables_are_bucketed_into_groups() {
    let mut fixture = Fixture::new();
    let units = fixture.units.clone();
    let mapping: Mapping = serde_yaml::from_str(RESOURCE_MAPPING).expect("mapping");
    let empty = CrossReferenceIndex::new();
    let mut study = sample("2023-01-01", "Studie");
    study.sample_id = "STUDY1".into();

    let mut ctx = fixture.context();
    let resources = transform_sample_resources(
        vec![study],
        &mapping,
        &ResourceReferences {
            units: &units,
            persons_by_email: &empty,
            activities: &empty,
            access_platform: None,
        },
        &mut ctx,
    );
    let study_key = resources[0].identifier_in_primary_source().to_string();
    let resource_index = resources_by_identifier(&resources);

    let group_mapping: Mapping = serde_yaml::from_str(
        r#"
label:
  - mappingRules:
      - forValues: ["demo"]
        setValues: [{value: Soziodemographie, language: de}]
"#,
    )
    .expect("group mapping");
    let variable_mapping: Mapping = serde_yaml::from_str(
        r#"
dataType:
  - mappingRules:
      - forValues: ["int"]
        setValues: ["data-type/integer"]
"#,
    )
    .expect("variable mapping");

    let variable = |study_id: &str, variable_id: &str, group_id: &str, values: &[&str]| {
        VariableRecord {
            study_id: study_id.into(),
            variable_id: variable_id.into(),
            group_id: group_id.into(),
            label: variable_id.to_uppercase(),
            data_type: Some("int".into()),
            values: values.iter().map(|value| (*value).to_string()).collect(),
            ..VariableRecord::default()
        }
    };
    let records = [
        variable(&study_key, "age", "demo", &["2", "1", "2"]),
        variable(&study_key, "q1", "health", &[]),
        variable(&study_key, "sex", "demo", &[]),
        variable("UNKNOWN", "x", "demo", &[]),
    ];
    let (groups, variables) = transform_variables(
        &records,
        &VariableReferences {
            resources: &resource_index,
            group_mapping: &group_mapping,
            variable_mapping: &variable_mapping,
        },
        &mut ctx,
    );

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].attributes.label, vec![Text::de("Soziodemographie")]);
    assert_eq!(groups[1].attributes.label, vec![Text::plain("health")]);
    assert_eq!(
        groups[0].identifier_in_primary_source(),
        harvest_transform::composite_key([study_key.as_str(), "demo"])
    );

    assert_eq!(variables.len(), 3);
    let age = &variables[0];
    assert_eq!(age.attributes.value_set, vec!["1", "2"]);
    assert_eq!(age.attributes.belongs_to, vec![groups[0].stable_target_id().clone()]);
    assert_eq!(
        age.attributes.data_type.as_ref().map(|c| c.as_str()),
        Some("data-type/integer")
    );
    assert_eq!(
        variables[1].identifier_in_primary_source(),
        harvest_transform::composite_key([study_key.as_str(), "sex"])
    );
    assert_eq!(variables[1].attributes.belongs_to, age.attributes.belongs_to);
    assert_ne!(variables[2].attributes.belongs_to, age.attributes.belongs_to);

    let report = ctx.into_report();
    assert_eq!(report.skipped, 2);
}
