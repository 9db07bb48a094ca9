//! Step sequencing for one harvesting run.
//!
//! Every source system is one step with its own primary source:
//!
//! | Step | Records | Produces |
//! |------|---------|----------|
//! | `directory` | units, persons, organizations | organizational units, persons, organizations |
//! | `projects` | projects | activities (plus fallback organizations) |
//! | `laboratory` | samples | access platform, sample and disease resources |
//! | `survey` | variables | variable groups, variables |
//!
//! Later steps link against indexes built from earlier ones, so the order
//! is fixed. A step's entities reach the sink only after the step finishes.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use harvest_core::{
    FilterPolicy, HashingIdentityProvider, Sink, SinkError, build_index, extract_primary_source,
    filter,
};
use harvest_map::{MappingRepository, MappingSchema};
use harvest_model::{
    AnyExtractedEntity, EntityAttributes, EntityKind, Extracted, ExtractedPrimarySource, Mapping,
};
use harvest_transform::{
    ActivityReferences, OrganizationRecord, PersonRecord, ProjectRecord, ResourceReferences,
    SampleRecord, TransformContext, TransformReport, UnitRecord, VariableRecord,
    VariableReferences, keep_latest, organizations_by_name, persons_by_email, persons_by_name,
    resources_by_identifier, transform_access_platform, transform_activities,
    transform_disease_resources, transform_organizations, transform_persons,
    transform_sample_resources, transform_units, transform_variables, units_by_synonym,
};
use serde::de::DeserializeOwned;
use tracing::{debug, info, info_span};

use crate::types::{RunSummary, StepSummary};

pub const DIRECTORY: &str = "directory";
pub const PROJECTS: &str = "projects";
pub const LABORATORY: &str = "laboratory";
pub const SURVEY: &str = "survey";

pub const UNITS_FILE: &str = "units.json";
pub const PERSONS_FILE: &str = "persons.json";
pub const ORGANIZATIONS_FILE: &str = "organizations.json";
pub const PROJECTS_FILE: &str = "projects.json";
pub const SAMPLES_FILE: &str = "samples.json";
pub const VARIABLES_FILE: &str = "variables.json";

/// Raw records of every source, read from one directory.
#[derive(Debug, Default)]
pub struct SourceRecords {
    pub units: Vec<UnitRecord>,
    pub persons: Vec<PersonRecord>,
    pub organizations: Vec<OrganizationRecord>,
    pub projects: Vec<ProjectRecord>,
    pub samples: Vec<SampleRecord>,
    pub variables: Vec<VariableRecord>,
}

impl SourceRecords {
    /// Read every record file under `dir`. A missing file means no records.
    pub fn read(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            bail!("records directory {} does not exist", dir.display());
        }
        Ok(Self {
            units: read_records(dir, UNITS_FILE)?,
            persons: read_records(dir, PERSONS_FILE)?,
            organizations: read_records(dir, ORGANIZATIONS_FILE)?,
            projects: read_records(dir, PROJECTS_FILE)?,
            samples: read_records(dir, SAMPLES_FILE)?,
            variables: read_records(dir, VARIABLES_FILE)?,
        })
    }
}

fn read_records<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<Vec<T>> {
    let path = dir.join(file);
    if !path.is_file() {
        debug!(path = %path.display(), "no record file");
        return Ok(Vec::new());
    }
    let contents = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let records: Vec<T> = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    debug!(path = %path.display(), count = records.len(), "read records");
    Ok(records)
}

/// The mappings a run uses. A missing mapping file is an empty mapping.
#[derive(Debug, Default)]
pub struct Mappings {
    pub activity: Mapping,
    pub resource: Mapping,
    pub resource_disease: Mapping,
    pub access_platform: Mapping,
    pub variable_group: Mapping,
    pub variable: Mapping,
}

impl Mappings {
    pub fn load(repository: &MappingRepository) -> Result<Self> {
        let load = |name: &str, kind: EntityKind| -> Result<Mapping> {
            let schema = MappingSchema::for_kind(kind);
            let mapping = repository
                .load_optional(name, &schema)
                .with_context(|| format!("failed to load mapping `{name}`"))?;
            if mapping.is_none() {
                debug!(
                    mapping = name,
                    dir = %repository.base_dir().display(),
                    "mapping not found, using none"
                );
            }
            Ok(mapping.unwrap_or_default())
        };
        Ok(Self {
            activity: load("activity", EntityKind::Activity)?,
            resource: load("resource", EntityKind::Resource)?,
            resource_disease: load("resource_disease", EntityKind::Resource)?,
            access_platform: load("access_platform", EntityKind::AccessPlatform)?,
            variable_group: load("variable_group", EntityKind::VariableGroup)?,
            variable: load("variable", EntityKind::Variable)?,
        })
    }
}

/// Counts entities per kind on their way to the wrapped sink.
struct CountingSink<'s, S: ?Sized> {
    inner: &'s mut S,
    counts: BTreeMap<EntityKind, usize>,
}

impl<'s, S: Sink + ?Sized> CountingSink<'s, S> {
    fn new(inner: &'s mut S) -> Self {
        Self {
            inner,
            counts: BTreeMap::new(),
        }
    }
}

impl<S: Sink + ?Sized> Sink for CountingSink<'_, S> {
    fn load(&mut self, entities: Vec<AnyExtractedEntity>) -> Result<(), SinkError> {
        let kinds: Vec<EntityKind> = entities.iter().map(AnyExtractedEntity::kind).collect();
        self.inner.load(entities)?;
        for kind in kinds {
            *self.counts.entry(kind).or_default() += 1;
        }
        Ok(())
    }
}

fn emit<S, T>(sink: &mut S, entities: &[Extracted<T>]) -> Result<()>
where
    S: Sink + ?Sized,
    T: EntityAttributes,
    Extracted<T>: Into<AnyExtractedEntity>,
{
    if entities.is_empty() {
        return Ok(());
    }
    let batch = entities.iter().cloned().map(Into::into).collect();
    sink.load(batch)
        .with_context(|| format!("failed to write {} entities", T::KIND))
}

fn register<S: Sink + ?Sized>(
    provider: &mut HashingIdentityProvider,
    sink: &mut S,
    name: &str,
) -> Result<ExtractedPrimarySource> {
    let source = extract_primary_source(provider, name);
    sink.load_one(source.clone().into())
        .with_context(|| format!("failed to write primary source `{name}`"))?;
    Ok(source)
}

fn finish_step(
    summary: &mut RunSummary,
    name: &'static str,
    records: usize,
    report: TransformReport,
) {
    info!(
        step = name,
        records,
        produced = report.produced,
        skipped = report.skipped,
        fallbacks = report.fallbacks,
        "step complete"
    );
    summary.steps.push(StepSummary {
        name,
        records,
        produced: report.produced,
        skipped: report.skipped,
    });
    summary.report.merge(report);
}

/// Run every step against `sink`.
///
/// The returned summary has no output path; callers that write a file fill it in.
pub fn harvest<S: Sink + ?Sized>(
    records: &SourceRecords,
    mappings: &Mappings,
    policy: &FilterPolicy,
    sink: &mut S,
) -> Result<RunSummary> {
    let mut provider = HashingIdentityProvider::new();
    let mut sink = CountingSink::new(sink);
    let mut summary = RunSummary::default();

    // Directory: units, persons, organizations.
    let directory = register(&mut provider, &mut sink, DIRECTORY)?;
    let directory_span = info_span!("step", source = DIRECTORY);
    let (units, persons, organizations, report) = directory_span.in_scope(|| {
        let mut ctx = TransformContext::new(&directory, &mut provider, &mut sink);
        let organizations = transform_organizations(&records.organizations, &mut ctx);
        let units = transform_units(&records.units, None, &mut ctx);
        let unit_index = units_by_synonym(&units);
        let persons = transform_persons(&records.persons, &unit_index, &mut ctx);
        (units, persons, organizations, ctx.into_report())
    });
    emit(&mut sink, &organizations)?;
    emit(&mut sink, &units)?;
    emit(&mut sink, &persons)?;
    let directory_records =
        records.units.len() + records.persons.len() + records.organizations.len();
    finish_step(&mut summary, DIRECTORY, directory_records, report);

    let unit_index = units_by_synonym(&units);
    let persons_by_email = persons_by_email(&persons);
    let persons_by_name = persons_by_name(&persons);
    let mut organization_index = organizations_by_name(&organizations);

    // Projects: activities.
    let projects = register(&mut provider, &mut sink, PROJECTS)?;
    let projects_span = info_span!("step", source = PROJECTS);
    let (activities, report) = projects_span.in_scope(|| -> Result<_> {
        let mut kept = filter(&records.projects, policy, projects.stable_target_id());
        let selected: Vec<&ProjectRecord> = kept.by_ref().collect();
        summary
            .filtered
            .insert(EntityKind::Activity, kept.dropped());
        let mut ctx = TransformContext::new(&projects, &mut provider, &mut sink);
        let activities = transform_activities(
            selected,
            &mappings.activity,
            ActivityReferences {
                units: &unit_index,
                persons_by_name: &persons_by_name,
                organizations: &mut organization_index,
            },
            &mut ctx,
        )?;
        Ok((activities, ctx.into_report()))
    })?;
    emit(&mut sink, &activities)?;
    finish_step(&mut summary, PROJECTS, records.projects.len(), report);

    let activities_by_number = build_index(&activities, |activity| {
        [activity.identifier_in_primary_source().to_string()]
    });

    // Laboratory: access platform, samples, diseases.
    let laboratory = register(&mut provider, &mut sink, LABORATORY)?;
    let laboratory_span = info_span!("step", source = LABORATORY);
    let (platform, samples, diseases, report) = laboratory_span.in_scope(|| {
        // Superseded versions go first so a filtered latest version is not
        // replaced by an older one.
        let latest = keep_latest(records.samples.iter().cloned());
        let mut kept = filter(latest, policy, laboratory.stable_target_id());
        let selected: Vec<SampleRecord> = kept.by_ref().collect();
        summary
            .filtered
            .insert(EntityKind::Resource, kept.dropped());
        let mut ctx = TransformContext::new(&laboratory, &mut provider, &mut sink);
        // No mapping file means no platform, not a skipped one.
        let platform = if mappings.access_platform.rule_count() == 0 {
            None
        } else {
            transform_access_platform(
                &mappings.access_platform,
                &unit_index,
                &persons_by_email,
                &mut ctx,
            )
        };
        let references = ResourceReferences {
            units: &unit_index,
            persons_by_email: &persons_by_email,
            activities: &activities_by_number,
            access_platform: platform.as_ref().map(Extracted::stable_target_id),
        };
        let samples =
            transform_sample_resources(selected, &mappings.resource, &references, &mut ctx);
        let diseases =
            transform_disease_resources(&mappings.resource_disease, &unit_index, None, &mut ctx);
        (platform, samples, diseases, ctx.into_report())
    });
    if let Some(platform) = &platform {
        emit(&mut sink, std::slice::from_ref(platform))?;
    }
    emit(&mut sink, &samples)?;
    emit(&mut sink, &diseases)?;
    finish_step(&mut summary, LABORATORY, records.samples.len(), report);

    // Survey: variable groups and variables, linked to sample resources.
    let resource_index = resources_by_identifier(&samples);
    let survey = register(&mut provider, &mut sink, SURVEY)?;
    let survey_span = info_span!("step", source = SURVEY);
    let (groups, variables, report) = survey_span.in_scope(|| {
        let mut ctx = TransformContext::new(&survey, &mut provider, &mut sink);
        let (groups, variables) = transform_variables(
            &records.variables,
            &VariableReferences {
                resources: &resource_index,
                group_mapping: &mappings.variable_group,
                variable_mapping: &mappings.variable,
            },
            &mut ctx,
        );
        (groups, variables, ctx.into_report())
    });
    emit(&mut sink, &groups)?;
    emit(&mut sink, &variables)?;
    finish_step(&mut summary, SURVEY, records.variables.len(), report);

    summary.emitted = sink.counts;
    Ok(summary)
}
