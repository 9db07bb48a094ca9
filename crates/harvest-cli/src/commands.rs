use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{Cell, CellAlignment, Table};
use harvest_cli::pipeline::{Mappings, SourceRecords, harvest};
use harvest_cli::types::RunSummary;
use harvest_core::{MemorySink, NdjsonSink, Settings};
use harvest_map::MappingRepository;
use tracing::{debug, info, info_span};

use crate::cli::{RunArgs, SettingsArgs};

/// Settings from `--config` (or the default), with command-line overrides applied.
pub fn resolve_settings(args: &SettingsArgs) -> Result<Settings> {
    let settings = match &args.config {
        Some(path) => {
            let base = path.parent().unwrap_or_else(|| Path::new(""));
            Settings::load(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?
                .relative_to(base)
        }
        None => {
            debug!("no settings file given, using defaults");
            Settings::default()
        }
    };
    Ok(apply_overrides(settings, args))
}

fn apply_overrides(mut settings: Settings, args: &SettingsArgs) -> Settings {
    if let Some(dir) = &args.mapping_dir {
        settings.mapping_dir.clone_from(dir);
    }
    settings
}

pub fn run_harvest(args: &RunArgs) -> Result<RunSummary> {
    let mut settings = resolve_settings(&args.settings)?;
    if let Some(dir) = &args.records_dir {
        settings.records_dir.clone_from(dir);
    }
    if let Some(path) = &args.output {
        settings.output.clone_from(path);
    }

    let run_span = info_span!("run", records_dir = %settings.records_dir.display());
    let _run_guard = run_span.enter();

    let repository = MappingRepository::new(&settings.mapping_dir);
    let mappings = Mappings::load(&repository)?;
    let records = SourceRecords::read(&settings.records_dir)?;

    if args.dry_run {
        let mut sink = MemorySink::new();
        let summary = harvest(&records, &mappings, &settings.filter, &mut sink)?;
        info!(entities = sink.len(), "dry run complete");
        return Ok(summary);
    }

    let mut sink = NdjsonSink::create(&settings.output)
        .with_context(|| format!("failed to create {}", settings.output.display()))?;
    let mut summary = harvest(&records, &mappings, &settings.filter, &mut sink)?;
    sink.finish()
        .with_context(|| format!("failed to flush {}", settings.output.display()))?;
    info!(
        output = %settings.output.display(),
        entities = summary.total_emitted(),
        "run complete"
    );
    summary.output = Some(settings.output);
    Ok(summary)
}

pub fn run_mappings(args: &SettingsArgs) -> Result<()> {
    let settings = resolve_settings(args)?;
    let repository = MappingRepository::new(&settings.mapping_dir);
    let mappings = repository.load_all().with_context(|| {
        format!(
            "failed to load mappings from {}",
            settings.mapping_dir.display()
        )
    })?;

    let mut table = Table::new();
    table.set_header(vec!["Mapping", "Fields", "Rules"]);
    crate::summary::apply_table_style(&mut table);
    for (name, mapping) in &mappings {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(mapping.field_names().count()).set_alignment(CellAlignment::Right),
            Cell::new(mapping.rule_count()).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("Mappings in {}:", settings.mapping_dir.display());
    println!("{table}");
    Ok(())
}
