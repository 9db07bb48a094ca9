use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use harvest_cli::types::RunSummary;
use harvest_model::EntityKind;
use harvest_transform::{Issue, IssueKind};

pub fn print_summary(summary: &RunSummary) {
    match &summary.output {
        Some(path) => println!("Output: {}", path.display()),
        None => println!("Output: (dry run, nothing written)"),
    }
    for step in &summary.steps {
        println!(
            "Step {}: {} records, {} entities, {} skipped",
            step.name, step.records, step.produced, step.skipped
        );
    }
    println!("{}", summary_table(summary));
    if let Some(table) = issue_table(&summary.report.issues) {
        println!();
        println!("Issues:");
        println!("{table}");
    }
}

/// Per-kind emitted and filtered counts with a total row.
pub fn summary_table(summary: &RunSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Entity"),
        header_cell("Emitted"),
        header_cell("Filtered"),
        header_cell("Skipped"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for kind in EntityKind::ALL {
        let emitted = summary.emitted.get(&kind).copied().unwrap_or_default();
        let filtered = summary.filtered.get(&kind).copied().unwrap_or_default();
        let skipped = skipped_for(summary, kind);
        if emitted == 0 && filtered == 0 && skipped == 0 {
            continue;
        }
        table.add_row(vec![
            kind_cell(kind),
            Cell::new(emitted),
            count_cell(filtered, Color::Yellow),
            count_cell(skipped, Color::Red),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(summary.total_emitted()).add_attribute(Attribute::Bold),
        count_cell(summary.total_filtered(), Color::Yellow).add_attribute(Attribute::Bold),
        count_cell(summary.report.skipped, Color::Red).add_attribute(Attribute::Bold),
    ]);
    table
}

/// Issues ordered by target kind, then issue kind, then record. `None` when clean.
pub fn issue_table(issues: &[Issue]) -> Option<Table> {
    if issues.is_empty() {
        return None;
    }
    let mut ordered: Vec<&Issue> = issues.iter().collect();
    ordered.sort_by(|a, b| {
        a.target
            .cmp(&b.target)
            .then_with(|| a.kind.as_str().cmp(b.kind.as_str()))
            .then_with(|| a.record.cmp(&b.record))
    });
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Entity"),
        header_cell("Issue"),
        header_cell("Record"),
        header_cell("Field"),
        header_cell("Message"),
    ]);
    apply_issue_table_style(&mut table);
    for issue in ordered {
        table.add_row(vec![
            kind_cell(issue.target),
            issue_kind_cell(issue.kind),
            Cell::new(&issue.record),
            Cell::new(&issue.dependency),
            Cell::new(&issue.message),
        ]);
    }
    Some(table)
}

fn skipped_for(summary: &RunSummary, kind: EntityKind) -> usize {
    summary
        .report
        .issues
        .iter()
        .filter(|issue| {
            issue.kind == IssueKind::UnresolvedRequiredReference && issue.target == kind
        })
        .count()
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        Cell::new(count).fg(Color::DarkGrey)
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
    table.set_constraints(vec![
        ColumnConstraint::UpperBoundary(Width::Fixed(28)),
        ColumnConstraint::UpperBoundary(Width::Fixed(30)),
        ColumnConstraint::UpperBoundary(Width::Percentage(25)),
        ColumnConstraint::UpperBoundary(Width::Fixed(20)),
        ColumnConstraint::UpperBoundary(Width::Percentage(40)),
    ]);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn issue_kind_cell(kind: IssueKind) -> Cell {
    match kind {
        IssueKind::UnresolvedRequiredReference => Cell::new(kind.as_str()).fg(Color::Red),
        IssueKind::UnresolvedOptionalReference | IssueKind::AmbiguousReference => {
            Cell::new(kind.as_str()).fg(Color::Yellow)
        }
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn kind_cell(kind: EntityKind) -> Cell {
    Cell::new(kind.as_str())
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}
