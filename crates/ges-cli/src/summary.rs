use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use ges_core::{SkipReason, StreamStats};

use crate::types::RunResult;

pub fn print_summary(result: &RunResult) {
    println!("Output: {}", result.output_dir.display());
    if result.dry_run {
        println!("Dry run: no files written");
    }
    print_input_table(result);
    print_stream_table(result);
    print_skip_table(result);
    print_population_table(result);
    if !result.files.is_empty() {
        println!();
        println!("Files:");
        for path in &result.files {
            println!("  {}", path.display());
        }
    }
}

fn print_input_table(result: &RunResult) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Input"), header_cell("File"), header_cell("Rows")]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for input in &result.inputs {
        table.add_row(vec![
            Cell::new(input.table)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(input.path.display()),
            Cell::new(input.rows),
        ]);
    }
    println!("{table}");
}

fn print_stream_table(result: &RunResult) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Stream"),
        header_cell("Read"),
        header_cell("Classified"),
        header_cell("Review"),
        header_cell("No date"),
        header_cell("Skipped"),
        header_cell("Duplicates"),
        header_cell("Emitted"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..8 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    let streams = [
        ("Visits", &result.stats.visits),
        ("Medications", &result.stats.medications),
    ];
    for (label, stats) in streams {
        table.add_row(stream_row(label, stats));
    }
    println!("{table}");
}

fn stream_row(label: &str, stats: &StreamStats) -> Vec<Cell> {
    vec![
        Cell::new(label)
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold),
        Cell::new(stats.rows_read),
        Cell::new(stats.classified),
        count_cell(stats.routed_to_review, Color::Yellow),
        count_cell(stats.missing_date, Color::Yellow),
        count_cell(stats.skipped_total(), Color::DarkYellow),
        count_cell(stats.duplicates_removed, Color::DarkCyan),
        Cell::new(stats.emitted)
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
    ]
}

fn print_skip_table(result: &RunResult) {
    let visits = &result.stats.visits.skipped;
    let medications = &result.stats.medications.skipped;
    if visits.is_empty() && medications.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Skip reason"),
        header_cell("Visits"),
        header_cell("Medications"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for reason in SkipReason::ALL {
        let in_visits = visits.get(&reason).copied().unwrap_or(0);
        let in_medications = medications.get(&reason).copied().unwrap_or(0);
        if in_visits == 0 && in_medications == 0 {
            continue;
        }
        table.add_row(vec![
            Cell::new(reason.as_str()),
            count_cell(in_visits, Color::DarkYellow),
            count_cell(in_medications, Color::DarkYellow),
        ]);
    }
    println!();
    println!("Skipped rows:");
    println!("{table}");
}

fn print_population_table(result: &RunResult) {
    let report = &result.stats.population;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Population"), header_cell("Count")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (condition, members) in &report.by_condition {
        table.add_row(vec![Cell::new(condition), Cell::new(*members)]);
    }
    table.add_row(vec![
        Cell::new("Members")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(report.members).add_attribute(Attribute::Bold),
    ]);
    let checks = [
        ("Duplicate identifiers", report.duplicates),
        ("Invalid identifiers", report.invalid_identifiers),
        ("Unknown condition labels", report.unknown_labels),
        ("Severity defaults", report.severity_defaults),
        ("Progression unresolved", report.progression_unresolved),
    ];
    for (label, count) in checks {
        table.add_row(vec![dim_cell(label), count_cell(count, Color::Yellow)]);
    }
    println!();
    println!("{table}");
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
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
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
