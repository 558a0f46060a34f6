use std::io::{self, BufRead, Write};

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::report::{CellValue, Report};
use crate::units::format_value;

/// Print `label`, read one line. EOF is an error so a closed stdin does not
/// silently produce an empty answer.
pub fn prompt_line<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
) -> io::Result<String> {
    write!(output, "{label}")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("no input for prompt {:?}", label.trim_end()),
        ));
    }
    Ok(line.trim().to_string())
}

/// Use `given` when present, otherwise ask on stdin.
pub fn value_or_prompt(given: Option<String>, label: &str) -> io::Result<String> {
    match given {
        Some(value) => Ok(value),
        None => {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            prompt_line(&mut input, &mut io::stdout(), label)
        }
    }
}

/// Comma-separated list, trimmed, blanks dropped.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn themed_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header_cells(labels: &[String]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| {
            Cell::new(label)
                .add_attribute(Attribute::Bold)
                .fg(Color::Cyan)
        })
        .collect()
}

fn value_cell(value: &CellValue) -> Cell {
    match value {
        CellValue::Text(text) => Cell::new(text),
        CellValue::Number(number) => {
            Cell::new(format_value(Some(*number))).set_alignment(CellAlignment::Right)
        }
        CellValue::Empty => Cell::new(format_value(None))
            .set_alignment(CellAlignment::Right)
            .fg(Color::DarkGrey),
    }
}

pub fn report_table(report: &Report) -> Table {
    let mut table = themed_table();
    table.set_header(header_cells(report.header()));
    for row in report.table() {
        table.add_row(row.iter().map(value_cell).collect::<Vec<_>>());
    }
    table
}

pub fn summary_table(report: &Report) -> Table {
    let mut table = themed_table();
    table.set_header(header_cells(&["Field".to_string(), "Value".to_string()]));
    let label = |text: &str| Cell::new(text).add_attribute(Attribute::Bold);
    table.add_row(vec![label("Report"), Cell::new(&report.title)]);
    table.add_row(vec![label("Start Date"), Cell::new(report.window.start_label())]);
    table.add_row(vec![label("End Date"), Cell::new(report.window.end_label())]);
    table.add_row(vec![
        label("Total Days"),
        Cell::new(report.window.total_days()).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        label("Hosts"),
        Cell::new(report.rows.len()).set_alignment(CellAlignment::Right),
    ]);
    table
}

pub fn item_fields_table(fields: &[String]) -> Table {
    let mut table = themed_table();
    table.set_header(header_cells(&["Field".to_string()]));
    for field in fields {
        table.add_row(vec![Cell::new(field)]);
    }
    table
}
