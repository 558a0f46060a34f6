//! Spreadsheet output: a metadata block, one blank row, then the report
//! table with its header.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use rust_xlsxwriter::Workbook;

use crate::catalog::ReportDefinition;
use crate::report::{CellValue, Report};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Xlsx,
    Csv,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
        }
    }
}

/// Fixed per-report file name, placed in `dir` when given.
pub fn default_output_path(
    definition: &ReportDefinition,
    format: OutputFormat,
    dir: Option<&Path>,
) -> PathBuf {
    let file_name = format!("{}.{}", definition.file_stem, format.extension());
    match dir {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Rows written before the table: label/value pairs and a blank separator.
pub fn metadata_rows(report: &Report) -> Vec<Vec<CellValue>> {
    vec![
        vec![
            CellValue::Text("Start Date".into()),
            CellValue::Text(report.window.start_label()),
        ],
        vec![
            CellValue::Text("End Date".into()),
            CellValue::Text(report.window.end_label()),
        ],
        vec![
            CellValue::Text("Total Days".into()),
            CellValue::Number(report.window.total_days() as f64),
        ],
        Vec::new(),
    ]
}

/// Every row of the sheet, top to bottom.
pub fn sheet_rows(report: &Report) -> Vec<Vec<CellValue>> {
    let mut rows = metadata_rows(report);
    rows.push(
        report
            .header()
            .iter()
            .map(|c| CellValue::Text(c.clone()))
            .collect(),
    );
    rows.extend(report.table());
    rows
}

pub trait ReportWriter {
    fn write(&self, report: &Report, path: &Path) -> Result<()>;
}

pub struct XlsxWriter;

impl ReportWriter for XlsxWriter {
    fn write(&self, report: &Report, path: &Path) -> Result<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&report.title)?;
        for (row_idx, row) in sheet_rows(report).iter().enumerate() {
            let row_num = u32::try_from(row_idx).context("too many rows for a worksheet")?;
            for (col_idx, cell) in row.iter().enumerate() {
                let col_num = u16::try_from(col_idx).context("too many columns for a worksheet")?;
                match cell {
                    CellValue::Text(text) => {
                        worksheet.write_string(row_num, col_num, text)?;
                    }
                    CellValue::Number(value) => {
                        worksheet.write_number(row_num, col_num, *value)?;
                    }
                    CellValue::Empty => {}
                }
            }
        }
        workbook
            .save(path)
            .with_context(|| format!("saving {}", path.display()))?;
        Ok(())
    }
}

pub struct CsvWriter;

fn csv_field(cell: &CellValue) -> String {
    match cell {
        CellValue::Text(text) => text.clone(),
        CellValue::Number(value) => value.to_string(),
        CellValue::Empty => String::new(),
    }
}

impl ReportWriter for CsvWriter {
    fn write(&self, report: &Report, path: &Path) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("creating {}", path.display()))?;
        for row in sheet_rows(report) {
            if row.is_empty() {
                // csv would quote a lone empty field; emit a bare newline.
                writer.flush()?;
                let mut file = writer.get_ref();
                file.write_all(b"\n")?;
            } else {
                writer.write_record(row.iter().map(csv_field))?;
            }
        }
        writer.flush()?;
        Ok(())
    }
}

pub fn writer_for(format: OutputFormat) -> Box<dyn ReportWriter> {
    match format {
        OutputFormat::Xlsx => Box::new(XlsxWriter),
        OutputFormat::Csv => Box::new(CsvWriter),
    }
}

pub fn export(report: &Report, format: OutputFormat, path: &Path) -> Result<()> {
    writer_for(format).write(report, path)
}
