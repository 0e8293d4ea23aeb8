use super::{
    SheetFormat, ACTION_REQUIRED_COLUMN, CHECKED_AT_COLUMN, LAST_UPDATE_COLUMN, STATUS_COLUMN,
};
use crate::domain::model::{TrackingRecord, TrackingSheet};
use crate::utils::error::{Result, TrackerError};
use chrono::SecondsFormat;
use rust_xlsxwriter::{Format, Workbook};

const WORKSHEET_NAME: &str = "Tracking";

/// Serialises the sheet for `path`'s format: the original columns in their
/// original order, then the managed columns.
pub fn render_sheet(path: &str, sheet: &TrackingSheet, include_details: bool) -> Result<Vec<u8>> {
    let (header, rows) = layout(sheet, include_details);

    match SheetFormat::for_output(path)? {
        SheetFormat::Delimited(delimiter) => render_delimited(delimiter, &header, &rows),
        SheetFormat::Workbook => render_xlsx(&header, &rows),
    }
}

fn managed_columns(include_details: bool) -> Vec<&'static str> {
    let mut columns = Vec::with_capacity(4);
    if include_details {
        columns.push(LAST_UPDATE_COLUMN);
        columns.push(ACTION_REQUIRED_COLUMN);
    }
    columns.push(STATUS_COLUMN);
    columns.push(CHECKED_AT_COLUMN);
    columns
}

/// Builds the header and cell text for every record.
///
/// Managed columns already present in the input (a previous run's output) are
/// dropped from the original columns and written fresh at the end.
fn layout(sheet: &TrackingSheet, include_details: bool) -> (Vec<String>, Vec<Vec<String>>) {
    let managed = managed_columns(include_details);
    let original: Vec<&String> = sheet
        .headers
        .iter()
        .filter(|header| **header == sheet.tracking_column || !managed.contains(&header.as_str()))
        .collect();

    let header = original
        .iter()
        .map(|header| header.to_string())
        .chain(managed.iter().map(|column| column.to_string()))
        .collect();

    let rows = sheet
        .records
        .iter()
        .map(|record| {
            let mut row: Vec<String> = original
                .iter()
                .map(|header| record.value(header).to_string())
                .collect();
            if include_details {
                row.push(record.event_date.clone().unwrap_or_default());
                row.push(record.action_required.clone().unwrap_or_default());
            }
            row.push(record.status.clone().unwrap_or_default());
            row.push(checked_at_text(record));
            row
        })
        .collect();

    (header, rows)
}

fn checked_at_text(record: &TrackingRecord) -> String {
    record
        .checked_at
        .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

fn render_delimited(delimiter: u8, header: &[String], rows: &[Vec<String>]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| TrackerError::IoError(e.into_error()))
}

fn render_xlsx(header: &[String], rows: &[Vec<String>]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(WORKSHEET_NAME)?;

    let bold = Format::new().set_bold();
    for (col, name) in header.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name, &bold)?;
    }

    for (row_idx, row) in rows.iter().enumerate() {
        let excel_row = (row_idx + 1) as u32;
        for (col, value) in row.iter().enumerate() {
            // Empty cells stay blank so status columns read back as empty.
            if !value.is_empty() {
                worksheet.write_string(excel_row, col as u16, value)?;
            }
        }
    }

    worksheet.autofit();
    Ok(workbook.save_to_buffer()?)
}
