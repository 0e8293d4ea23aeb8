use super::{SheetFormat, TRACKING_COLUMN_CANDIDATES};
use crate::domain::model::{TrackingRecord, TrackingSheet};
use crate::utils::error::{Result, TrackerError};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{NaiveDateTime, NaiveTime};
use std::collections::{HashMap, HashSet};
use std::io::Cursor;

struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Parses spreadsheet bytes into records, keeping every row and column in order.
///
/// `path` only decides the format and labels errors; the bytes come from storage.
pub fn read_sheet(path: &str, data: &[u8], tracking_column: Option<&str>) -> Result<TrackingSheet> {
    let table = match SheetFormat::for_input(path)? {
        SheetFormat::Delimited(delimiter) => read_delimited(path, data, delimiter)?,
        SheetFormat::Workbook => read_workbook(path, data)?,
    };

    let RawTable { headers, rows } = table;
    tracing::debug!("Found columns: {}", headers.join(", "));

    let tracking_index = find_tracking_column(&headers, tracking_column).ok_or_else(|| {
        let expected = match tracking_column {
            Some(name) => name.to_string(),
            None => TRACKING_COLUMN_CANDIDATES.join(", "),
        };
        TrackerError::file_format(
            path,
            format!(
                "could not find tracking number column. Available columns: {}. Expected one of: {}",
                headers.join(", "),
                expected
            ),
        )
    })?;

    let records = rows
        .into_iter()
        .map(|row| {
            let tracking_number = row.get(tracking_index).cloned().unwrap_or_default();
            let original_row_data: HashMap<String, String> = headers
                .iter()
                .cloned()
                .zip(row.into_iter().chain(std::iter::repeat(String::new())))
                .collect();
            TrackingRecord::new(tracking_number, original_row_data)
        })
        .collect();

    Ok(TrackingSheet {
        tracking_column: headers[tracking_index].clone(),
        headers,
        records,
    })
}

fn read_delimited(path: &str, data: &[u8], delimiter: u8) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut lines = Vec::new();
    for record in reader.byte_records() {
        let record = record.map_err(|e| TrackerError::file_format(path, e.to_string()))?;
        lines.push(
            record
                .iter()
                .map(|field| String::from_utf8_lossy(field).into_owned())
                .collect::<Vec<_>>(),
        );
    }

    into_table(path, lines)
}

fn read_workbook(path: &str, data: &[u8]) -> Result<RawTable> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(data.to_vec()))
        .map_err(|e| TrackerError::file_format(path, e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| TrackerError::file_format(path, "workbook has no sheets"))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| TrackerError::file_format(path, format!("cannot read sheet '{}': {}", sheet_name, e)))?;

    let lines: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    into_table(path, lines)
}

fn into_table(path: &str, mut lines: Vec<Vec<String>>) -> Result<RawTable> {
    if lines.is_empty() {
        return Err(TrackerError::file_format(path, "file is empty, a header row is required"));
    }

    let mut header_row = lines.remove(0);
    if let Some(first) = header_row.first_mut() {
        *first = first.trim_start_matches('\u{feff}').to_string();
    }

    let width = lines.iter().map(Vec::len).max().unwrap_or(0).max(header_row.len());
    header_row.resize(width, String::new());

    Ok(RawTable {
        headers: unique_headers(header_row),
        rows: lines,
    })
}

/// Blank headers become `Unnamed: <index>`, repeated ones get a `.N` suffix.
fn unique_headers(raw: Vec<String>) -> Vec<String> {
    let mut used = HashSet::new();
    raw.into_iter()
        .enumerate()
        .map(|(index, name)| {
            let base = match name.trim() {
                "" => format!("Unnamed: {}", index),
                trimmed => trimmed.to_string(),
            };
            let mut candidate = base.clone();
            let mut suffix = 1;
            while !used.insert(candidate.clone()) {
                candidate = format!("{}.{}", base, suffix);
                suffix += 1;
            }
            candidate
        })
        .collect()
}

fn find_tracking_column(headers: &[String], explicit: Option<&str>) -> Option<usize> {
    match explicit {
        Some(name) => {
            let name = name.trim();
            headers
                .iter()
                .position(|header| header == name)
                .or_else(|| headers.iter().position(|header| header.eq_ignore_ascii_case(name)))
        }
        None => TRACKING_COLUMN_CANDIDATES
            .iter()
            .find_map(|candidate| headers.iter().position(|header| header == candidate)),
    }
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        // Integral floats are how spreadsheets store long numeric tracking numbers.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => (*f as i64).to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) if dt.is_duration() => match dt.as_duration() {
            Some(duration) => format_duration(duration),
            None => dt.to_string(),
        },
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => format_datetime(value),
            None => dt.to_string(),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        other => other.to_string(),
    }
}

fn format_datetime(value: NaiveDateTime) -> String {
    if value.time() == NaiveTime::MIN {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

fn format_duration(duration: chrono::Duration) -> String {
    let seconds = duration.num_seconds();
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}
