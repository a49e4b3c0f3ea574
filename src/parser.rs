use crate::config::ColumnNames;
use crate::data::models::{RideRecord, RideTable};
use crate::error::{AppError, Result};
use chrono::NaiveDate;
use csv::StringRecord;
use std::collections::HashMap;
use std::str::FromStr;

/// Date format of the date column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq)]
pub struct LoadSummary {
    pub rows: usize,
    pub date_span: Option<(NaiveDate, NaiveDate)>,
}

/// Column positions resolved from the header row.
struct ColumnIndex {
    date: usize,
    season: usize,
    temperature: usize,
    casual: usize,
    registered: usize,
    count: usize,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord, names: &ColumnNames) -> Result<Self> {
        let header_map: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.trim().trim_start_matches('\u{feff}'), idx))
            .collect();

        let lookup = |name: &str| {
            header_map.get(name).copied().ok_or_else(|| {
                AppError::Parse(format!("Missing required column '{}'", name))
            })
        };

        Ok(Self {
            date: lookup(names.date.as_str())?,
            season: lookup(names.season.as_str())?,
            temperature: lookup(names.temperature.as_str())?,
            casual: lookup(names.casual.as_str())?,
            registered: lookup(names.registered.as_str())?,
            count: lookup(names.count.as_str())?,
        })
    }
}

pub struct Parser;

impl Parser {
    /// Parse a ride dataset using the default column names.
    pub fn parse_table(content: &str) -> Result<(RideTable, LoadSummary)> {
        Self::parse_table_with_columns(content, &ColumnNames::default())
    }

    /// Parse a ride dataset. Any bad row fails the whole load.
    pub fn parse_table_with_columns(
        content: &str,
        columns: &ColumnNames,
    ) -> Result<(RideTable, LoadSummary)> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers = reader.headers()?.clone();
        let index = ColumnIndex::resolve(&headers, columns)?;

        let mut records = Vec::new();
        for (idx, row) in reader.records().enumerate() {
            // records() starts after the header, lines are 1-based
            let line = idx + 2;
            let row = row?;
            let record = parse_row(&row, &index)
                .map_err(|e| annotate_line(e, line))?;
            records.push(record);
        }

        let table = RideTable::new(records);
        let summary = LoadSummary {
            rows: table.len(),
            date_span: table.date_bounds(),
        };

        Ok((table, summary))
    }
}

fn annotate_line(error: AppError, line: usize) -> AppError {
    match error {
        AppError::Parse(msg) => AppError::Parse(format!("line {}: {}", line, msg)),
        AppError::InvalidData(msg) => AppError::InvalidData(format!("line {}: {}", line, msg)),
        other => other,
    }
}

fn parse_row(row: &StringRecord, index: &ColumnIndex) -> Result<RideRecord> {
    let date = parse_date(field(row, index.date)?)?;
    let season = parse_number::<u8>(field(row, index.season)?, "season")?;
    let temperature = parse_number::<f64>(field(row, index.temperature)?, "temperature")?;
    let casual = parse_number::<u64>(field(row, index.casual)?, "casual")?;
    let registered = parse_number::<u64>(field(row, index.registered)?, "registered")?;
    let count = parse_number::<u64>(field(row, index.count)?, "count")?;

    if !temperature.is_finite() {
        return Err(AppError::InvalidData(format!(
            "Temperature must be a finite number, got {}",
            temperature
        )));
    }

    let record = RideRecord {
        date,
        season,
        temperature,
        casual,
        registered,
        count,
    };

    if !record.is_consistent() {
        return Err(AppError::InvalidData(format!(
            "count {} does not equal casual {} + registered {} on {}",
            count, casual, registered, date
        )));
    }

    Ok(record)
}

fn field(row: &StringRecord, idx: usize) -> Result<&str> {
    row.get(idx).ok_or_else(|| {
        AppError::Parse(format!(
            "Expected at least {} fields, got {}",
            idx + 1,
            row.len()
        ))
    })
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| {
        AppError::Parse(format!(
            "Failed to parse date '{}' (expected YYYY-MM-DD): {}",
            s, e
        ))
    })
}

fn parse_number<T>(s: &str, column: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    s.parse::<T>()
        .map_err(|e| AppError::Parse(format!("Failed to parse {} '{}': {}", column, s, e)))
}
