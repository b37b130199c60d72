//! Delimited-text decoding for team stats artifacts.
//!
//! Two modes:
//! - [`decode_table`]: header-aware, cells typed as numbers or text.
//! - [`decode_rows`]: positional, numeric-looking cells re-rendered with a
//!   fixed number of decimals, optional trailing columns dropped.
//!
//! A cell is numeric when the whole string parses as a finite `f64`. Zero is
//! numeric like any other value.

use std::collections::BTreeMap;
use std::fmt;

use csv::{ReaderBuilder, WriterBuilder};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn parse(raw: &str) -> Self {
        match parse_number(raw) {
            Some(v) => Cell::Number(v),
            None => Cell::Text(raw.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            Cell::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            Cell::Number(_) => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

/// One team's statistics, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StatsRow(BTreeMap<String, Cell>);

impl StatsRow {
    pub fn get(&self, field: &str) -> Option<&Cell> {
        self.0.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsTable {
    /// Field names in file order.
    pub columns: Vec<String>,
    pub rows: Vec<StatsRow>,
}

impl StatsTable {
    /// The column rendered as the frozen row label (the team name).
    pub fn label_column(&self) -> Option<&str> {
        self.columns.first().map(String::as_str)
    }

    /// Re-serialize with the header row first and columns in file order.
    pub fn to_csv(&self) -> Result<String, csv::Error> {
        let mut writer = WriterBuilder::new().from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(self.columns.iter().map(|c| {
                row.get(c).map(ToString::to_string).unwrap_or_default()
            }))?;
        }
        let bytes = writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Options for [`decode_rows`].
#[derive(Debug, Clone, Copy)]
pub struct PositionalOptions {
    /// Decimal places kept on numeric cells.
    pub precision: usize,
    /// Number of trailing (auxiliary) columns removed from every row.
    pub drop_trailing: usize,
}

impl Default for PositionalOptions {
    fn default() -> Self {
        PositionalOptions {
            precision: 1,
            drop_trailing: 0,
        }
    }
}

pub fn parse_number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Render a numeric-looking cell with `precision` decimals; leave anything
/// else untouched. Ties round away from zero (`98.25` -> `98.3`).
pub fn round_cell(raw: &str, precision: usize) -> String {
    match parse_number(raw) {
        Some(v) => format!("{:.precision$}", round_half_away(v, precision)),
        None => raw.to_string(),
    }
}

fn round_half_away(v: f64, precision: usize) -> f64 {
    let scale = 10f64.powi(precision.min(i32::MAX as usize) as i32);
    let scaled = v * scale;
    if !scaled.is_finite() {
        return v;
    }
    scaled.round() / scale
}

/// Header-aware decode. Every row must have as many fields as the header.
pub fn decode_table(raw: &str) -> Result<StatsTable, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(raw.trim_end().as_bytes());

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = columns
            .iter()
            .zip(record.iter())
            .map(|(name, value)| (name.clone(), Cell::parse(value)))
            .collect();
        rows.push(StatsRow(row));
    }

    Ok(StatsTable { columns, rows })
}

/// Positional decode: raw ordered cells, rounded per [`PositionalOptions`].
/// Rows may be ragged.
pub fn decode_rows(raw: &str, options: PositionalOptions) -> Result<Vec<Vec<String>>, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(raw.trim_end().as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let keep = record.len().saturating_sub(options.drop_trailing);
        rows.push(
            record
                .iter()
                .take(keep)
                .map(|cell| round_cell(cell, options.precision))
                .collect(),
        );
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEAMS_CSV: &str = "team,net_scoring_rate,off_pace\n\
Lakers,4.25,98.1\n\
\"Portland, Trail Blazers\",-2.5,101.0\n\
Nets,0,99.5\n\n";

    #[test]
    fn positional_rounds_numeric_cells_only() {
        let rows = decode_rows("Lakers,110.45,98.2", PositionalOptions::default()).unwrap();
        assert_eq!(rows, vec![vec!["Lakers", "110.5", "98.2"]]);
    }

    #[test]
    fn positional_rounds_ties_away_from_zero() {
        let rows = decode_rows("Lakers,98.25,0.75,-2.25,110.45", PositionalOptions::default()).unwrap();
        assert_eq!(rows, vec![vec!["Lakers", "98.3", "0.8", "-2.3", "110.5"]]);
        assert_eq!(round_cell("1.005", 2), "1.00", "1.005 is stored just below the tie");
    }

    #[test]
    fn positional_treats_zero_as_numeric() {
        let rows = decode_rows("Nets,0,12", PositionalOptions::default()).unwrap();
        assert_eq!(rows, vec![vec!["Nets", "0.0", "12.0"]]);
    }

    #[test]
    fn positional_drops_trailing_columns() {
        let opts = PositionalOptions {
            precision: 1,
            drop_trailing: 3,
        };
        let rows = decode_rows("team,a,b,x,y,z\nBulls,1.26,2,aux,aux,aux\n", opts).unwrap();
        assert_eq!(rows, vec![vec!["team", "a", "b"], vec!["Bulls", "1.3", "2.0"]]);
    }

    #[test]
    fn quoted_fields_keep_delimiters_and_newlines() {
        let raw = "\"Lakers, LA\",\"multi\nline\",3\n";
        let rows = decode_rows(raw, PositionalOptions::default()).unwrap();
        assert_eq!(rows, vec![vec!["Lakers, LA", "multi\nline", "3.0"]]);
    }

    #[test]
    fn header_mode_types_cells() {
        let table = decode_table(TEAMS_CSV).unwrap();
        assert_eq!(table.columns, ["team", "net_scoring_rate", "off_pace"]);
        assert_eq!(table.label_column(), Some("team"));
        assert_eq!(table.rows.len(), 3, "trailing blank line must not add a row");

        let blazers = &table.rows[1];
        assert_eq!(
            blazers.get("team"),
            Some(&Cell::Text("Portland, Trail Blazers".into()))
        );
        assert_eq!(blazers.get("net_scoring_rate"), Some(&Cell::Number(-2.5)));

        let nets = &table.rows[2];
        assert_eq!(nets.get("net_scoring_rate"), Some(&Cell::Number(0.0)));
    }

    #[test]
    fn header_mode_rejects_ragged_rows() {
        assert!(decode_table("team,a,b\nLakers,1\n").is_err());
    }

    #[test]
    fn nan_and_infinity_stay_text() {
        assert_eq!(Cell::parse("NaN"), Cell::Text("NaN".into()));
        assert_eq!(Cell::parse("inf"), Cell::Text("inf".into()));
        assert_eq!(round_cell("Infinity", 1), "Infinity");
    }

    #[test]
    fn decode_encode_decode_preserves_values() {
        let table = decode_table(TEAMS_CSV).unwrap();
        let encoded = table.to_csv().unwrap();
        let again = decode_table(&encoded).unwrap();
        assert_eq!(again, table);
    }
}
