use std::io::Cursor;
use std::io::Write;

use anyhow::{anyhow, Result};
use chrono::{Duration, NaiveDate};
use enum_dispatch::enum_dispatch;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Utility function to convert from polars `AnyValue` to `serde_json::Value`
/// for the column types the pipeline produces.
fn any_value_to_json(value: &AnyValue) -> Result<Value> {
    match value {
        AnyValue::Null => Ok(Value::Null),
        AnyValue::Boolean(b) => Ok(Value::Bool(*b)),
        AnyValue::String(s) => Ok(Value::String((*s).to_string())),
        AnyValue::Int32(n) => Ok(json!(*n)),
        AnyValue::Int64(n) => Ok(json!(*n)),
        AnyValue::UInt32(n) => Ok(json!(*n)),
        AnyValue::UInt64(n) => Ok(json!(*n)),
        AnyValue::Float64(n) => Ok(json!(*n)),
        AnyValue::Date(days) => {
            let date = NaiveDate::from_ymd_opt(1970, 1, 1)
                .expect("epoch is a valid date")
                + Duration::days(*days as i64);
            Ok(json!(date.to_string()))
        }
        _ => Err(anyhow!("Failed to convert type to JSON: {value:?}")),
    }
}

/// Serialize every row of a dataframe as a JSON object keyed by column name.
/// Missing cells become explicit JSON nulls, never zeros.
pub fn rows_to_json(df: &DataFrame) -> Result<Vec<Value>> {
    let mut rows = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let mut row = serde_json::Map::new();
        for column in df.get_columns() {
            let value = any_value_to_json(&column.get(idx)?)?;
            row.insert(column.name().to_string(), value);
        }
        rows.push(Value::Object(row));
    }
    Ok(rows)
}

/// Trait to define different output generators. Defines two functions:
/// `save`, which writes the serialized `DataFrame` to a writer, and
/// `format`, which returns it as a string.
#[enum_dispatch]
pub trait OutputGenerator {
    fn save(&self, writer: &mut impl Write, df: &mut DataFrame) -> Result<()>;
    fn format(&self, df: &mut DataFrame) -> Result<String> {
        let mut data: Vec<u8> = Vec::new();
        let mut buff = Cursor::new(&mut data);
        self.save(&mut buff, df)?;
        Ok(String::from_utf8(data)?)
    }
}

/// Enum of OutputFormatters, one for each potential output type.
#[enum_dispatch(OutputGenerator)]
#[derive(Serialize, Deserialize, Debug)]
pub enum OutputFormatter {
    Csv(CSVFormatter),
    Json(JsonFormatter),
}

/// Format the results as a CSV file.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct CSVFormatter;

impl OutputGenerator for CSVFormatter {
    fn save(&self, writer: &mut impl Write, df: &mut DataFrame) -> Result<()> {
        CsvWriter::new(writer).finish(df)?;
        Ok(())
    }
}

/// Format the results as a JSON array of row objects.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct JsonFormatter;

impl OutputGenerator for JsonFormatter {
    fn save(&self, writer: &mut impl Write, df: &mut DataFrame) -> Result<()> {
        let rows = rows_to_json(df)?;
        serde_json::to_writer_pretty(&mut *writer, &rows)?;
        writeln!(writer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::COL;

    fn table() -> DataFrame {
        df!(
            COL::COUNTRY_CODE => &["BI", "PE"],
            COL::CASES_PER_100K => &[Some(0.125), None],
            COL::TOTAL_CASES => &[Some(15i64), None],
        )
        .unwrap()
    }

    #[test]
    fn csv_output_has_header_and_rows() {
        let output = CSVFormatter.format(&mut table()).unwrap();
        let mut lines = output.lines();
        assert_eq!(
            lines.next(),
            Some("country_code,cases_per_100k,total_cases")
        );
        assert_eq!(lines.clone().count(), 2);
    }

    #[test]
    fn json_output_keeps_missing_values_null() {
        let output = JsonFormatter.format(&mut table()).unwrap();
        let rows: Vec<Value> = serde_json::from_str(&output).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][COL::COUNTRY_CODE], json!("BI"));
        assert_eq!(rows[1][COL::CASES_PER_100K], Value::Null);
        assert_eq!(rows[1][COL::TOTAL_CASES], Value::Null);
    }

    #[test]
    fn dates_render_as_iso_strings() {
        let date: NaiveDate = "2021-06-01".parse().unwrap();
        let mut df = df!(COL::REPORT_DATE => &[date]).unwrap();
        let output = JsonFormatter.format(&mut df).unwrap();
        assert!(output.contains("2021-06-01"));
    }
}
