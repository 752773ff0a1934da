//! Row layout of the record log.
//!
//! One headerless CSV row per record, columns in fixed order:
//! name, age, height, weight, bmi, weigh date (`DD/MM/YYYY`), sex code.

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::warn;

use crate::classify::Sex;
use crate::error::{Error, Result};
use crate::record::{MeasurementRecord, DATE_FORMAT};

/// Number of columns in a log row.
pub const COLUMN_COUNT: usize = 7;

/// Largest tolerated gap between the stored and recomputed BMI.
const BMI_TOLERANCE: f64 = 1e-6;

/// Encode a record as a log row.
///
/// Floats use Rust's shortest round-trip representation so they read back
/// bit-identical.
#[must_use]
pub fn encode(record: &MeasurementRecord) -> [String; COLUMN_COUNT] {
    [
        record.name().to_string(),
        record.age().to_string(),
        record.height_m().to_string(),
        record.weight_kg().to_string(),
        record.bmi().to_string(),
        record.weigh_date_text(),
        record.sex().code().to_string(),
    ]
}

/// Decode a log row. `line` is only used for error reporting.
///
/// The stored BMI column is checked but never trusted; the record derives its
/// BMI from height and weight.
///
/// # Errors
///
/// Returns [`Error::MalformedRecord`] if the row has the wrong shape or a
/// field cannot be parsed.
pub fn decode(row: &StringRecord, line: u64) -> Result<MeasurementRecord> {
    if row.len() != COLUMN_COUNT {
        return Err(Error::malformed(
            line,
            format!("expected {COLUMN_COUNT} fields, found {}", row.len()),
        ));
    }

    let name = &row[0];
    let age = parse_age(&row[1])
        .ok_or_else(|| Error::malformed(line, format!("bad age {:?}", &row[1])))?;
    let height_m = parse_number(&row[2], "height", line)?;
    let weight_kg = parse_number(&row[3], "weight", line)?;
    let stored_bmi = parse_number(&row[4], "bmi", line)?;
    let weigh_date = NaiveDate::parse_from_str(row[5].trim(), DATE_FORMAT)
        .map_err(|e| Error::malformed(line, format!("bad weigh date {:?}: {e}", &row[5])))?;
    let sex = Sex::from_code(&row[6])
        .ok_or_else(|| Error::malformed(line, format!("unknown sex code {:?}", &row[6])))?;

    let record = MeasurementRecord::new(name, age, height_m, weight_kg, weigh_date, sex)
        .map_err(|e| Error::malformed(line, e.to_string()))?;

    if (record.bmi() - stored_bmi).abs() > BMI_TOLERANCE {
        warn!(
            "Line {line}: stored BMI {stored_bmi} disagrees with recomputed {:.4}",
            record.bmi()
        );
    }

    Ok(record)
}

/// Ages are whole years, but older logs may carry them as `4.0`.
fn parse_age(text: &str) -> Option<u8> {
    let text = text.trim();
    text.parse::<u8>()
        .ok()
        .or_else(|| text.strip_suffix(".0").and_then(|whole| whole.parse().ok()))
}

fn parse_number(text: &str, field: &str, line: u64) -> Result<f64> {
    text.trim()
        .parse::<f64>()
        .map_err(|e| Error::malformed(line, format!("bad {field} {text:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    fn sample() -> MeasurementRecord {
        MeasurementRecord::new(
            "Ana",
            4,
            1.07,
            17.4,
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            Sex::Female,
        )
        .unwrap()
    }

    #[test]
    fn test_encode_column_order() {
        let fields = encode(&sample());
        assert_eq!(fields[0], "Ana");
        assert_eq!(fields[1], "4");
        assert_eq!(fields[2], "1.07");
        assert_eq!(fields[3], "17.4");
        assert_eq!(fields[5], "15/03/2024");
        assert_eq!(fields[6], "F");
    }

    #[test]
    fn test_decode_encoded_row() {
        let original = sample();
        let fields = encode(&original);
        let decoded = decode(&StringRecord::from(fields.to_vec()), 1).unwrap();
        assert_eq!(decoded, original);
        assert_eq!(decoded.bmi(), original.bmi());
    }

    #[test]
    fn test_decode_accepts_float_age() {
        let decoded = decode(&row(&["Bia", "5.0", "1.1", "19", "15.7", "01/02/2024", "F"]), 1)
            .unwrap();
        assert_eq!(decoded.age(), 5);
    }

    #[test]
    fn test_decode_ignores_stale_bmi() {
        let decoded = decode(&row(&["Caio", "4", "1.0", "15.0", "99.0", "01/02/2024", "M"]), 1)
            .unwrap();
        assert_eq!(decoded.bmi(), 15.0);
    }

    #[test]
    fn test_decode_wrong_column_count() {
        let err = decode(&row(&["Caio", "4", "1.0"]), 3).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { line: 3, .. }));
        assert!(err.to_string().contains("expected 7 fields, found 3"));
    }

    #[test]
    fn test_decode_bad_fields() {
        let cases = [
            ["Caio", "x", "1.0", "15", "15", "01/02/2024", "M"],
            ["Caio", "4", "tall", "15", "15", "01/02/2024", "M"],
            ["Caio", "4", "1.0", "15", "15", "2024-02-01", "M"],
            ["Caio", "4", "1.0", "15", "15", "01/02/2024", "X"],
            ["Caio", "4", "0", "15", "15", "01/02/2024", "M"],
            ["Ana", "4", "1e-200", "15", "inf", "15/03/2024", "M"],
        ];
        for fields in cases {
            let err = decode(&row(&fields), 2).unwrap_err();
            assert!(
                matches!(err, Error::MalformedRecord { line: 2, .. }),
                "unexpected error for {fields:?}: {err}"
            );
        }
    }
}
