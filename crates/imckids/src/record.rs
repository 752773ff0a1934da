//! Measurement records.
//!
//! A [`MeasurementRecord`] holds only the entered fields; BMI is derived from
//! height and weight on access. A [`ClassifiedRecord`] pairs a record with its
//! cohort so the classification is recomputed from the reference table every
//! time it is read.

use chrono::NaiveDate;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::classify::{self, Category, Cohort, Sex};
use crate::config::IntakeConfig;
use crate::error::{Error, Result};

/// Date format used in the record log and on certificates (`DD/MM/YYYY`).
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// One weigh-in, as entered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementRecord {
    name: String,
    age: u8,
    height_m: f64,
    weight_kg: f64,
    #[serde(serialize_with = "serialize_date")]
    weigh_date: NaiveDate,
    sex: Sex,
}

fn serialize_date<S: Serializer>(
    date: &NaiveDate,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(&date.format(DATE_FORMAT))
}

impl MeasurementRecord {
    /// Create a record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMeasurement`] if height or weight is not positive.
    pub fn new(
        name: impl Into<String>,
        age: u8,
        height_m: f64,
        weight_kg: f64,
        weigh_date: NaiveDate,
        sex: Sex,
    ) -> Result<Self> {
        classify::bmi(weight_kg, height_m)?;
        Ok(Self {
            name: name.into(),
            age,
            height_m,
            weight_kg,
            weigh_date,
            sex,
        })
    }

    /// The child's name. Not unique.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Age in years.
    #[must_use]
    pub fn age(&self) -> u8 {
        self.age
    }

    /// Height in meters.
    #[must_use]
    pub fn height_m(&self) -> f64 {
        self.height_m
    }

    /// Weight in kilograms.
    #[must_use]
    pub fn weight_kg(&self) -> f64 {
        self.weight_kg
    }

    /// Date of the weigh-in.
    #[must_use]
    pub fn weigh_date(&self) -> NaiveDate {
        self.weigh_date
    }

    /// Sex.
    #[must_use]
    pub fn sex(&self) -> Sex {
        self.sex
    }

    /// Body Mass Index, always derived from height and weight.
    #[must_use]
    pub fn bmi(&self) -> f64 {
        self.weight_kg / (self.height_m * self.height_m)
    }

    /// The weigh date as `DD/MM/YYYY`.
    #[must_use]
    pub fn weigh_date_text(&self) -> String {
        self.weigh_date.format(DATE_FORMAT).to_string()
    }

    /// Attach the cohort needed for classification.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedCohort`] if the age has no percentile row.
    pub fn classified(self) -> Result<ClassifiedRecord> {
        let cohort = Cohort::new(self.age, self.sex)?;
        Ok(ClassifiedRecord {
            record: self,
            cohort,
        })
    }
}

/// A record whose cohort is known to be covered by the reference table.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRecord {
    record: MeasurementRecord,
    cohort: Cohort,
}

impl ClassifiedRecord {
    /// The underlying record.
    #[must_use]
    pub fn record(&self) -> &MeasurementRecord {
        &self.record
    }

    /// Classification, recomputed from the reference table on each call.
    #[must_use]
    pub fn classification(&self) -> Category {
        self.cohort.percentiles().band(self.record.bmi())
    }

    /// Recommendation text for the current classification.
    #[must_use]
    pub fn recommendation(&self) -> &'static str {
        classify::describe(self.classification())
    }

    /// Consume and return the underlying record.
    #[must_use]
    pub fn into_record(self) -> MeasurementRecord {
        self.record
    }
}

impl Serialize for ClassifiedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let r = &self.record;
        let mut state = serializer.serialize_struct("ClassifiedRecord", 8)?;
        state.serialize_field("name", &r.name)?;
        state.serialize_field("age", &r.age)?;
        state.serialize_field("height_m", &r.height_m)?;
        state.serialize_field("weight_kg", &r.weight_kg)?;
        state.serialize_field("bmi", &r.bmi())?;
        state.serialize_field("weigh_date", &r.weigh_date_text())?;
        state.serialize_field("sex", &r.sex)?;
        state.serialize_field("classification", &self.classification())?;
        state.end()
    }
}

/// Raw intake data, before range checks.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    /// Child's name.
    pub name: String,
    /// Age in years.
    pub age: u8,
    /// Height in meters.
    pub height_m: f64,
    /// Weight in kilograms.
    pub weight_kg: f64,
    /// Sex.
    pub sex: Sex,
    /// Date of the weigh-in.
    pub weigh_date: NaiveDate,
}

impl Submission {
    /// Validate against the intake limits and build a classified record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMeasurement`] for an empty name or a height or
    /// weight outside the configured range, and [`Error::UnsupportedCohort`]
    /// for an age without a percentile row.
    pub fn validate(self, limits: &IntakeConfig) -> Result<ClassifiedRecord> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::invalid_measurement("name", "\"\""));
        }
        if !(limits.min_height_m..=limits.max_height_m).contains(&self.height_m) {
            return Err(Error::invalid_measurement("height", self.height_m));
        }
        if !(limits.min_weight_kg..=limits.max_weight_kg).contains(&self.weight_kg) {
            return Err(Error::invalid_measurement("weight", self.weight_kg));
        }

        MeasurementRecord::new(
            name,
            self.age,
            self.height_m,
            self.weight_kg,
            self.weigh_date,
            self.sex,
        )?
        .classified()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32, m: u32, y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn submission(age: u8, height_m: f64, weight_kg: f64, sex: Sex) -> Submission {
        Submission {
            name: "Ana".to_string(),
            age,
            height_m,
            weight_kg,
            sex,
            weigh_date: date(15, 3, 2024),
        }
    }

    #[test]
    fn test_bmi_is_derived() {
        let record = MeasurementRecord::new("Ana", 4, 1.1, 18.15, date(1, 2, 2024), Sex::Female)
            .unwrap();
        assert_eq!(record.bmi(), 18.15 / (1.1 * 1.1));
    }

    #[test]
    fn test_new_rejects_zero_height() {
        let err =
            MeasurementRecord::new("Ana", 4, 0.0, 15.0, date(1, 2, 2024), Sex::Female).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidMeasurement {
                field: "height",
                ..
            }
        ));
    }

    #[test]
    fn test_classification_matches_classify() {
        let record =
            MeasurementRecord::new("Bruno", 5, 1.0, 17.6, date(1, 2, 2024), Sex::Male).unwrap();
        let expected = classify::classify(record.bmi(), 5, Sex::Male).unwrap();
        let classified = record.classified().unwrap();
        assert_eq!(classified.classification(), expected);
        assert_eq!(classified.classification(), Category::Obese);
        assert_eq!(classified.recommendation(), classify::describe(Category::Obese));
    }

    #[test]
    fn test_classified_rejects_unsupported_age() {
        let record =
            MeasurementRecord::new("Caio", 6, 1.1, 20.0, date(1, 2, 2024), Sex::Male).unwrap();
        assert!(matches!(
            record.classified(),
            Err(Error::UnsupportedCohort { age: 6, .. })
        ));
    }

    #[test]
    fn test_weigh_date_text() {
        let record =
            MeasurementRecord::new("Ana", 4, 1.0, 15.0, date(5, 9, 2024), Sex::Female).unwrap();
        assert_eq!(record.weigh_date_text(), "05/09/2024");
    }

    #[test]
    fn test_submission_valid() {
        let classified = submission(4, 1.0, 14.0, Sex::Male)
            .validate(&IntakeConfig::default())
            .unwrap();
        assert_eq!(classified.record().bmi(), 14.0);
        assert_eq!(classified.classification(), Category::Normal);
    }

    #[test]
    fn test_submission_trims_name() {
        let mut sub = submission(4, 1.0, 15.0, Sex::Male);
        sub.name = "  Davi  ".to_string();
        let classified = sub.validate(&IntakeConfig::default()).unwrap();
        assert_eq!(classified.record().name(), "Davi");
    }

    #[test]
    fn test_submission_rejects_empty_name() {
        let mut sub = submission(4, 1.0, 15.0, Sex::Male);
        sub.name = "   ".to_string();
        let err = sub.validate(&IntakeConfig::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidMeasurement { field: "name", .. }));
    }

    #[test]
    fn test_submission_rejects_out_of_range() {
        let limits = IntakeConfig::default();
        let err = submission(4, 0.3, 15.0, Sex::Male)
            .validate(&limits)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidMeasurement {
                field: "height",
                ..
            }
        ));

        let err = submission(4, 1.0, 150.0, Sex::Male)
            .validate(&limits)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidMeasurement {
                field: "weight",
                ..
            }
        ));
    }

    #[test]
    fn test_submission_rejects_unsupported_age() {
        let err = submission(7, 1.2, 22.0, Sex::Female)
            .validate(&IntakeConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedCohort { age: 7, .. }));
    }

    #[test]
    fn test_classified_record_serialize() {
        let classified = submission(5, 1.0, 17.3, Sex::Female)
            .validate(&IntakeConfig::default())
            .unwrap();
        let json = serde_json::to_value(&classified).unwrap();
        assert_eq!(json["name"], "Ana");
        assert_eq!(json["sex"], "F");
        assert_eq!(json["weigh_date"], "15/03/2024");
        assert_eq!(json["classification"], "obese");
    }
}
