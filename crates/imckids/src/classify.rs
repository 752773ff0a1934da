//! BMI computation and percentile classification.
//!
//! Classification is a pure lookup against a fixed reference table of
//! age/sex-specific percentile thresholds. Only children aged 4 and 5 are
//! covered; any other age is an [`Error::UnsupportedCohort`].

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Youngest age covered by the percentile table.
pub const MIN_AGE: u8 = 4;

/// Oldest age covered by the percentile table.
pub const MAX_AGE: u8 = 5;

/// Biological sex, as recorded on the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    /// Stored as `M`.
    #[serde(rename = "M")]
    Male,
    /// Stored as `F`.
    #[serde(rename = "F")]
    Female,
}

impl Sex {
    /// The single-letter code used in the record log.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Male => "Masculino",
            Self::Female => "Feminino",
        }
    }

    /// Parse a log code (`M` or `F`, case-insensitive).
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "M" | "m" => Some(Self::Male),
            "F" | "f" => Some(Self::Female),
            _ => None,
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// BMI classification band.
///
/// Variants are ordered from lowest to highest BMI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Below the 5th percentile.
    Underweight,
    /// From the 5th up to the 85th percentile.
    Normal,
    /// From the 85th up to the 95th percentile.
    Overweight,
    /// At or above the 95th percentile.
    Obese,
}

impl Category {
    /// All categories, lowest band first.
    pub const ALL: [Category; 4] = [
        Category::Underweight,
        Category::Normal,
        Category::Overweight,
        Category::Obese,
    ];

    /// Display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Underweight => "Abaixo do peso",
            Self::Normal => "Peso normal",
            Self::Overweight => "Sobrepeso",
            Self::Obese => "Obesidade",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// BMI cut-points delimiting the classification bands for one cohort.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Percentiles {
    /// 5th percentile.
    pub p5: f64,
    /// 85th percentile.
    pub p85: f64,
    /// 95th percentile.
    pub p95: f64,
}

impl Percentiles {
    const fn new(p5: f64, p85: f64, p95: f64) -> Self {
        Self { p5, p85, p95 }
    }

    /// Place a BMI value into its band. Lower bounds are inclusive.
    #[must_use]
    pub fn band(&self, bmi: f64) -> Category {
        if bmi < self.p5 {
            Category::Underweight
        } else if bmi < self.p85 {
            Category::Normal
        } else if bmi < self.p95 {
            Category::Overweight
        } else {
            Category::Obese
        }
    }
}

/// An (age, sex) pair with a row in the reference table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cohort {
    age: u8,
    sex: Sex,
    percentiles: Percentiles,
}

fn reference_row(age: u8, sex: Sex) -> Option<Percentiles> {
    match (age, sex) {
        (4, Sex::Male) => Some(Percentiles::new(14.0, 16.0, 17.0)),
        (4, Sex::Female) => Some(Percentiles::new(13.8, 15.8, 16.8)),
        (5, Sex::Male) => Some(Percentiles::new(14.5, 16.5, 17.5)),
        (5, Sex::Female) => Some(Percentiles::new(14.3, 16.3, 17.3)),
        _ => None,
    }
}

impl Cohort {
    /// Look up a cohort.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedCohort`] if the age is outside the table.
    pub fn new(age: u8, sex: Sex) -> Result<Self> {
        match reference_row(age, sex) {
            Some(percentiles) => Ok(Self {
                age,
                sex,
                percentiles,
            }),
            None => Err(Error::UnsupportedCohort { age, sex }),
        }
    }

    /// Age in years.
    #[must_use]
    pub fn age(&self) -> u8 {
        self.age
    }

    /// Sex.
    #[must_use]
    pub fn sex(&self) -> Sex {
        self.sex
    }

    /// The reference thresholds for this cohort.
    #[must_use]
    pub fn percentiles(&self) -> Percentiles {
        self.percentiles
    }
}

/// Compute Body Mass Index as `weight / height²`.
///
/// # Errors
///
/// Returns [`Error::InvalidMeasurement`] if either value is not a positive
/// finite number, or if the quotient itself is not finite.
pub fn bmi(weight_kg: f64, height_m: f64) -> Result<f64> {
    if !(height_m.is_finite() && height_m > 0.0) {
        return Err(Error::invalid_measurement("height", height_m));
    }
    if !(weight_kg.is_finite() && weight_kg > 0.0) {
        return Err(Error::invalid_measurement("weight", weight_kg));
    }
    let value = weight_kg / (height_m * height_m);
    if !value.is_finite() {
        return Err(Error::invalid_measurement("height", height_m));
    }
    Ok(value)
}

/// Classify a BMI value against the percentile table for `(age, sex)`.
///
/// # Errors
///
/// Returns [`Error::UnsupportedCohort`] for ages other than 4 and 5, and
/// [`Error::InvalidMeasurement`] for a non-finite BMI.
pub fn classify(bmi: f64, age: u8, sex: Sex) -> Result<Category> {
    let cohort = Cohort::new(age, sex)?;
    if !bmi.is_finite() {
        return Err(Error::invalid_measurement("bmi", bmi));
    }
    Ok(cohort.percentiles().band(bmi))
}

/// Recommendation text shown alongside a category.
#[must_use]
pub fn describe(category: Category) -> &'static str {
    match category {
        Category::Underweight => {
            "A criança está abaixo do peso ideal. Recomenda-se acompanhamento nutricional."
        }
        Category::Normal => "A criança está no peso ideal. Parabéns!",
        Category::Overweight => concat!(
            "A criança está com sobrepeso. ",
            "Recomenda-se atenção à alimentação e prática de atividades físicas."
        ),
        Category::Obese => {
            "A criança está com obesidade. Recomenda-se acompanhamento médico e nutricional."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_cohorts() -> Vec<Cohort> {
        let mut cohorts = Vec::new();
        for age in MIN_AGE..=MAX_AGE {
            for sex in [Sex::Male, Sex::Female] {
                cohorts.push(Cohort::new(age, sex).unwrap());
            }
        }
        cohorts
    }

    #[test]
    fn test_bmi_formula() {
        assert_eq!(bmi(14.0, 1.0).unwrap(), 14.0);
        assert_eq!(bmi(18.0, 1.05).unwrap(), 18.0 / (1.05 * 1.05));
        assert_eq!(bmi(20.0, 2.0).unwrap(), 5.0);
    }

    #[test]
    fn test_bmi_rejects_non_positive_height() {
        for height in [0.0, -1.2, f64::NAN] {
            let err = bmi(15.0, height).unwrap_err();
            assert!(matches!(
                err,
                Error::InvalidMeasurement {
                    field: "height",
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_bmi_rejects_infinite_quotient() {
        // 1e-200 squared underflows to zero.
        let err = bmi(15.0, 1e-200).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidMeasurement {
                field: "height",
                ..
            }
        ));
    }

    #[test]
    fn test_bmi_rejects_non_positive_weight() {
        let err = bmi(0.0, 1.1).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidMeasurement {
                field: "weight",
                ..
            }
        ));
    }

    #[test]
    fn test_lower_bounds_are_inclusive() {
        for cohort in all_cohorts() {
            let p = cohort.percentiles();
            let (age, sex) = (cohort.age(), cohort.sex());
            assert_eq!(classify(p.p5, age, sex).unwrap(), Category::Normal);
            assert_eq!(classify(p.p85, age, sex).unwrap(), Category::Overweight);
            assert_eq!(classify(p.p95, age, sex).unwrap(), Category::Obese);
        }
    }

    #[test]
    fn test_bands_between_thresholds() {
        for cohort in all_cohorts() {
            let p = cohort.percentiles();
            let (age, sex) = (cohort.age(), cohort.sex());
            assert_eq!(classify(p.p5 - 0.01, age, sex).unwrap(), Category::Underweight);
            assert_eq!(classify(p.p85 - 0.01, age, sex).unwrap(), Category::Normal);
            assert_eq!(classify(p.p95 - 0.01, age, sex).unwrap(), Category::Overweight);
            assert_eq!(classify(p.p95 + 5.0, age, sex).unwrap(), Category::Obese);
        }
    }

    #[test]
    fn test_reference_table_values() {
        let p = Cohort::new(4, Sex::Female).unwrap().percentiles();
        assert_eq!(p, Percentiles::new(13.8, 15.8, 16.8));
        let p = Cohort::new(5, Sex::Male).unwrap().percentiles();
        assert_eq!(p, Percentiles::new(14.5, 16.5, 17.5));
    }

    #[test]
    fn test_boy_aged_four_at_p5_is_normal() {
        let value = bmi(14.0, 1.0).unwrap();
        assert_eq!(value, 14.0);
        assert_eq!(classify(value, 4, Sex::Male).unwrap(), Category::Normal);
    }

    #[test]
    fn test_girl_aged_five_at_p95_is_obese() {
        let value = bmi(17.3, 1.0).unwrap();
        assert_eq!(classify(value, 5, Sex::Female).unwrap(), Category::Obese);
    }

    #[test]
    fn test_unsupported_age() {
        for sex in [Sex::Male, Sex::Female] {
            for value in [10.0, 15.0, 30.0] {
                let err = classify(value, 6, sex).unwrap_err();
                assert!(matches!(err, Error::UnsupportedCohort { age: 6, .. }));
            }
        }
        assert!(classify(15.0, 3, Sex::Male).is_err());
        assert!(classify(15.0, 0, Sex::Female).is_err());
    }

    #[test]
    fn test_classify_rejects_nan() {
        let err = classify(f64::NAN, 4, Sex::Male).unwrap_err();
        assert!(err.is_caller_error());
    }

    #[test]
    fn test_classify_is_pure() {
        let first = classify(16.2, 5, Sex::Female).unwrap();
        for _ in 0..10 {
            let _ = classify(13.0, 4, Sex::Male);
            assert_eq!(classify(16.2, 5, Sex::Female).unwrap(), first);
        }
    }

    #[test]
    fn test_describe_is_distinct_per_category() {
        let texts: std::collections::HashSet<_> =
            Category::ALL.iter().map(|c| describe(*c)).collect();
        assert_eq!(texts.len(), Category::ALL.len());
        assert!(describe(Category::Normal).contains("Parabéns"));
    }

    #[test]
    fn test_category_ordering() {
        assert!(Category::Underweight < Category::Normal);
        assert!(Category::Overweight < Category::Obese);
    }

    #[test]
    fn test_sex_codes() {
        assert_eq!(Sex::from_code("M"), Some(Sex::Male));
        assert_eq!(Sex::from_code("f"), Some(Sex::Female));
        assert_eq!(Sex::from_code("X"), None);
        assert_eq!(Sex::Male.to_string(), "M");
        assert_eq!(Sex::Female.label(), "Feminino");
    }

    #[test]
    fn test_category_serialize() {
        let json = serde_json::to_string(&Category::Overweight).unwrap();
        assert_eq!(json, "\"overweight\"");
        assert_eq!(Category::Obese.to_string(), "Obesidade");
    }
}
