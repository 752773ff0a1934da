//! Aggregate analysis over all records.
//!
//! Provides the figures behind the charts: the distribution of records per
//! classification and the per-child age, weight and BMI series.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::classify::Category;
use crate::record::ClassifiedRecord;

/// Number of records in one classification band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    /// The band.
    pub category: Category,
    /// How many records fall in it.
    pub count: usize,
}

/// One bar of the per-child series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChildRow {
    /// Child's name.
    pub name: String,
    /// Age in years.
    pub age: u8,
    /// Weight in kilograms.
    pub weight_kg: f64,
    /// Body Mass Index.
    pub bmi: f64,
    /// Current classification.
    pub classification: Category,
}

/// Summary of all records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Total number of records.
    pub total: usize,
    /// Records per band, lowest band first; empty bands are included.
    pub by_category: Vec<CategoryCount>,
    /// Per-record rows in insertion order.
    pub children: Vec<ChildRow>,
    /// Mean BMI, if there are any records.
    pub mean_bmi: Option<f64>,
    /// Earliest weigh date.
    pub first_weigh_date: Option<NaiveDate>,
    /// Latest weigh date.
    pub last_weigh_date: Option<NaiveDate>,
}

impl Report {
    /// Build the summary from loaded records.
    #[must_use]
    pub fn from_records(records: &[ClassifiedRecord]) -> Self {
        let by_category = Category::ALL
            .iter()
            .map(|&category| CategoryCount {
                category,
                count: records
                    .iter()
                    .filter(|r| r.classification() == category)
                    .count(),
            })
            .collect();

        let children: Vec<ChildRow> = records
            .iter()
            .map(|classified| {
                let r = classified.record();
                ChildRow {
                    name: r.name().to_string(),
                    age: r.age(),
                    weight_kg: r.weight_kg(),
                    bmi: r.bmi(),
                    classification: classified.classification(),
                }
            })
            .collect();

        #[allow(clippy::cast_precision_loss)]
        let mean_bmi = (!children.is_empty())
            .then(|| children.iter().map(|c| c.bmi).sum::<f64>() / children.len() as f64);

        let dates = records.iter().map(|r| r.record().weigh_date());

        Self {
            total: records.len(),
            by_category,
            children,
            mean_bmi,
            first_weigh_date: dates.clone().min(),
            last_weigh_date: dates.max(),
        }
    }

    /// Count for a single band.
    #[must_use]
    pub fn count(&self, category: Category) -> usize {
        self.by_category
            .iter()
            .find(|c| c.category == category)
            .map_or(0, |c| c.count)
    }

    /// Share of records in a band, as a percentage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn share(&self, category: Category) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.count(category) as f64 * 100.0 / self.total as f64
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total == 0 {
            return writeln!(f, "No records yet.");
        }

        writeln!(f, "Records: {}", self.total)?;
        if let (Some(first), Some(last)) = (self.first_weigh_date, self.last_weigh_date) {
            writeln!(
                f,
                "Weigh dates: {} to {}",
                first.format(crate::record::DATE_FORMAT),
                last.format(crate::record::DATE_FORMAT)
            )?;
        }
        if let Some(mean) = self.mean_bmi {
            writeln!(f, "Mean BMI: {mean:.2}")?;
        }

        writeln!(f)?;
        writeln!(f, "Distribution by classification")?;
        for c in &self.by_category {
            writeln!(
                f,
                "  {:<16} {:>4}  {:>5.1}%",
                c.category.label(),
                c.count,
                self.share(c.category)
            )?;
        }

        writeln!(f)?;
        writeln!(f, "{:<24} {:>4} {:>8} {:>7}  Classification", "Name", "Age", "Weight", "BMI")?;
        for child in &self.children {
            writeln!(
                f,
                "{:<24} {:>4} {:>8.2} {:>7.2}  {}",
                child.name, child.age, child.weight_kg, child.bmi, child.classification
            )?;
        }
        Ok(())
    }
}
