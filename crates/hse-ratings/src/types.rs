use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use crate::utils::sanitize;

/// One entry of the program listing page, before filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingItem {
    pub town: String,
    pub faculty: String,
    pub name: String,
    pub href: String,
}

/// Faculty grouping and program code lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub faculties: BTreeMap<String, BTreeSet<String>>,
    pub programs: BTreeMap<String, String>,
}

impl Catalog {
    pub fn program_code(&self, program: &str) -> Option<&str> {
        self.programs.get(program).map(String::as_str)
    }

    pub fn programs_of(&self, faculty: &str) -> Option<&BTreeSet<String>> {
        self.faculties.get(faculty)
    }

    /// Faculties listing `program`. There can be more than one after alias
    /// merging.
    pub fn faculties_of<'a>(&'a self, program: &'a str) -> impl Iterator<Item = &'a str> {
        self.faculties
            .iter()
            .filter(move |(_, programs)| programs.contains(program))
            .map(|(faculty, _)| faculty.as_str())
    }
}

impl Display for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (faculty, programs) in &self.faculties {
            writeln!(f, "{} ({})", faculty, programs.len())?;
            for program in programs {
                match self.programs.get(program) {
                    Some(code) => writeln!(f, "  - {} [{}]", program, code)?,
                    None => writeln!(f, "  - {}", program)?,
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingOption {
    pub name: String,
    /// Opaque token passed back as the `from` query parameter.
    pub from: String,
}

/// What the rating index page of a program offers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingIndex {
    pub ratings: Vec<RatingOption>,
    pub courses: Vec<u32>,
}

impl RatingIndex {
    /// Option whose label equals `name`, both sides sanitized.
    pub fn find_rating(&self, name: &str) -> Option<&RatingOption> {
        let name = sanitize(name);
        self.ratings.iter().find(|r| r.name == name)
    }

    pub fn has_course(&self, course: u32) -> bool {
        self.courses.contains(&course)
    }
}

impl Display for RatingIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Ratings:")?;
        for rating in &self.ratings {
            writeln!(f, "  {} (from={})", rating.name, rating.from)?;
        }
        let courses: Vec<String> = self.courses.iter().map(u32::to_string).collect();
        writeln!(f, "Courses: {}", courses.join(", "))
    }
}

/// A ranked student record.
///
/// Missing grades are `NaN`. `min_grade` is integer-valued when present but
/// shares the float sentinel so both grade columns behave the same.
#[derive(Debug, Clone, Serialize)]
pub struct RatingRow {
    #[serde(rename = "Студент")]
    pub student: String,
    #[serde(rename = "Позиция в рейтинге")]
    pub position: String,
    #[serde(rename = "Средний балл")]
    pub mean_grade: f64,
    #[serde(rename = "Минимальный балл")]
    pub min_grade: f64,
    #[serde(rename = "Перцентиль")]
    pub percentile: f64,
    #[serde(rename = "GPA")]
    pub gpa: f64,
}

impl RatingRow {
    pub fn min_grade_int(&self) -> Option<i64> {
        (!self.min_grade.is_nan()).then_some(self.min_grade as i64)
    }
}

fn grade(value: f64) -> String {
    if value.is_nan() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

/// Rows in on-page ranking order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct RatingTable(Vec<RatingRow>);

impl RatingTable {
    pub fn new(rows: Vec<RatingRow>) -> Self {
        Self(rows)
    }

    pub fn rows(&self) -> &[RatingRow] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_rows(self) -> Vec<RatingRow> {
        self.0
    }
}

impl Display for RatingTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self
            .0
            .iter()
            .map(|r| r.student.chars().count())
            .max()
            .unwrap_or(0)
            .max("Студент".chars().count());

        writeln!(
            f,
            "{:<width$}  {:>8}  {:>6}  {:>6}  {:>6}  {:>5}",
            "Студент", "Позиция", "Сред.", "Мин.", "Перц.", "GPA"
        )?;
        for row in &self.0 {
            writeln!(
                f,
                "{:<width$}  {:>8}  {:>6}  {:>6}  {:>6}  {:>5}",
                row.student,
                row.position,
                grade(row.mean_grade),
                grade(row.min_grade),
                row.percentile,
                row.gpa
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> RatingIndex {
        RatingIndex {
            ratings: vec![RatingOption {
                name: "Рейтинг 2 курса".to_string(),
                from: "229574395".to_string(),
            }],
            courses: vec![2],
        }
    }

    #[test]
    fn test_find_rating_accepts_page_label_with_nbsp() {
        let index = index();
        assert_eq!(
            index.find_rating("Рейтинг\u{a0}2 курса").map(|r| r.from.as_str()),
            Some("229574395")
        );
        assert!(index.find_rating(" Рейтинг 2 курса ").is_some());
        assert!(index.find_rating("Рейтинг 3 курса").is_none());
    }
}
