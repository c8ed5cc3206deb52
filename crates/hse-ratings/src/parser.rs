use crate::markup::{Document, Query};
use crate::types::{ListingItem, RatingIndex, RatingOption, RatingRow, RatingTable};
use crate::utils::sanitize;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Unexpected page layout: {0}")]
    StructuralMismatch(String),
    #[error("Malformed rating row {row}, cell {cell}: {value:?}")]
    MalformedRow {
        row: usize,
        cell: usize,
        value: String,
    },
    #[error("Rating row {row} has {found} cells, expected {expected}")]
    ShortRow {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
}

const PROGRAM_LIST_ID: &str = "education-programs__list";
const PROGRAM_ITEM_CLASS: &str = "edu-programm__item";
const PROGRAM_UNIT_CLASS: &str = "edu-programm__unit";
const RATING_FORM_CLASS: &str = "first_child last_child";

const RATING_COLUMNS: usize = 6;

pub fn parse_program_listing(document: &Document) -> Result<Vec<ListingItem>, ParseError> {
    let list = document.find_first(&Query::tag("div").id(PROGRAM_LIST_ID))?;

    let mut items = Vec::new();
    for item in list.find_all(&Query::tag("div").class(PROGRAM_ITEM_CLASS))? {
        let unit = item.find_first(&Query::tag("div").class(PROGRAM_UNIT_CLASS))?;
        let spans = unit.find_all(&Query::tag("span"))?;
        let (town, faculty) = match spans.as_slice() {
            [town, faculty, ..] => (sanitize(&town.text()), sanitize(&faculty.text())),
            _ => {
                return Err(ParseError::StructuralMismatch(format!(
                    "program unit has {} span(s), expected town and faculty",
                    spans.len()
                )));
            }
        };
        if faculty.is_empty() {
            return Err(ParseError::StructuralMismatch(format!(
                "program unit in {} has an empty faculty name",
                town
            )));
        }

        let link = item.find_first(&Query::tag("a"))?;
        let name = sanitize(&link.text());
        let href = link.attr("href").ok_or_else(|| {
            ParseError::StructuralMismatch(format!("program link '{}' has no href", name))
        })?;

        items.push(ListingItem {
            town,
            faculty,
            name,
            href: href.to_string(),
        });
    }

    Ok(items)
}

/// Rating views and courses offered by the two selectors of a rating index
/// page.
pub fn parse_rating_index(document: &Document) -> Result<RatingIndex, ParseError> {
    let form = document.find_first(&Query::tag("div").class(RATING_FORM_CLASS))?;
    let selects = form.find_all(&Query::tag("select"))?;
    let [rating_select, course_select, ..] = selects.as_slice() else {
        return Err(ParseError::StructuralMismatch(format!(
            "rating form has {} select(s), expected rating and course",
            selects.len()
        )));
    };

    let mut ratings = Vec::new();
    for option in rating_select.find_all(&Query::tag("option"))? {
        let name = sanitize(&option.text());
        let from = option.attr("value").ok_or_else(|| {
            ParseError::StructuralMismatch(format!("rating option '{}' has no value", name))
        })?;
        ratings.push(RatingOption {
            name,
            from: from.to_string(),
        });
    }

    let mut courses = Vec::new();
    for option in course_select.find_all(&Query::tag("option"))? {
        match option.attr("value").map(|v| v.trim().parse::<u32>()) {
            Some(Ok(course)) => courses.push(course),
            _ => log::debug!("Skipping course option '{}'", sanitize(&option.text())),
        }
    }

    Ok(RatingIndex { ratings, courses })
}

/// Rows of the first table on the page, header row skipped.
pub fn parse_rating_table(document: &Document) -> Result<RatingTable, ParseError> {
    let table = document.find_first(&Query::tag("table"))?;

    let mut rows = Vec::new();
    for (i, tr) in table.find_all(&Query::tag("tr"))?.iter().enumerate().skip(1) {
        let cells: Vec<String> = tr
            .find_all(&Query::tag("td"))?
            .iter()
            .map(|td| td.text())
            .collect();
        rows.push(parse_rating_row(i, &cells)?);
    }

    Ok(RatingTable::new(rows))
}

fn parse_number<T: std::str::FromStr>(row: usize, cell: usize, text: &str) -> Result<T, ParseError> {
    text.parse::<T>().map_err(|_| ParseError::MalformedRow {
        row,
        cell,
        value: text.to_string(),
    })
}

fn parse_grade<T: std::str::FromStr + Into<f64>>(
    row: usize,
    cell: usize,
    text: &str,
) -> Result<f64, ParseError> {
    if text.is_empty() {
        return Ok(f64::NAN);
    }
    parse_number::<T>(row, cell, text).map(Into::into)
}

/// Cells: student, position, mean grade, min grade, percentile, GPA.
pub fn parse_rating_row(row: usize, cells: &[String]) -> Result<RatingRow, ParseError> {
    if cells.len() < RATING_COLUMNS {
        return Err(ParseError::ShortRow {
            row,
            found: cells.len(),
            expected: RATING_COLUMNS,
        });
    }
    let cells: Vec<String> = cells.iter().map(|c| sanitize(c)).collect();

    let percentile = cells[4].strip_suffix('%').unwrap_or(&cells[4]).trim_end();

    Ok(RatingRow {
        student: cells[0].clone(),
        position: cells[1].clone(),
        mean_grade: parse_grade::<f64>(row, 2, &cells[2])?,
        min_grade: parse_grade::<i32>(row, 3, &cells[3])?,
        percentile: parse_number(row, 4, percentile)?,
        gpa: parse_number(row, 5, &cells[5])?,
    })
}
