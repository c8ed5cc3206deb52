//! Rating tables of a single program.

use crate::catalog::ProgramCatalog;
use crate::fetcher::{PageSource, ScraperError};
use crate::parser::{parse_rating_index, parse_rating_table};
use crate::types::{RatingIndex, RatingTable};

/// Fetches rating tables for the program it was created for. The program
/// code is resolved once, when the fetcher is built.
#[derive(Debug)]
pub struct RatingFetcher<'a, S> {
    catalog: &'a ProgramCatalog<S>,
    program: String,
    code: String,
}

impl<'a, S: PageSource> RatingFetcher<'a, S> {
    pub fn new(program: &str, catalog: &'a ProgramCatalog<S>) -> Result<Self, ScraperError> {
        let code = catalog
            .get()?
            .program_code(program)
            .ok_or_else(|| ScraperError::UnknownProgram(program.to_string()))?
            .to_string();
        log::debug!("Program '{}' resolved to code '{}'", program, code);

        Ok(Self {
            catalog,
            program: program.to_string(),
            code,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Rating views and courses listed on the program's rating index page.
    pub fn options(&self) -> Result<RatingIndex, ScraperError> {
        let url = self.catalog.config().ratings_index_url(&self.code);
        let document = self.catalog.fetcher().fetch(&url)?;
        Ok(parse_rating_index(&document)?)
    }

    /// Table of the rating view named `rating_name` for `course`.
    ///
    /// The course is only checked against the course selector; the number
    /// itself goes into the query string.
    pub fn fetch(&self, rating_name: &str, course: u32) -> Result<RatingTable, ScraperError> {
        let index = self.options()?;
        let from = &index
            .find_rating(rating_name)
            .ok_or_else(|| ScraperError::UnknownRating(rating_name.to_string()))?
            .from;
        if !index.has_course(course) {
            return Err(ScraperError::InvalidCourse(course));
        }

        let url = self
            .catalog
            .config()
            .ratings_table_url(&self.code, from, course);
        let document = self.catalog.fetcher().fetch(&url)?;
        let table = parse_rating_table(&document)?;
        log::info!(
            "Parsed {} row(s) of '{}' (course {}) for {}",
            table.len(),
            rating_name,
            course,
            self.program
        );
        Ok(table)
    }
}
