pub mod catalog;
pub mod config;
pub mod fetcher;
pub mod markup;
mod parser;
pub mod ratings;
pub mod types;
pub mod utils;

pub use catalog::ProgramCatalog;
pub use config::{MarkupParser, ScraperConfig};
pub use fetcher::{Fetcher, HttpSource, PageSource, ScraperError};
pub use parser::ParseError;
pub use ratings::RatingFetcher;
pub use types::{Catalog, RatingIndex, RatingOption, RatingRow, RatingTable};

pub(crate) const LISTING_URL: &str = "https://www.hse.ru/education/msk/bachelor/";
pub(crate) const RATINGS_BASE_URL: &str = "https://www.hse.ru/ba";
