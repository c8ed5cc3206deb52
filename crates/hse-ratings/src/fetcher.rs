use crate::config::{MarkupParser, ScraperConfig};
use crate::markup::Document;
use crate::parser::ParseError;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Bad response status code: {code}")]
    BadResponse { code: u16 },
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("There is no program '{0}' in the educational program list")]
    UnknownProgram(String),
    #[error("Irregular rating page or incorrect rating name '{0}'")]
    UnknownRating(String),
    #[error("Course {0} is not offered on the rating page")]
    InvalidCourse(u32),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Anything that can turn a URL into page markup.
pub trait PageSource {
    fn get_html(&self, url: &str) -> Result<String, ScraperError>;
}

#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(config: &ScraperConfig) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }
}

impl PageSource for HttpSource {
    fn get_html(&self, url: &str) -> Result<String, ScraperError> {
        let response = self
            .client
            .get(url)
            .send()
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))?;

        let status = response.status();
        if status != StatusCode::OK {
            log::error!("{} answered with {}", url, status);
            return Err(ScraperError::BadResponse {
                code: status.as_u16(),
            });
        }

        Ok(response
            .text()
            .inspect_err(|e| log::error!("Decode error: {e:?}"))?)
    }
}

/// Fetches a page and parses it into a queryable [`Document`].
#[derive(Debug, Clone)]
pub struct Fetcher<S> {
    source: S,
    parser: MarkupParser,
}

impl<S: PageSource> Fetcher<S> {
    pub fn new(source: S, parser: MarkupParser) -> Self {
        Self { source, parser }
    }

    pub fn fetch(&self, url: &str) -> Result<Document, ScraperError> {
        log::info!("Fetching {}", url);
        let html = self.source.get_html(url)?;
        Ok(Document::parse(&html, self.parser))
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{PageSource, ScraperError};

    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory pages keyed by URL, recording every request.
    #[derive(Debug, Default)]
    pub struct FixtureSource {
        pages: RefCell<HashMap<String, Result<String, u16>>>,
        requests: RefCell<Vec<String>>,
    }

    impl FixtureSource {
        pub fn with_page(self, url: &str, html: &str) -> Self {
            self.set_page(url, html);
            self
        }

        pub fn with_status(self, url: &str, code: u16) -> Self {
            self.pages.borrow_mut().insert(url.to_string(), Err(code));
            self
        }

        pub fn set_page(&self, url: &str, html: &str) {
            self.pages
                .borrow_mut()
                .insert(url.to_string(), Ok(html.to_string()));
        }

        pub fn total_requests(&self) -> usize {
            self.requests.borrow().len()
        }

        pub fn request_count(&self, url: &str) -> usize {
            self.requests.borrow().iter().filter(|u| *u == url).count()
        }
    }

    impl PageSource for FixtureSource {
        fn get_html(&self, url: &str) -> Result<String, ScraperError> {
            self.requests.borrow_mut().push(url.to_string());
            match self.pages.borrow().get(url) {
                Some(Ok(html)) => Ok(html.clone()),
                Some(Err(code)) => Err(ScraperError::BadResponse { code: *code }),
                None => Err(ScraperError::BadResponse { code: 404 }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FixtureSource;
    use super::*;
    use crate::markup::Query;

    #[test]
    fn test_fetch_parses_page() {
        let source = FixtureSource::default().with_page("https://a/", "<p class=\"x\">hi</p>");
        let fetcher = Fetcher::new(source, MarkupParser::Document);
        let doc = fetcher.fetch("https://a/").expect("Failed to fetch");
        let p = doc.find_first(&Query::tag("p").class("x")).unwrap();
        assert_eq!(p.text(), "hi");
    }

    #[test]
    fn test_bad_status_carries_code() {
        let source = FixtureSource::default().with_status("https://a/", 503);
        let fetcher = Fetcher::new(source, MarkupParser::Document);
        match fetcher.fetch("https://a/") {
            Err(ScraperError::BadResponse { code }) => assert_eq!(code, 503),
            other => panic!("expected BadResponse, got {:?}", other.map(|_| ())),
        }
        assert_eq!(fetcher.source().request_count("https://a/"), 1);
    }

    #[test]
    fn test_bad_response_message() {
        let err = ScraperError::BadResponse { code: 404 };
        assert_eq!(err.to_string(), "Bad response status code: 404");
    }
}
