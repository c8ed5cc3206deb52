//! A small typed query layer over `scraper`'s document tree.
//!
//! Queries match on tag name, optionally narrowed by class and id, and return
//! matches in document order.

use scraper::{ElementRef, Html, Selector};

use crate::config::MarkupParser;
use crate::parser::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    tag: String,
    classes: Vec<String>,
    id: Option<String>,
}

impl Query {
    pub fn tag(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            classes: Vec::new(),
            id: None,
        }
    }

    /// Require every whitespace-separated class in `class`.
    pub fn class(mut self, class: &str) -> Self {
        self.classes
            .extend(class.split_whitespace().map(str::to_string));
        self
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    fn selector(&self) -> Result<Selector, ParseError> {
        Selector::parse(&self.tag)
            .map_err(|e| ParseError::InvalidSelector(format!("{}: {}", self.tag, e)))
    }

    fn matches(&self, element: &ElementRef) -> bool {
        let value = element.value();
        if let Some(id) = &self.id
            && value.id() != Some(id.as_str())
        {
            return false;
        }
        self.classes
            .iter()
            .all(|wanted| value.classes().any(|c| c == wanted))
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag)?;
        if let Some(id) = &self.id {
            write!(f, "#{}", id)?;
        }
        for class in &self.classes {
            write!(f, ".{}", class)?;
        }
        Ok(())
    }
}

pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(html: &str, parser: MarkupParser) -> Self {
        let html = match parser {
            MarkupParser::Document => Html::parse_document(html),
            MarkupParser::Fragment => Html::parse_fragment(html),
        };
        Self { html }
    }

    pub fn find_all(&self, query: &Query) -> Result<Vec<Node<'_>>, ParseError> {
        let selector = query.selector()?;
        Ok(self
            .html
            .select(&selector)
            .filter(|e| query.matches(e))
            .map(Node)
            .collect())
    }

    /// First match, or `StructuralMismatch` naming the query.
    pub fn find_first(&self, query: &Query) -> Result<Node<'_>, ParseError> {
        self.find_all(query)?
            .into_iter()
            .next()
            .ok_or_else(|| ParseError::StructuralMismatch(format!("no `{}` on page", query)))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Node<'a>(ElementRef<'a>);

impl<'a> Node<'a> {
    /// Matching descendants, excluding the node itself.
    pub fn find_all(&self, query: &Query) -> Result<Vec<Node<'a>>, ParseError> {
        let selector = query.selector()?;
        Ok(self
            .0
            .select(&selector)
            .filter(|e| *e != self.0 && query.matches(e))
            .map(Node)
            .collect())
    }

    pub fn find_first(&self, query: &Query) -> Result<Node<'a>, ParseError> {
        self.find_all(query)?.into_iter().next().ok_or_else(|| {
            ParseError::StructuralMismatch(format!(
                "no `{}` inside <{}>",
                query,
                self.0.value().name()
            ))
        })
    }

    /// Concatenated text of the node and its descendants, untrimmed.
    pub fn text(&self) -> String {
        self.0.text().collect::<String>()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.0.value().attr(name)
    }

    pub fn tag_name(&self) -> &'a str {
        self.0.value().name()
    }
}
