//! Program catalog: which programs exist, which faculty runs them, and the
//! URL code each program's rating pages are keyed by.
//!
//! The listing page is fetched once per [`ProgramCatalog`]. A failed build
//! leaves the catalog unloaded so the next [`ProgramCatalog::get`] retries.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::ScraperConfig;
use crate::fetcher::{Fetcher, HttpSource, PageSource, ScraperError};
use crate::parser::parse_program_listing;
use crate::ratings::RatingFetcher;
use crate::types::{Catalog, ListingItem};

#[derive(Debug)]
enum LoadState {
    Unloaded,
    Loaded(Arc<Catalog>),
}

#[derive(Debug)]
pub struct ProgramCatalog<S = HttpSource> {
    fetcher: Fetcher<S>,
    config: ScraperConfig,
    state: Mutex<LoadState>,
}

impl ProgramCatalog<HttpSource> {
    pub fn new() -> Result<Self, ScraperError> {
        Self::with_config(ScraperConfig::default())
    }

    pub fn with_config(config: ScraperConfig) -> Result<Self, ScraperError> {
        let source = HttpSource::new(&config)?;
        Ok(Self::with_source(source, config))
    }
}

impl<S: PageSource> ProgramCatalog<S> {
    pub fn with_source(source: S, config: ScraperConfig) -> Self {
        Self {
            fetcher: Fetcher::new(source, config.parser),
            config,
            state: Mutex::new(LoadState::Unloaded),
        }
    }

    /// Build the catalog on first use, then hand out the cached copy.
    ///
    /// The lock is held for the whole build, so concurrent callers wait for a
    /// single fetch and all observe the same result.
    pub fn get(&self) -> Result<Arc<Catalog>, ScraperError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let LoadState::Loaded(catalog) = &*state {
            return Ok(Arc::clone(catalog));
        }

        let catalog = Arc::new(self.build()?);
        log::info!(
            "Catalog loaded: {} program(s) across {} faculties",
            catalog.programs.len(),
            catalog.faculties.len()
        );
        *state = LoadState::Loaded(Arc::clone(&catalog));
        Ok(catalog)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(
            *self.state.lock().unwrap_or_else(PoisonError::into_inner),
            LoadState::Loaded(_)
        )
    }

    /// Rating fetcher scoped to one program of this catalog.
    pub fn ratings(&self, program: &str) -> Result<RatingFetcher<'_, S>, ScraperError> {
        RatingFetcher::new(program, self)
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &Fetcher<S> {
        &self.fetcher
    }

    fn build(&self) -> Result<Catalog, ScraperError> {
        let document = self.fetcher.fetch(&self.config.listing_url)?;
        let items = parse_program_listing(&document)?;
        Ok(build_catalog(items, &self.config))
    }
}

/// Program code for a listing entry that passes the town, degree and domain
/// filters.
fn target_program_code<'a>(item: &'a ListingItem, config: &ScraperConfig) -> Option<&'a str> {
    if !config.target_towns.contains(&item.town) {
        return None;
    }

    let segments: Vec<&str> = item.href.split('/').collect();
    if !segments.contains(&config.degree_marker.as_str()) {
        return None;
    }
    let domain = segments.get(config.domain_segment)?;
    if !config.allowed_domains.iter().any(|d| d == domain) {
        return None;
    }

    segments.len().checked_sub(2).map(|i| segments[i])
}

pub fn build_catalog(
    items: impl IntoIterator<Item = ListingItem>,
    config: &ScraperConfig,
) -> Catalog {
    let mut catalog = Catalog::default();

    for item in items {
        let Some(code) = target_program_code(&item, config) else {
            log::debug!("Skipping '{}' ({}, {})", item.name, item.town, item.href);
            continue;
        };
        catalog.programs.insert(item.name.clone(), code.to_string());
        catalog
            .faculties
            .entry(item.faculty)
            .or_default()
            .insert(item.name);
    }

    merge_faculty_aliases(&mut catalog.faculties);
    catalog
}

/// Fold every faculty whose name is a strict substring of another faculty's
/// name into each faculty containing it, then drop it.
///
/// Containment is transitive, so the surviving sets do not depend on the
/// order the pairs are visited in: each survivor ends up with its own
/// programs plus those of every faculty whose name it contains.
pub fn merge_faculty_aliases(faculties: &mut BTreeMap<String, BTreeSet<String>>) {
    let mut names: Vec<String> = faculties.keys().cloned().collect();
    names.sort_by_key(|name| name.chars().count());

    let mut aliases = Vec::new();
    for alias in &names {
        let targets: Vec<&String> = names
            .iter()
            .filter(|name| *name != alias && name.contains(alias.as_str()))
            .collect();
        if targets.is_empty() {
            continue;
        }

        let programs = faculties.get(alias).cloned().unwrap_or_default();
        for target in targets {
            log::debug!("Merging faculty '{}' into '{}'", alias, target);
            faculties
                .entry(target.clone())
                .or_default()
                .extend(programs.iter().cloned());
        }
        aliases.push(alias);
    }

    for alias in aliases {
        faculties.remove(alias);
    }
}
