//! Record extraction from fetched HTML
//!
//! This module turns a fetched document into:
//! - Article records (title, absolute link, optional date)
//! - Pagination links (a "next" relation, a "next" label, or the keyword in
//!   the path of a link that is not itself an article)
//! - Content links eligible for deeper traversal
//!
//! Two named strategies exist and exactly one runs per extractor:
//! structural article containers (`Articles`, the default) and generic
//! anchor scraping (`Anchors`) for pages without article containers.

use crate::config::{ExtractConfig, ExtractStrategy};
use crate::url::{clean_text, is_inert_link, resolve_link};
use crate::HarvestError;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

/// One extracted article
///
/// `title` and `url` are never empty; `url` is absolute. `date` is whatever
/// text the page showed, possibly empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    pub title: String,
    #[serde(alias = "link")]
    pub url: String,
    #[serde(default)]
    pub date: String,
}

impl Record {
    pub fn new(title: String, url: String, date: String) -> Self {
        Self { title, url, date }
    }
}

/// Everything the traversal engine needs from one page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Records found on the page
    pub records: Vec<Record>,

    /// Next-page links, deduplicated, in document order
    pub pagination: Vec<Url>,

    /// Record links that are not also pagination links
    pub links: Vec<Url>,
}

/// Compiled extraction rules
///
/// Selectors are compiled once here; extraction itself cannot fail, so a page
/// with no matches simply yields nothing.
#[derive(Debug)]
pub struct Extractor {
    strategy: ExtractStrategy,
    article: Selector,
    title: Selector,
    link: Selector,
    date: Selector,
    pagination: Selector,
    anchors: Selector,
    pagination_keyword: String,
}

impl Extractor {
    /// Compiles the configured selectors
    ///
    /// # Returns
    ///
    /// * `Ok(Extractor)` - Every selector compiled
    /// * `Err(HarvestError::Parse)` - A selector is not valid CSS
    pub fn new(config: &ExtractConfig) -> Result<Self, HarvestError> {
        Ok(Self {
            strategy: config.strategy,
            article: compile("article_selector", &config.article_selector)?,
            title: compile("title_selector", &config.title_selector)?,
            link: compile("link_selector", &config.link_selector)?,
            date: compile("date_selector", &config.date_selector)?,
            pagination: compile("pagination_selector", &config.pagination_selector)?,
            anchors: compile("anchor selector", "a[href]")?,
            pagination_keyword: config.pagination_keyword.trim().to_lowercase(),
        })
    }

    /// Extracts records from a document using the configured strategy
    ///
    /// # Example
    ///
    /// ```
    /// use article_harvester::config::ExtractConfig;
    /// use article_harvester::crawler::Extractor;
    /// use url::Url;
    ///
    /// let extractor = Extractor::new(&ExtractConfig::default()).unwrap();
    /// let html = r#"<div class="article"><h2> Hello </h2><a href="/p/1">x</a></div>"#;
    /// let base = Url::parse("http://example.com").unwrap();
    ///
    /// let records = extractor.extract(html, &base);
    /// assert_eq!(records[0].title, "Hello");
    /// assert_eq!(records[0].url, "http://example.com/p/1");
    /// assert_eq!(records[0].date, "");
    /// ```
    pub fn extract(&self, html: &str, base_url: &Url) -> Vec<Record> {
        let document = Html::parse_document(html);
        self.extract_records(&document, base_url)
    }

    /// Parses a page once and returns its records and successor links
    pub fn parse_page(&self, html: &str, base_url: &Url) -> ParsedPage {
        let document = Html::parse_document(html);

        let records = self.extract_records(&document, base_url);
        let record_urls: HashSet<&str> = records.iter().map(|r| r.url.as_str()).collect();
        let pagination = self.pagination_links(&document, base_url, &record_urls);

        let pagination_set: HashSet<&str> = pagination.iter().map(Url::as_str).collect();
        let mut seen = HashSet::new();
        let links = records
            .iter()
            .filter_map(|record| Url::parse(&record.url).ok())
            .filter(|url| !pagination_set.contains(url.as_str()))
            .filter(|url| seen.insert(url.to_string()))
            .collect();

        ParsedPage {
            records,
            pagination,
            links,
        }
    }

    fn extract_records(&self, document: &Html, base_url: &Url) -> Vec<Record> {
        match self.strategy {
            ExtractStrategy::Articles => self.extract_articles(document, base_url),
            ExtractStrategy::Anchors => self.extract_anchors(document, base_url),
        }
    }

    /// Structural mode: one record per article container
    fn extract_articles(&self, document: &Html, base_url: &Url) -> Vec<Record> {
        let mut records = Vec::new();

        for article in document.select(&self.article) {
            let title = first_text(&article, &self.title);
            let href = article
                .select(&self.link)
                .find_map(|element| element.value().attr("href"))
                .unwrap_or("");
            let date = first_text(&article, &self.date);

            let url = match resolve_link(href, base_url) {
                Some(url) => url,
                None => {
                    tracing::trace!("Skipping article '{}' without usable link", title);
                    continue;
                }
            };

            if title.is_empty() {
                tracing::trace!("Skipping untitled article linking to {}", url);
                continue;
            }

            tracing::trace!("Article: {} -> {} ({})", title, url, date);
            records.push(Record::new(title, url.to_string(), date));
        }

        records
    }

    /// Generic mode: one record per titled, non-inert anchor
    fn extract_anchors(&self, document: &Html, base_url: &Url) -> Vec<Record> {
        document
            .select(&self.anchors)
            .filter_map(|anchor| {
                let href = anchor.value().attr("href")?;
                if is_inert_link(href) {
                    return None;
                }

                let title = clean_text(&anchor.text().collect::<String>());
                if title.is_empty() {
                    return None;
                }

                let url = resolve_link(href, base_url)?;
                Some(Record::new(title, url.to_string(), String::new()))
            })
            .collect()
    }

    /// Collects next-page links
    ///
    /// A link counts as pagination when it matches the pagination selector.
    /// Otherwise an anchor counts when its whole text is a "next" label, or
    /// when the keyword appears in its path or query and it is not one of
    /// the page's record links.
    fn pagination_links(
        &self,
        document: &Html,
        base_url: &Url,
        record_urls: &HashSet<&str>,
    ) -> Vec<Url> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        let mut push = |url: Url| {
            if url.as_str() != base_url.as_str() && seen.insert(url.to_string()) {
                links.push(url);
            }
        };

        for element in document.select(&self.pagination) {
            if let Some(url) = element
                .value()
                .attr("href")
                .and_then(|href| resolve_link(href, base_url))
            {
                push(url);
            }
        }

        if !self.pagination_keyword.is_empty() {
            for anchor in document.select(&self.anchors) {
                let Some(url) = anchor
                    .value()
                    .attr("href")
                    .and_then(|href| resolve_link(href, base_url))
                else {
                    continue;
                };
                let text = anchor.text().collect::<String>();

                if is_pagination_label(&text, &self.pagination_keyword)
                    || (!record_urls.contains(url.as_str()) && self.keyword_in_target(&url))
                {
                    push(url);
                }
            }
        }

        links
    }

    /// Keyword in the path or query; the host is never inspected
    fn keyword_in_target(&self, url: &Url) -> bool {
        let mut target = url.path().to_lowercase();
        if let Some(query) = url.query() {
            target.push('?');
            target.push_str(&query.to_lowercase());
        }
        target.contains(&self.pagination_keyword)
    }
}

/// Returns true for link text such as "Next", "next »" or "Next page"
///
/// The keyword must be a whole word at the start of a short label, so titles
/// like "Next-gen batteries" do not count.
fn is_pagination_label(text: &str, keyword: &str) -> bool {
    let text = clean_text(text).to_lowercase();
    let label = text.trim_matches(|c: char| !c.is_alphanumeric());

    if label == keyword {
        return true;
    }

    match label.strip_prefix(keyword) {
        Some(rest) => rest.starts_with(' ') && label.split_whitespace().count() <= 3,
        None => false,
    }
}

fn compile(name: &str, selector: &str) -> Result<Selector, HarvestError> {
    Selector::parse(selector).map_err(|e| HarvestError::Parse {
        context: name.to_string(),
        message: format!("'{}': {:?}", selector, e),
    })
}

/// Cleaned text of the first element under `scope` matching `selector`
fn first_text(scope: &ElementRef<'_>, selector: &Selector) -> String {
    scope
        .select(selector)
        .next()
        .map(|element| clean_text(&element.text().collect::<String>()))
        .unwrap_or_default()
}
