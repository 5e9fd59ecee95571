//! Encyclopedia evidence through the MediaWiki action API

use paperlens_common::{Evidence, FactCheckConfig};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

use crate::FactCheckError;

/// Retrieves background text for a claim
pub trait EvidenceSource {
    /// `Ok(None)` when the source has nothing for `query`
    fn fetch(&self, query: &str) -> Result<Option<Evidence>, FactCheckError>;
}

impl<T: EvidenceSource + ?Sized> EvidenceSource for &T {
    fn fetch(&self, query: &str) -> Result<Option<Evidence>, FactCheckError> {
        (**self).fetch(query)
    }
}

impl<T: EvidenceSource + ?Sized> EvidenceSource for Box<T> {
    fn fetch(&self, query: &str) -> Result<Option<Evidence>, FactCheckError> {
        (**self).fetch(query)
    }
}

/// Looks the query up as a page title and returns the page's intro section
pub struct WikipediaClient {
    agent: ureq::Agent,
    endpoint: String,
}

impl WikipediaClient {
    #[must_use]
    pub fn new(config: &FactCheckConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build();
        Self {
            agent,
            endpoint: config.endpoint.clone(),
        }
    }
}

/// `query` as a single `titles=` value.
///
/// `|` separates titles in the API and is never part of a page title, so a
/// query containing it names no page.
fn page_title(query: &str) -> Option<&str> {
    let title = query.trim();
    (!title.is_empty() && !title.contains('|')).then_some(title)
}

impl EvidenceSource for WikipediaClient {
    fn fetch(&self, query: &str) -> Result<Option<Evidence>, FactCheckError> {
        let Some(title) = page_title(query) else {
            debug!("'{}' is not a valid page title", query);
            return Ok(None);
        };
        info!("Querying {} for '{}'", self.endpoint, title);
        let response = self
            .agent
            .get(&self.endpoint)
            .query("action", "query")
            .query("format", "json")
            .query("prop", "extracts|info")
            .query("exintro", "1")
            .query("explaintext", "1")
            .query("inprop", "url")
            .query("redirects", "1")
            .query("titles", title)
            .call()
            .map_err(|e| FactCheckError::Network(e.to_string()))?;

        let body: QueryResponse = response
            .into_json()
            .map_err(|e| FactCheckError::InvalidResponse(e.to_string()))?;
        let evidence = evidence_from_response(body);
        debug!("Evidence found: {}", evidence.is_some());
        Ok(evidence)
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    query: Option<QueryBody>,
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    #[serde(default)]
    pages: BTreeMap<String, WikiPage>,
}

#[derive(Debug, Deserialize)]
struct WikiPage {
    #[serde(default)]
    missing: Option<serde_json::Value>,
    #[serde(default)]
    invalid: Option<serde_json::Value>,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    fullurl: Option<String>,
}

fn evidence_from_response(response: QueryResponse) -> Option<Evidence> {
    response
        .query?
        .pages
        .into_values()
        .find(|page| page.missing.is_none() && page.invalid.is_none())
        .map(|page| Evidence {
            summary: page.extract.unwrap_or_default(),
            url: page.fullurl.unwrap_or_default(),
        })
}
