//! Best-effort contact discovery from public web search results.
//!
//! One enrichment call runs this pipeline:
//! 1. Append site-scoping hints to the free text
//! 2. GET the search results page (bounded timeout)
//! 3. Pull destination URLs out of the result redirect anchors
//! 4. Fetch each destination page concurrently (own timeout each)
//! 5. Scan page bodies for phone numbers and email addresses
//!
//! Failure of step 2 yields `EnrichmentResult::Failed`. Failures in step 4 are
//! absorbed per page.
use crate::config::Config;
use crate::errors::AppError;
use crate::models::{ContactSignals, EnrichmentResult};
use futures::future::join_all;
use moka::future::Cache;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

/// 8-digit local numbers, optionally prefixed with the 502 country code.
/// Separators stay on one line: space, no-break space, dot or hyphen.
static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+502[ \x{A0}.-]?|\b502[ \x{A0}.-]?|\b)\d{4}[ \x{A0}.-]?\d{4}\b")
        .expect("valid phone regex")
});

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email regex")
});

/// Destination pages are read up to this many bytes.
pub const MAX_PAGE_BYTES: usize = 1024 * 1024;

/// Asset file names that look like emails (`logo@2x.png`).
const ASSET_SUFFIXES: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg"];

pub struct WebEnricher {
    client: Client,
    search_url: Url,
    site_hints: Vec<String>,
    max_links: usize,
    fetch_pages: bool,
    search_timeout: Duration,
    page_timeout: Duration,
    user_agent: String,
    cache: Option<Cache<String, ContactSignals>>,
}

impl WebEnricher {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let search_url = Url::parse(&config.search_url).map_err(|e| {
            AppError::Internal(format!("invalid search URL '{}': {}", config.search_url, e))
        })?;

        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {}", e)))?;

        let cache = (config.cache_ttl_secs > 0).then(|| {
            Cache::builder()
                .time_to_live(Duration::from_secs(config.cache_ttl_secs))
                .max_capacity(1_000)
                .build()
        });

        Ok(Self {
            client,
            search_url,
            site_hints: config.site_hints.clone(),
            max_links: config.max_links,
            fetch_pages: config.fetch_pages,
            search_timeout: Duration::from_secs(config.search_timeout_secs),
            page_timeout: Duration::from_secs(config.page_timeout_secs),
            user_agent: config.user_agent.clone(),
            cache,
        })
    }

    /// Free text followed by `site:` hints joined with `OR`.
    pub fn build_search_query(&self, free_text: &str) -> String {
        if self.site_hints.is_empty() {
            return free_text.to_string();
        }
        let hints = self
            .site_hints
            .iter()
            .map(|site| format!("site:{}", site))
            .collect::<Vec<_>>()
            .join(" OR ");
        format!("{} {}", free_text, hints)
    }

    /// Runs the pipeline for `free_text`. Never returns an error; failures are
    /// reported inside the result.
    pub async fn enrich(&self, free_text: &str) -> EnrichmentResult {
        let text = free_text.trim();
        if text.is_empty() {
            return EnrichmentResult::empty();
        }

        let cache_key = text.to_lowercase();
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&cache_key).await {
                tracing::debug!("Enrichment cache HIT for '{}'", cache_key);
                return EnrichmentResult::Found(hit);
            }
        }

        match self.discover(text).await {
            Ok(signals) => {
                tracing::info!(
                    links = signals.links.len(),
                    phones = signals.phones.len(),
                    emails = signals.emails.len(),
                    "Enrichment finished"
                );
                if let Some(cache) = &self.cache {
                    cache.insert(cache_key, signals.clone()).await;
                }
                EnrichmentResult::Found(signals)
            }
            Err(e) => {
                tracing::warn!("Enrichment failed for '{}': {}", text, e);
                EnrichmentResult::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    async fn discover(&self, text: &str) -> Result<ContactSignals, AppError> {
        let query = self.build_search_query(text);
        let html = self.fetch_search_page(&query).await?;
        let links = extract_result_links(&html, &self.search_url, self.max_links)?;

        tracing::debug!("Search returned {} result links", links.len());

        let mut signals = ContactSignals {
            links,
            ..Default::default()
        };

        if self.fetch_pages && !signals.links.is_empty() {
            let bodies = join_all(signals.links.iter().map(|link| self.fetch_page(link))).await;
            for body in bodies.into_iter().flatten() {
                scan_contacts(&body, &mut signals);
            }
        }

        Ok(signals)
    }

    async fn fetch_search_page(&self, query: &str) -> Result<String, AppError> {
        let mut url = self.search_url.clone();
        url.query_pairs_mut().append_pair("q", query);

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, self.user_agent.as_str())
            .header(ACCEPT_LANGUAGE, "es-GT,es;q=0.9,en;q=0.8")
            .timeout(self.search_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::EnrichmentFailure(format!(
                "search endpoint returned status {}",
                status
            )));
        }

        Ok(response.text().await?)
    }

    /// Destination page body, or `None` when the fetch fails for any reason.
    async fn fetch_page(&self, link: &str) -> Option<String> {
        match self.get_page_body(link).await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::debug!("Skipping {}: {}", link, e);
                None
            }
        }
    }

    async fn get_page_body(&self, link: &str) -> Result<String, reqwest::Error> {
        let mut response = self
            .client
            .get(link)
            .header(USER_AGENT, self.user_agent.as_str())
            .timeout(self.page_timeout)
            .send()
            .await?
            .error_for_status()?;

        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            let room = MAX_PAGE_BYTES - body.len();
            if chunk.len() >= room {
                body.extend_from_slice(&chunk[..room]);
                tracing::debug!("Truncated {} at {} bytes", link, MAX_PAGE_BYTES);
                break;
            }
            body.extend_from_slice(&chunk);
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// Destination URL of a search-result redirect anchor (`/url?q=<dest>&...`).
///
/// Relative hrefs are resolved against `base`; absolute ones must point at the
/// search engine's own host. Only `http`/`https` destinations are returned.
pub fn redirect_target(href: &str, base: &Url) -> Option<String> {
    let resolved = base.join(href).ok()?;
    if resolved.path() != "/url" || resolved.host_str() != base.host_str() {
        return None;
    }

    let target = resolved
        .query_pairs()
        .find(|(key, _)| key == "q" || key == "url")
        .map(|(_, value)| value.into_owned())?;

    let destination = Url::parse(&target).ok()?;
    matches!(destination.scheme(), "http" | "https").then_some(target)
}

/// Unique destination links in page order, at most `max_links`.
pub fn extract_result_links(
    html: &str,
    base: &Url,
    max_links: usize,
) -> Result<Vec<String>, AppError> {
    let document = Html::parse_document(html);
    let anchors = Selector::parse("a[href]")
        .map_err(|e| AppError::EnrichmentFailure(format!("invalid anchor selector: {:?}", e)))?;

    let mut links: Vec<String> = Vec::new();
    for anchor in document.select(&anchors) {
        if links.len() >= max_links {
            break;
        }
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(target) = redirect_target(href, base) else {
            continue;
        };
        if !links.contains(&target) {
            links.push(target);
        }
    }

    Ok(links)
}

/// Adds every phone- and email-like string in `text` to `signals`.
pub fn scan_contacts(text: &str, signals: &mut ContactSignals) {
    for found in PHONE_RE.find_iter(text) {
        signals.phones.insert(found.as_str().trim().to_string());
    }

    for found in EMAIL_RE.find_iter(text) {
        let email = found.as_str();
        let lower = email.to_ascii_lowercase();
        if ASSET_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix)) {
            continue;
        }
        signals.emails.insert(email.to_string());
    }
}
