use serde::Deserialize;

/// Default site-scoping hints appended to every enrichment search.
pub const DEFAULT_SITE_HINTS: &[&str] = &["facebook.com", "linkedin.com", "instagram.com"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub excel_path: String,
    pub sheet_name: String,
    pub search_url: String,
    pub search_timeout_secs: u64,
    pub page_timeout_secs: u64,
    pub max_links: usize,
    pub fetch_pages: bool,
    pub site_hints: Vec<String>,
    pub cache_ttl_secs: u64,
    pub user_agent: String,
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T> {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} has an invalid value: {}", key, raw)),
        _ => Ok(default),
    }
}

fn parse_bool_env(key: &str, default: bool) -> anyhow::Result<bool> {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "" => Ok(default),
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => anyhow::bail!("{} must be true or false, got: {}", key, raw),
        },
        Err(_) => Ok(default),
    }
}

/// Splits a comma-separated hint list, dropping blanks.
pub fn parse_site_hints(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: parse_env("PORT", 8000u16)
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            excel_path: std::env::var("EXCEL_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "Plantilla_Basedatos.xlsx".to_string()),
            sheet_name: std::env::var("SHEET_NAME")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "Base tel".to_string()),
            search_url: {
                let url = std::env::var("SEARCH_URL")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| "https://www.google.com/search".to_string());
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    anyhow::bail!("SEARCH_URL must start with http:// or https://");
                }
                url
            },
            search_timeout_secs: parse_env("SEARCH_TIMEOUT_SECS", 7u64)?,
            page_timeout_secs: parse_env("PAGE_TIMEOUT_SECS", 7u64)?,
            max_links: parse_env("ENRICH_MAX_LINKS", 10usize).and_then(|n| {
                if n == 0 || n > 50 {
                    anyhow::bail!("ENRICH_MAX_LINKS must be between 1 and 50");
                }
                Ok(n)
            })?,
            fetch_pages: parse_bool_env("ENRICH_FETCH_PAGES", true)?,
            site_hints: std::env::var("ENRICH_SITE_HINTS")
                .map(|raw| parse_site_hints(&raw))
                .unwrap_or_else(|_| DEFAULT_SITE_HINTS.iter().map(|s| s.to_string()).collect()),
            cache_ttl_secs: parse_env("ENRICH_CACHE_TTL_SECS", 300u64)?,
            user_agent: std::env::var("USER_AGENT")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "Mozilla/5.0".to_string()),
        };

        if config.search_timeout_secs == 0 || config.page_timeout_secs == 0 {
            anyhow::bail!("SEARCH_TIMEOUT_SECS and PAGE_TIMEOUT_SECS must be greater than zero");
        }

        tracing::debug!("Excel source: {} (sheet '{}')", config.excel_path, config.sheet_name);
        tracing::debug!("Search URL: {}", config.search_url);
        tracing::debug!(
            "Enrichment: max_links={}, fetch_pages={}, hints={:?}",
            config.max_links,
            config.fetch_pages,
            config.site_hints
        );
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}
