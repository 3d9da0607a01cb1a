//! Record matching.
//!
//! Two modes, picked per query:
//!
//! - **Exact triple**: name, DPI and NIT all supplied. A record matches only when
//!   all three are equal (name compared case-folded).
//! - **Partial**: anything else. Each supplied clause is tested on its own and a
//!   record matches when any clause holds: name is a substring of the full name,
//!   DPI equals, NIT equals, or the free-text `value` is a substring of the
//!   search blob.
//!
//! Comparison is always literal (`==` / `str::contains`), so characters such as
//! `.` or `*` in a query only ever match themselves.

use crate::errors::AppError;
use crate::models::{Record, SearchQuery};
use crate::normalizer::normalize_identifier;
use crate::store::RecordStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    ExactTriple,
    Partial,
}

/// A validated, normalized query ready for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchQuery {
    /// Case-folded, trimmed name fragment.
    name: String,
    national_id: String,
    tax_id: String,
    /// Case-folded, trimmed free text.
    value: String,
}

fn field(raw: &Option<String>) -> &str {
    raw.as_deref().map(str::trim).unwrap_or("")
}

impl MatchQuery {
    /// Normalizes a request. Rejects it when every field is blank.
    pub fn from_search(query: &SearchQuery) -> Result<Self, AppError> {
        let normalized = Self {
            name: field(&query.name).to_lowercase(),
            national_id: normalize_identifier(field(&query.national_id)),
            tax_id: normalize_identifier(field(&query.tax_id)),
            value: field(&query.value).to_lowercase(),
        };

        if normalized.is_empty() {
            return Err(AppError::InvalidQuery(
                "Debe ingresar nombre, DPI o NIT".to_string(),
            ));
        }

        Ok(normalized)
    }

    fn is_empty(&self) -> bool {
        self.name.is_empty()
            && self.national_id.is_empty()
            && self.tax_id.is_empty()
            && self.value.is_empty()
    }

    pub fn mode(&self) -> MatchMode {
        if !self.name.is_empty() && !self.national_id.is_empty() && !self.tax_id.is_empty() {
            MatchMode::ExactTriple
        } else {
            MatchMode::Partial
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Space-joined non-empty fields, lowercase. This is what gets sent to enrichment.
    pub fn effective_text(&self) -> String {
        [
            self.name.as_str(),
            self.national_id.as_str(),
            self.tax_id.as_str(),
            self.value.as_str(),
        ]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
    }

    /// Whether a single record satisfies this query.
    pub fn matches(&self, record: &Record) -> bool {
        match self.mode() {
            MatchMode::ExactTriple => {
                record.full_name().to_lowercase() == self.name
                    && record.national_id() == self.national_id
                    && record.tax_id() == self.tax_id
            }
            MatchMode::Partial => {
                (!self.name.is_empty() && record.full_name().to_lowercase().contains(&self.name))
                    || (!self.national_id.is_empty() && record.national_id() == self.national_id)
                    || (!self.tax_id.is_empty() && record.tax_id() == self.tax_id)
                    || (!self.value.is_empty() && record.search_blob().contains(&self.value))
            }
        }
    }
}

/// Matching records in load order. Lazy and side-effect free.
pub fn find<'a>(
    store: &'a RecordStore,
    query: &'a MatchQuery,
) -> impl Iterator<Item = &'a Record> + 'a {
    store.iter().filter(move |record| query.matches(record))
}
