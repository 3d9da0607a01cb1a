use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One customer entry from the source table.
///
/// Fields are private so the search blob can only be derived by [`Record::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    id: Option<String>,
    full_name: String,
    national_id: String,
    tax_id: String,
    email: String,
    phones: Vec<String>,
    birth_date: Option<String>,
    search_blob: String,
}

/// Field values for a record, already normalized.
#[derive(Debug, Clone, Default)]
pub struct RecordFields {
    pub id: Option<String>,
    pub full_name: String,
    pub national_id: String,
    pub tax_id: String,
    pub email: String,
    pub phones: Vec<String>,
    pub birth_date: Option<String>,
}

impl Record {
    pub fn new(fields: RecordFields) -> Self {
        let search_blob = build_search_blob(
            &fields.full_name,
            &fields.national_id,
            &fields.tax_id,
            &fields.email,
        );
        Self {
            id: fields.id,
            full_name: fields.full_name,
            national_id: fields.national_id,
            tax_id: fields.tax_id,
            email: fields.email,
            phones: fields.phones.into_iter().filter(|p| !p.is_empty()).collect(),
            birth_date: fields.birth_date,
            search_blob,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn national_id(&self) -> &str {
        &self.national_id
    }

    pub fn tax_id(&self) -> &str {
        &self.tax_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Non-empty phones in Tel_1..Tel_5 order.
    pub fn phones(&self) -> &[String] {
        &self.phones
    }

    pub fn birth_date(&self) -> Option<&str> {
        self.birth_date.as_deref()
    }

    pub fn search_blob(&self) -> &str {
        &self.search_blob
    }
}

/// Lowercase space-join of name, national ID, tax ID and email, in that order.
pub fn build_search_blob(full_name: &str, national_id: &str, tax_id: &str, email: &str) -> String {
    [full_name, national_id, tax_id, email].join(" ").to_lowercase()
}

/// Search request body.
///
/// Accepts the legacy Spanish keys (`nombre`, `dpi`, `nit`) and their English aliases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default, rename = "nombre", alias = "name")]
    pub name: Option<String>,
    #[serde(default, rename = "dpi", alias = "nationalId")]
    pub national_id: Option<String>,
    #[serde(default, rename = "nit", alias = "taxId")]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

/// Serialized view of a matched record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalMatch {
    #[serde(rename = "Nombre")]
    pub name: String,
    #[serde(rename = "DPI")]
    pub national_id: String,
    #[serde(rename = "NIT")]
    pub tax_id: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Telefonos")]
    pub phones: Vec<String>,
}

impl From<&Record> for InternalMatch {
    fn from(record: &Record) -> Self {
        Self {
            name: record.full_name().to_string(),
            national_id: record.national_id().to_string(),
            tax_id: record.tax_id().to_string(),
            email: record.email().to_string(),
            phones: record.phones().to_vec(),
        }
    }
}

/// Contact signals scraped for one free-text query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSignals {
    pub links: Vec<String>,
    pub phones: BTreeSet<String>,
    pub emails: BTreeSet<String>,
}

/// Outcome of the enrichment pipeline. Success and error fields never coexist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnrichmentResult {
    Found(ContactSignals),
    Failed { error: String },
}

impl EnrichmentResult {
    pub fn empty() -> Self {
        EnrichmentResult::Found(ContactSignals::default())
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, EnrichmentResult::Failed { .. })
    }

    pub fn signals(&self) -> Option<&ContactSignals> {
        match self {
            EnrichmentResult::Found(signals) => Some(signals),
            EnrichmentResult::Failed { .. } => None,
        }
    }
}

/// Combined response of a search call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub internal: Vec<InternalMatch>,
    pub external: EnrichmentResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ana() -> Record {
        Record::new(RecordFields {
            full_name: "Ana Lopez".to_string(),
            national_id: "12345678".to_string(),
            tax_id: "87654321".to_string(),
            email: "Ana@X.com".to_string(),
            phones: vec!["5555-1111".into(), "".into(), "".into(), "".into(), "".into()],
            ..Default::default()
        })
    }

    #[test]
    fn test_search_blob_is_derived() {
        let record = ana();
        assert_eq!(record.search_blob(), "ana lopez 12345678 87654321 ana@x.com");
        assert_eq!(record.full_name(), "Ana Lopez");
    }

    #[test]
    fn test_empty_phone_slots_dropped() {
        assert_eq!(ana().phones(), &["5555-1111".to_string()]);
    }

    #[test]
    fn test_internal_match_json_shape() {
        let json = serde_json::to_value(InternalMatch::from(&ana())).unwrap();
        assert_eq!(json["Nombre"], "Ana Lopez");
        assert_eq!(json["DPI"], "12345678");
        assert_eq!(json["NIT"], "87654321");
        assert_eq!(json["Telefonos"], serde_json::json!(["5555-1111"]));
    }

    #[test]
    fn test_query_accepts_spanish_and_english_keys() {
        let q: SearchQuery =
            serde_json::from_str(r#"{"nombre":"ana","dpi":"123","nit":"9"}"#).unwrap();
        assert_eq!(q.name.as_deref(), Some("ana"));
        assert_eq!(q.national_id.as_deref(), Some("123"));

        let q: SearchQuery =
            serde_json::from_str(r#"{"name":"ana","nationalId":"123","value":"x"}"#).unwrap();
        assert_eq!(q.national_id.as_deref(), Some("123"));
        assert_eq!(q.tax_id, None);
        assert_eq!(q.value.as_deref(), Some("x"));
    }

    #[test]
    fn test_enrichment_result_is_mutually_exclusive() {
        let failed = serde_json::to_value(EnrichmentResult::Failed {
            error: "timeout".to_string(),
        })
        .unwrap();
        assert_eq!(failed, serde_json::json!({"error": "timeout"}));

        let found = serde_json::to_value(EnrichmentResult::empty()).unwrap();
        assert!(found.get("error").is_none());
        assert_eq!(found["links"], serde_json::json!([]));
    }
}
