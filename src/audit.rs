use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::SearchQuery;

/// One search, as seen by the audit trail.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub nombre: String,
    pub dpi: String,
    pub nit: String,
    pub value: String,
    pub caller: String,
    pub found: bool,
    pub at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(query: &SearchQuery, caller: &str, found: bool) -> Self {
        let text = |field: &Option<String>| field.as_deref().unwrap_or("").trim().to_string();
        Self {
            nombre: text(&query.name),
            dpi: text(&query.national_id),
            nit: text(&query.tax_id),
            value: text(&query.value),
            caller: caller.to_string(),
            found,
            at: Utc::now(),
        }
    }
}

/// Receives one event per search. Implementations must not block or fail.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// Writes audit events to the `audit` tracing target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        tracing::info!(
            target: "audit",
            caller = %event.caller,
            nombre = %event.nombre,
            dpi = %event.dpi,
            nit = %event.nit,
            value = %event.value,
            found = event.found,
            at = %event.at.to_rfc3339(),
            "search"
        );
    }
}
