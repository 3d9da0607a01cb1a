//! Customer Lookup API Library
//!
//! Matches call-center search criteria (name fragment, DPI, NIT, free text)
//! against a spreadsheet of customers loaded into memory, and enriches each
//! search with contact signals scraped from public web search results.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core business logic.
//! - `audit`: Audit events and sinks.
//! - `config`: Configuration management.
//! - `enrichment`: Web search scraping and contact extraction.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `matcher`: Exact-triple and partial record matching.
//! - `models`: Core data models.
//! - `normalizer`: Raw table to record normalization.
//! - `services`: Search orchestration.
//! - `store`: Immutable record snapshots and atomic swap.
//! - `table`: Tabular data sources (Excel).

pub mod api;
pub mod core;

pub mod audit;
pub mod config;
pub mod enrichment;
pub mod errors;
pub mod handlers;
pub mod matcher;
pub mod models;
pub mod normalizer;
pub mod services;
pub mod store;
pub mod table;
