//! Integration tests for the MyDisease MCP server.
//!
//! These tests hit the real MyDisease.info API.
//! Run with: `cargo test --features integration -- --nocapture`

#![cfg(feature = "integration")]

use std::sync::Arc;

use mydisease_mcp::client::MyDiseaseClient;
use mydisease_mcp::config::{Config, api};
use mydisease_mcp::dispatch::{BatchDispatcher, DispatchOptions, DispatchSettings};
use mydisease_mcp::formatters;
use mydisease_mcp::models::{Dimension, ExportFormat, QueryRequest, ResultStatus};

/// Well-known disease identifiers.
mod disease_ids {
    /// Huntington disease
    pub const HUNTINGTON: &str = "MONDO:0007739";
    /// Cystic fibrosis
    pub const CYSTIC_FIBROSIS: &str = "MONDO:0009061";
    /// Not a real id
    pub const INVALID: &str = "MONDO:9999999";
}

fn create_dispatcher() -> BatchDispatcher {
    let config = Config::from_env().expect("valid environment");
    let client = Arc::new(MyDiseaseClient::new(&config).expect("Failed to create client"));
    BatchDispatcher::new(client, DispatchSettings::from(&config))
}

fn ids(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[tokio::test]
async fn test_live_batch_get() {
    let dispatcher = create_dispatcher();
    let request = QueryRequest::new(
        ids(&[disease_ids::HUNTINGTON, disease_ids::INVALID, disease_ids::CYSTIC_FIBROSIS]),
        Dimension::Id,
    )
    .unwrap()
    .with_fields(Some(ids(&["_id", "name"])));

    let batch = dispatcher.dispatch(&request, DispatchOptions::default()).await.unwrap();
    let statuses: Vec<_> = batch.entries().iter().map(|e| e.result.status()).collect();

    assert_eq!(statuses, vec![ResultStatus::Hit, ResultStatus::NotFound, ResultStatus::Hit]);
    println!("{}", formatters::render(&batch, ExportFormat::Markdown, request.fields()).unwrap());
}

#[tokio::test]
async fn test_live_gene_lookup() {
    let dispatcher = create_dispatcher();
    let request = QueryRequest::new(ids(&["BRCA1", "NOTAGENE"]), Dimension::Gene)
        .unwrap()
        .with_fields(Some(ids(&["_id", "name"])));

    let batch = dispatcher.dispatch(&request, DispatchOptions::default()).await.unwrap();

    assert_eq!(batch.entries()[0].result.status(), ResultStatus::Hit);
    assert_eq!(batch.entries()[1].result.status(), ResultStatus::NotFound);
}

/// The upstream accepts a full id chunk in one call.
#[tokio::test]
async fn test_live_id_ceiling() {
    let dispatcher = create_dispatcher();
    let identifiers: Vec<String> =
        (0..api::ID_BATCH_SIZE).map(|i| format!("MONDO:{:07}", 7739 + i)).collect();
    let request =
        QueryRequest::new(identifiers, Dimension::Id).unwrap().with_fields(Some(ids(&["_id"])));

    let batch = dispatcher.dispatch(&request, DispatchOptions::default()).await.unwrap();

    assert_eq!(batch.entries().len(), api::ID_BATCH_SIZE);
    assert!(batch.entries().iter().all(|e| e.result.status() != ResultStatus::Error));
}

/// The upstream accepts a full query-term chunk in one call.
#[tokio::test]
async fn test_live_query_ceiling() {
    let dispatcher = create_dispatcher();
    let identifiers: Vec<String> = (0..api::QUERY_BATCH_SIZE).map(|i| format!("GENE{i}")).collect();
    let request =
        QueryRequest::new(identifiers, Dimension::Gene).unwrap().with_fields(Some(ids(&["_id"])));

    let options = DispatchOptions { chunk_size: Some(api::QUERY_BATCH_SIZE), ..DispatchOptions::default() };
    let batch = dispatcher.dispatch(&request, options).await.unwrap();

    assert!(batch.entries().iter().all(|e| e.result.status() != ResultStatus::Error));
}
