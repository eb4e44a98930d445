//! MyDisease MCP Server
//!
//! A Model Context Protocol (MCP) server for the MyDisease.info API.
//! Lets LLM agents look up diseases and their gene, variant and phenotype
//! associations, one at a time or in batches of up to 1000 identifiers.
//!
//! # Features
//!
//! - **17 MCP Tools**: Search, batch lookup, export, id mapping, associations, metadata
//! - **Batch dispatch**: Bounded-concurrency fan-out with one retry per chunk
//! - **Aligned output**: One TSV/CSV/JSON/Markdown entry per input identifier
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use mydisease_mcp::{Config, MyDiseaseClient};
//! use mydisease_mcp::dispatch::{BatchDispatcher, DispatchOptions, DispatchSettings};
//! use mydisease_mcp::models::{Dimension, ExportFormat, QueryRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let client = Arc::new(MyDiseaseClient::new(&config)?);
//!     let dispatcher = BatchDispatcher::new(client, DispatchSettings::from(&config));
//!
//!     let request = QueryRequest::new(vec!["BRCA1".into(), "TP53".into()], Dimension::Gene)?;
//!     let batch = dispatcher.dispatch(&request, DispatchOptions::default()).await?;
//!     println!("{}", mydisease_mcp::formatters::render(&batch, ExportFormat::Tsv, None)?);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod formatters;
pub mod models;
pub mod query;
pub mod server;
pub mod tools;

pub use client::MyDiseaseClient;
pub use config::Config;
pub use dispatch::BatchDispatcher;
pub use error::{ClientError, ToolError};
