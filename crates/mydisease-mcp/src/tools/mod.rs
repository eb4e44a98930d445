//! MCP tool implementations.
//!
//! Each tool module provides tools that:
//! 1. Parse and validate input parameters
//! 2. Translate them into upstream requests, batched through the dispatcher
//! 3. Format results as TSV, CSV, JSON, or Markdown

mod associations;
mod batch;
mod export;
mod mapping;
mod metadata;
mod search;

pub use associations::*;
pub use batch::*;
pub use export::*;
pub use mapping::*;
pub use metadata::*;
pub use search::*;

use std::sync::Arc;

use serde_json::json;

use crate::client::MyDiseaseClient;
use crate::config::{Config, api};
use crate::dispatch::{BatchDispatcher, DispatchOptions, DispatchSettings};
use crate::error::ToolResult;
use crate::formatters;
use crate::models::{Dimension, ExportFormat, QueryRequest};

/// Tool execution context.
pub struct ToolContext {
    /// API client, shared with the dispatcher.
    pub client: Arc<MyDiseaseClient>,

    /// Batch dispatcher.
    pub dispatcher: BatchDispatcher,
}

impl ToolContext {
    /// Create a new tool context.
    #[must_use]
    pub fn new(client: Arc<MyDiseaseClient>, config: &Config) -> Self {
        let dispatcher = BatchDispatcher::new(Arc::clone(&client), DispatchSettings::from(config));
        Self { client, dispatcher }
    }
}

/// Trait for MCP tools.
#[async_trait::async_trait]
pub trait McpTool: Send + Sync {
    /// Tool name (e.g., "batch_query_diseases").
    fn name(&self) -> &'static str;

    /// Tool description for LLM.
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters.
    fn input_schema(&self) -> serde_json::Value;

    /// Execute the tool with given input.
    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String>;
}

/// Register all tools.
#[must_use]
pub fn register_all_tools() -> Vec<Box<dyn McpTool>> {
    vec![
        // Search tools (3)
        Box::new(search::SearchDiseaseTool),
        Box::new(search::SearchByFieldTool),
        Box::new(search::GetDiseaseByIdTool),

        // Batch tools (2)
        Box::new(batch::BatchQueryDiseasesTool),
        Box::new(batch::BatchGetDiseasesTool),

        // Export tools (4)
        Box::new(export::ExportDiseaseListTool),
        Box::new(export::ExportDiseaseComparisonTool),
        Box::new(export::ExportGeneDiseaseMatrixTool),
        Box::new(export::ExportPhenotypeProfileTool),

        // Mapping tools (3)
        Box::new(mapping::MapDiseaseIdsTool),
        Box::new(mapping::ValidateDiseaseIdsTool),
        Box::new(mapping::FindCommonDiseasesTool),

        // Association tools (3)
        Box::new(associations::DiseasesByGeneTool),
        Box::new(associations::DiseasesByVariantTool),
        Box::new(associations::DiseasesByPhenotypeTool),

        // Metadata tools (2)
        Box::new(metadata::MetadataTool),
        Box::new(metadata::AvailableFieldsTool),
    ]
}

/// One batch lookup as requested by a tool.
#[derive(Debug)]
pub(crate) struct BatchCall {
    pub identifiers: Vec<String>,
    pub dimension: Dimension,
    pub fields: Option<Vec<String>>,
    pub scopes: Option<String>,
    pub limit: Option<usize>,
    pub chunk_size: Option<usize>,
    pub format: Option<String>,
    pub default_format: ExportFormat,
}

impl BatchCall {
    /// Validate, dispatch, and render.
    ///
    /// Format, identifier count, chunk size and field names are all checked
    /// before the first upstream call.
    pub async fn run(self, ctx: &ToolContext, tool: &'static str) -> ToolResult<String> {
        let format = match self.format.as_deref() {
            Some(name) => name.parse()?,
            None => self.default_format,
        };

        let count = self.identifiers.len();
        let mut request = QueryRequest::new(self.identifiers, self.dimension)?
            .with_fields(self.fields)
            .with_limit(self.limit.unwrap_or_else(|| self.dimension.default_limit()));
        if let Some(scopes) = self.scopes {
            request = request.with_scopes(scopes);
        }

        tracing::info!(tool, dimension = %self.dimension, identifiers = count, %format, "Running batch lookup");

        let batch = ctx
            .dispatcher
            .dispatch(&request, DispatchOptions { chunk_size: self.chunk_size, concurrency_limit: None })
            .await?;

        formatters::render(&batch, format, request.fields())
    }
}

/// Schema for an identifier list bounded to what one call may carry.
pub(crate) fn identifier_list_schema(description: &str) -> serde_json::Value {
    json!({
        "type": "array",
        "items": {"type": "string"},
        "minItems": 1,
        "maxItems": api::MAX_IDENTIFIERS,
        "description": description
    })
}

/// Schema for the output format argument.
pub(crate) fn format_schema(default: ExportFormat) -> serde_json::Value {
    json!({
        "type": "string",
        "enum": ExportFormat::ALL.iter().map(|f| f.as_str()).collect::<Vec<_>>(),
        "default": default.as_str(),
        "description": "Output format"
    })
}

/// Schema for a field selection list.
pub(crate) fn fields_schema(description: &str) -> serde_json::Value {
    json!({
        "type": "array",
        "items": {"type": "string"},
        "description": description
    })
}
