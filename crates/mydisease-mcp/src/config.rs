//! Configuration for the MyDisease MCP server.

use std::time::Duration;

use crate::models::Dimension;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Base URL for the MyDisease.info v1 API.
    pub const BASE_URL: &str = "https://mydisease.info/v1";

    /// Per-request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Requests per second allowed against the upstream API.
    pub const RATE_LIMIT: u32 = 10;

    /// Maximum ids accepted by one `POST /disease` call.
    pub const ID_BATCH_SIZE: usize = 1000;

    /// Maximum query terms sent in one `POST /query` call.
    ///
    /// The upstream does not document a per-scope ceiling, so this stays
    /// well below the id ceiling and is overridable from the environment.
    pub const QUERY_BATCH_SIZE: usize = 200;

    /// Chunk calls in flight at once for a single dispatch.
    pub const CONCURRENCY_LIMIT: usize = 5;

    /// Deadline for a whole dispatch, all chunks and retries included.
    pub const INVOCATION_TIMEOUT: Duration = Duration::from_secs(120);

    /// Fixed pause before the single retry of a failed chunk.
    pub const RETRY_PAUSE: Duration = Duration::from_millis(500);

    /// Identifiers accepted by one tool call.
    pub const MAX_IDENTIFIERS: usize = 1000;

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);
}

/// Field sets for API requests.
pub mod fields {
    /// Default fields for batch lookups by disease id.
    pub const BATCH_DEFAULT: &[&str] = &["_id", "name", "mondo", "orphanet", "omim", "inheritance"];

    /// Default columns for `export_disease_list`.
    pub const EXPORT_DEFAULT: &[&str] = &[
        "_id",
        "name",
        "mondo.mondo",
        "omim",
        "orphanet.id",
        "inheritance.inheritance_type",
        "prevalence",
    ];

    /// Default fields for free-text search.
    pub const SEARCH_DEFAULT: &[&str] =
        &["_id", "name", "mondo", "orphanet", "omim", "umls.cui", "disgenet"];

    /// Default fields for gene association lookups.
    pub const GENE: &[&str] = &["_id", "name", "gene", "causal_gene", "disgenet.genes_related_to_disease"];

    /// Default fields for variant association lookups.
    pub const VARIANT: &[&str] =
        &["_id", "name", "clinvar.variant", "pathogenic_variants", "gwas_catalog"];

    /// Default fields for phenotype lookups.
    pub const PHENOTYPE: &[&str] = &["_id", "name", "hpo", "phenotype_related_to_disease"];

    /// Default aspects for `export_disease_comparison`.
    pub const COMPARISON_DEFAULT: &[&str] =
        &["name", "inheritance", "genes", "prevalence", "age_of_onset", "main_phenotypes"];

    /// Fields behind one row of the gene by disease matrix.
    pub const MATRIX: &[&str] = &["_id", "name", "gene.symbol", "causal_gene.symbol"];

    /// Fields behind a phenotype profile.
    pub const PHENOTYPE_PROFILE: &[&str] = &[
        "_id",
        "name",
        "hpo",
        "phenotype_related_to_disease",
        "clinical_features",
        "inheritance",
        "age_of_onset",
        "prevalence",
    ];
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the MyDisease.info API (overridable for mock servers).
    pub base_url: String,

    /// Per-request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Upstream requests per second, shared by every concurrent call.
    /// Zero disables rate limiting.
    pub rate_limit: u32,

    /// Maximum ids per `POST /disease` call.
    pub id_batch_size: usize,

    /// Maximum terms per `POST /query` call.
    pub query_batch_size: usize,

    /// Chunk calls in flight at once.
    pub concurrency_limit: usize,

    /// Deadline for one dispatch.
    pub invocation_timeout: Duration,

    /// Pause before retrying a failed chunk.
    pub retry_pause: Duration,
}

impl Config {
    /// Create a configuration with production defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: api::BASE_URL.to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            rate_limit: api::RATE_LIMIT,
            id_batch_size: api::ID_BATCH_SIZE,
            query_batch_size: api::QUERY_BATCH_SIZE,
            concurrency_limit: api::CONCURRENCY_LIMIT,
            invocation_timeout: api::INVOCATION_TIMEOUT,
            retry_pause: api::RETRY_PAUSE,
        }
    }

    /// Create a test configuration pointing at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            base_url: format!("{}/v1", base_url.trim_end_matches('/')),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            rate_limit: 0, // No rate limiting in tests
            retry_pause: Duration::ZERO,
            invocation_timeout: Duration::from_secs(30),
            ..Self::new()
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but cannot be parsed, or if the
    /// base URL is not a valid absolute URL.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::new();

        if let Ok(base_url) = std::env::var("MYDISEASE_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        url::Url::parse(&config.base_url)
            .map_err(|e| anyhow::anyhow!("MYDISEASE_BASE_URL is not a valid URL: {e}"))?;

        if let Some(secs) = env_parse::<f64>("MYDISEASE_TIMEOUT")? {
            config.request_timeout = Duration::from_secs_f64(secs);
        }
        if let Some(rate) = env_parse::<u32>("MYDISEASE_RATE_LIMIT")? {
            config.rate_limit = rate;
        }
        if let Some(limit) = env_parse::<usize>("MYDISEASE_CONCURRENCY")? {
            anyhow::ensure!(limit > 0, "MYDISEASE_CONCURRENCY must be at least 1");
            config.concurrency_limit = limit;
        }
        if let Some(size) = env_parse::<usize>("MYDISEASE_ID_BATCH_SIZE")? {
            anyhow::ensure!(
                (1..=api::ID_BATCH_SIZE).contains(&size),
                "MYDISEASE_ID_BATCH_SIZE must be between 1 and {}",
                api::ID_BATCH_SIZE
            );
            config.id_batch_size = size;
        }
        if let Some(size) = env_parse::<usize>("MYDISEASE_QUERY_BATCH_SIZE")? {
            anyhow::ensure!(
                (1..=api::ID_BATCH_SIZE).contains(&size),
                "MYDISEASE_QUERY_BATCH_SIZE must be between 1 and {}",
                api::ID_BATCH_SIZE
            );
            config.query_batch_size = size;
        }
        if let Some(secs) = env_parse::<u64>("MYDISEASE_INVOCATION_TIMEOUT")? {
            config.invocation_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = env_parse::<u64>("MYDISEASE_RETRY_PAUSE_MS")? {
            config.retry_pause = Duration::from_millis(ms);
        }

        Ok(config)
    }

    /// Upstream batch ceiling for a search dimension.
    #[must_use]
    pub const fn max_batch_size(&self, dimension: Dimension) -> usize {
        match dimension {
            Dimension::Id => self.id_batch_size,
            Dimension::Gene | Dimension::Variant | Dimension::Phenotype | Dimension::Text => {
                self.query_batch_size
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn env_parse<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("invalid value for {name}: {e}")),
        Err(_) => Ok(None),
    }
}
