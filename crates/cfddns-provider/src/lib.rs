use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single DNS record as the provider reports it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxied: Option<bool>,
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("api error: {0}")]
    Api(String),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The three provider calls a run needs. Implementations hold no state
/// between calls; every run re-reads zones and records.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Identifiers of every zone whose name equals `zone_name`.
    async fn zone_ids(&self, zone_name: &str) -> Result<Vec<String>, ProviderError>;

    /// Records inside `zone_id` whose name matches `record_name` exactly.
    async fn find_records(
        &self,
        zone_id: &str,
        record_name: &str,
    ) -> Result<Vec<DnsRecord>, ProviderError>;

    /// Writes `record` back by its identifier and returns what the provider stored.
    async fn update_record(
        &self,
        zone_id: &str,
        record: &DnsRecord,
    ) -> Result<DnsRecord, ProviderError>;
}
