//! Cloudflare DNS provider
//!
//! * Auth via **API Token**; needs `Zone:Read` and `DNS:Edit`.
//! * Zone and record identifiers are looked up on every call, never cached.
//! * All business errors are mapped to [`cfddns_provider::ProviderError`].

use async_trait::async_trait;
use cfddns_provider::{DnsProvider, DnsRecord, ProviderError};
use reqwest::{
    Client, Response, StatusCode,
    header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT},
};
use serde_json::{Value, json};
use tracing::{debug, info};

pub const API_ROOT: &str = "https://api.cloudflare.com/client/v4";

/*──────── provider struct ────────*/

pub struct CfProvider {
    api_root: String,
    client: Client,
}

impl CfProvider {
    pub fn new(token: &str) -> anyhow::Result<Self> {
        Self::with_api_root(token, API_ROOT)
    }

    /// Same as [`CfProvider::new`] but talks to `api_root` instead of the
    /// public endpoint.
    pub fn with_api_root(token: &str, api_root: &str) -> anyhow::Result<Self> {
        let mut hdr = HeaderMap::new();
        hdr.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))?,
        );
        hdr.insert(USER_AGENT, HeaderValue::from_static("cfddns (+github)"));
        hdr.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            api_root: api_root.trim_end_matches('/').to_owned(),
            client: Client::builder().default_headers(hdr).build()?,
        })
    }

    /*──────── tiny HTTP wrapper ────────*/

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, ProviderError> {
        self.check(
            self.client
                .get(format!("{}{path}", self.api_root))
                .query(query)
                .send()
                .await?,
        )
        .await
    }

    async fn put(&self, path: &str, body: Value) -> Result<Value, ProviderError> {
        self.check(
            self.client
                .put(format!("{}{path}", self.api_root))
                .json(&body)
                .send()
                .await?,
        )
        .await
    }

    async fn check(&self, resp: Response) -> Result<Value, ProviderError> {
        let status = resp.status();
        let v: Value = resp.json().await?;
        if status == StatusCode::OK && v["success"].as_bool().unwrap_or(false) {
            Ok(v)
        } else {
            let msg = v["errors"]
                .get(0)
                .and_then(|e| e["message"].as_str())
                .unwrap_or("unknown error");
            Err(ProviderError::Api(format!("{msg} (HTTP {})", status.as_u16())))
        }
    }
}

fn result_array(v: Value) -> Result<Vec<Value>, ProviderError> {
    match v {
        Value::Object(mut m) => match m.remove("result") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(ProviderError::Api("`result` is not a list".into())),
        },
        _ => Err(ProviderError::Api("response is not an object".into())),
    }
}

/*──────── DnsProvider impl ────────*/

#[async_trait]
impl DnsProvider for CfProvider {
    fn name(&self) -> &'static str {
        "Cloudflare"
    }

    async fn zone_ids(&self, zone_name: &str) -> Result<Vec<String>, ProviderError> {
        let v = self.get("/zones", &[("name", zone_name)]).await?;
        let ids = result_array(v)?
            .iter()
            .map(|z| {
                z["id"]
                    .as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| ProviderError::Api("zone without id".into()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Cloudflare zones named {zone_name}: {ids:?}");
        Ok(ids)
    }

    async fn find_records(
        &self,
        zone_id: &str,
        record_name: &str,
    ) -> Result<Vec<DnsRecord>, ProviderError> {
        let v = self
            .get(
                &format!("/zones/{zone_id}/dns_records"),
                &[("name", record_name), ("match", "all")],
            )
            .await?;
        let records = result_array(v)?
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<DnsRecord>, _>>()?;
        debug!(
            "Cloudflare records named {record_name} in zone {zone_id}: {}",
            records.len()
        );
        Ok(records)
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record: &DnsRecord,
    ) -> Result<DnsRecord, ProviderError> {
        let mut body = json!({
            "type":    record.record_type,
            "name":    record.name,
            "content": record.content,
        });
        if let Some(ttl) = record.ttl {
            body["ttl"] = json!(ttl);
        }
        if let Some(proxied) = record.proxied {
            body["proxied"] = json!(proxied);
        }
        let mut v = self
            .put(&format!("/zones/{zone_id}/dns_records/{}", record.id), body)
            .await?;
        let stored: DnsRecord = serde_json::from_value(v["result"].take())?;
        info!("Cloudflare updated record id={}", stored.id);
        Ok(stored)
    }
}
