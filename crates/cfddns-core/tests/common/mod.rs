//! Test doubles shared by the run contract tests

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use cfddns_core::{RunLog, cfg::Settings, detector::IpResolver};
use cfddns_provider::{DnsProvider, DnsRecord, ProviderError};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::prelude::*;

pub fn record(id: &str, content: &str) -> DnsRecord {
    DnsRecord {
        id: id.into(),
        name: "home.example.com".into(),
        record_type: "A".into(),
        content: content.into(),
        ttl: Some(1),
        proxied: Some(false),
    }
}

pub fn settings(pairs: &[(&str, &str)]) -> Settings {
    let env = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    cfddns_core::cfg::load_settings_from("no-such-cfddns.toml", Some(env)).unwrap()
}

pub fn valid_settings() -> Settings {
    settings(&[
        ("API_TOKEN", "token"),
        ("ZONE_NAME", "example.com"),
        ("RECORD_NAME", "home.example.com"),
    ])
}

/// A provider that serves canned zones and records and remembers writes
pub struct MockProvider {
    zones: Vec<String>,
    records: Vec<DnsRecord>,
    fail_lookup: bool,
    fail_update: bool,
    calls: AtomicUsize,
    writes: Mutex<Vec<(String, DnsRecord)>>,
}

impl MockProvider {
    pub fn new(records: Vec<DnsRecord>) -> Self {
        Self {
            zones: vec!["zone-1".into()],
            records,
            fail_lookup: false,
            fail_update: false,
            calls: AtomicUsize::new(0),
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn with_zones(mut self, zones: &[&str]) -> Self {
        self.zones = zones.iter().map(|z| z.to_string()).collect();
        self
    }

    /// Zone and record lookups fail with an API error.
    pub fn failing_lookup(mut self) -> Self {
        self.fail_lookup = true;
        self
    }

    pub fn failing_update(mut self) -> Self {
        self.fail_update = true;
        self
    }

    /// Number of provider calls of any kind
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> Vec<(String, DnsRecord)> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl DnsProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn zone_ids(&self, _zone_name: &str) -> Result<Vec<String>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookup {
            return Err(ProviderError::Api("lookup failed".into()));
        }
        Ok(self.zones.clone())
    }

    async fn find_records(
        &self,
        _zone_id: &str,
        _record_name: &str,
    ) -> Result<Vec<DnsRecord>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookup {
            return Err(ProviderError::Api("lookup failed".into()));
        }
        Ok(self.records.clone())
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record: &DnsRecord,
    ) -> Result<DnsRecord, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_update {
            return Err(ProviderError::Api("write rejected".into()));
        }
        self.writes
            .lock()
            .unwrap()
            .push((zone_id.to_owned(), record.clone()));
        Ok(record.clone())
    }
}

/// A resolver with a fixed answer
pub struct FixedIp {
    ip: String,
    calls: AtomicUsize,
}

impl FixedIp {
    pub fn new(ip: &str) -> Self {
        Self {
            ip: ip.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IpResolver for FixedIp {
    fn describe(&self) -> String {
        "fixed".into()
    }

    async fn public_ip(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.ip.clone())
    }
}

/// In-memory stdout for the run logger
#[derive(Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Installs a thread-local `RunLog` for the rest of the test.
pub fn install_log(enabled: bool, file: Option<PathBuf>) -> (Captured, DefaultGuard) {
    let out = Captured::default();
    let sub =
        tracing_subscriber::registry().with(RunLog::new(enabled, file).with_writer(out.clone()));
    let guard = tracing::subscriber::set_default(sub);
    (out, guard)
}
