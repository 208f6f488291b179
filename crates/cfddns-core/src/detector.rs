//! Public-IP resolvers
//!
//! * Command – runs an external HTTP client (`curl -s <endpoint>` by default)
//! * HTTP    – in-process GET via `reqwest`
//!
//! Both return the response body trimmed; an empty string is passed through
//! and judged by the caller.

use crate::cfg::{LookupKind, Settings};
use anyhow::{Result, bail};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio::{process::Command, time::timeout};

#[async_trait]
pub trait IpResolver: Send + Sync {
    /// Short human-readable description for log lines.
    fn describe(&self) -> String;

    /// Surrounding whitespace is tolerated; callers trim before use.
    async fn public_ip(&self) -> Result<String>;
}

async fn bounded<F>(to: Option<Duration>, fut: F) -> Result<String>
where
    F: std::future::Future<Output = Result<String>>,
{
    match to {
        Some(d) => Ok(timeout(d, fut).await??),
        None => fut.await,
    }
}

/*──────── Command resolver ────────*/
pub struct CommandResolver {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandResolver {
    pub fn new(program: &str, args: &[&str], timeout: Option<Duration>) -> Self {
        Self {
            program: program.to_owned(),
            args: args.iter().map(|a| (*a).to_owned()).collect(),
            timeout,
        }
    }

    /// `curl -s <endpoint>`
    pub fn curl(endpoint: &str, timeout: Option<Duration>) -> Self {
        Self::new("curl", &["-s", endpoint], timeout)
    }
}

#[async_trait]
impl IpResolver for CommandResolver {
    fn describe(&self) -> String {
        format!("`{} {}`", self.program, self.args.join(" "))
    }

    async fn public_ip(&self) -> Result<String> {
        bounded(self.timeout, async {
            let out = Command::new(&self.program)
                .args(&self.args)
                .kill_on_drop(true)
                .output()
                .await?;
            if !out.status.success() {
                bail!("{} exited with {}", self.describe(), out.status);
            }
            Ok::<_, anyhow::Error>(String::from_utf8_lossy(&out.stdout).trim().to_owned())
        })
        .await
    }
}

/*──────── HTTP resolver ────────*/
pub struct HttpResolver {
    url: String,
    timeout: Option<Duration>,
    client: Client,
}

impl HttpResolver {
    pub fn new(url: &str, timeout: Option<Duration>) -> Self {
        Self {
            url: url.to_owned(),
            timeout,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl IpResolver for HttpResolver {
    fn describe(&self) -> String {
        format!("GET {}", self.url)
    }

    async fn public_ip(&self) -> Result<String> {
        bounded(self.timeout, async {
            let body = self
                .client
                .get(&self.url)
                .send()
                .await?
                .error_for_status()?
                .text()
                .await?;
            Ok::<_, anyhow::Error>(body.trim().to_owned())
        })
        .await
    }
}

/// Resolver selected by `IP_LOOKUP`.
pub fn resolver_for(s: &Settings) -> Box<dyn IpResolver> {
    let to = s.ip_lookup_timeout_ms.map(Duration::from_millis);
    match s.ip_lookup {
        LookupKind::Command => Box::new(CommandResolver::curl(&s.ip_endpoint, to)),
        LookupKind::Http => Box::new(HttpResolver::new(&s.ip_endpoint, to)),
    }
}
