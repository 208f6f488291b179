use cfddns_provider::ProviderError;
use thiserror::Error;

/// Problems with the settings a run starts from
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("required setting(s) missing: {}", .0.join(", "))]
    Missing(Vec<String>),
}

impl From<validator::ValidationErrors> for ConfigError {
    fn from(errs: validator::ValidationErrors) -> Self {
        let mut names: Vec<String> = errs
            .field_errors()
            .keys()
            .map(|k| k.to_ascii_uppercase())
            .collect();
        names.sort();
        Self::Missing(names)
    }
}

/// Every way a single run can fail. None of them is retried.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("setup failed: {0:#}")]
    Setup(anyhow::Error),

    #[error("DNS provider request failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("no zone named `{0}`")]
    ZoneNotFound(String),

    #[error("{count} zones are named `{zone}`; refusing to pick one")]
    AmbiguousZone { zone: String, count: usize },

    #[error("unexpected number of DNS records returned for `{name}`: {count}")]
    RecordCount { name: String, count: usize },

    #[error("public IP lookup failed: {0:#}")]
    IpLookup(anyhow::Error),

    #[error("public IP lookup returned an empty result")]
    EmptyIp,

    #[error("failed to update DNS record: {0}")]
    Update(ProviderError),
}
