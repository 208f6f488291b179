//! cfddns-core – run orchestration

pub mod cfg;
pub mod detector;
pub mod error;
pub mod logging;
pub mod pipeline;

use cfddns_provider_cloudflare::CfProvider;
use cfg::Settings;
use error::{ConfigError, RunError};
use pipeline::{Outcome, RunOptions, run_once};
use tracing::error;

pub use cfg::load_settings;
pub use logging::RunLog;

/// Runs one pass against Cloudflare with the resolver chosen by `IP_LOOKUP`.
pub async fn execute(
    loaded: Result<Settings, ConfigError>,
    opts: RunOptions,
) -> Result<Outcome, RunError> {
    let settings = loaded?;
    let provider = CfProvider::new(&settings.api_token).map_err(RunError::Setup)?;
    let resolver = detector::resolver_for(&settings);
    run_once(&settings, &provider, resolver.as_ref(), opts).await
}

/// Logs a failed run and maps the result to a process exit status.
pub fn conclude(result: &Result<Outcome, RunError>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(e) => {
            error!("{e}");
            error!("critical error, terminating");
            1
        }
    }
}
