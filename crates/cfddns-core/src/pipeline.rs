//! One sync pass: fetch record, resolve public IP, write back when they differ.

use crate::{cfg::Settings, detector::IpResolver, error::RunError};
use cfddns_provider::{DnsProvider, DnsRecord};
use tracing::{debug, info};

/// A record together with the zone it lives in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordLookup {
    pub zone_id: String,
    pub record: DnsRecord,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Unchanged { ip: String },
    Updated { previous: String, current: String },
    DryRun { previous: String, current: String },
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RunOptions {
    /// compute the outcome but never write to the provider
    pub dry_run: bool,
}

/*──────── record fetcher ────────*/
pub async fn fetch_record<P>(
    provider: &P,
    zone_name: &str,
    record_name: &str,
) -> Result<RecordLookup, RunError>
where
    P: DnsProvider + ?Sized,
{
    let zone_id = match provider.zone_ids(zone_name).await?.as_slice() {
        [id] => id.clone(),
        [] => return Err(RunError::ZoneNotFound(zone_name.to_owned())),
        many => {
            return Err(RunError::AmbiguousZone {
                zone: zone_name.to_owned(),
                count: many.len(),
            });
        }
    };
    debug!("{}: zone {zone_name} -> {zone_id}", provider.name());

    let mut records = provider.find_records(&zone_id, record_name).await?;
    if records.len() != 1 {
        return Err(RunError::RecordCount {
            name: record_name.to_owned(),
            count: records.len(),
        });
    }
    let record = records.remove(0);
    debug!("record {record_name} -> {} ({})", record.id, record.content);
    Ok(RecordLookup { zone_id, record })
}

/*──────── public IP ────────*/
pub async fn resolve_public_ip<R>(resolver: &R) -> Result<String, RunError>
where
    R: IpResolver + ?Sized,
{
    let ip = resolver.public_ip().await.map_err(RunError::IpLookup)?;
    let ip = ip.trim().to_owned();
    if ip.is_empty() {
        return Err(RunError::EmptyIp);
    }
    debug!("{} -> {ip}", resolver.describe());
    Ok(ip)
}

/*──────── record updater ────────*/
pub async fn update_record<P>(
    provider: &P,
    lookup: &mut RecordLookup,
    new_ip: &str,
) -> Result<(), RunError>
where
    P: DnsProvider + ?Sized,
{
    lookup.record.content = new_ip.to_owned();
    provider
        .update_record(&lookup.zone_id, &lookup.record)
        .await
        .map_err(RunError::Update)?;
    Ok(())
}

/*──────── one run ────────*/

/// Validates `settings`, then performs a single fetch/compare/update pass.
/// Nothing touches the network before validation succeeds.
pub async fn run_once<P, R>(
    settings: &Settings,
    provider: &P,
    resolver: &R,
    opts: RunOptions,
) -> Result<Outcome, RunError>
where
    P: DnsProvider + ?Sized,
    R: IpResolver + ?Sized,
{
    settings.validate_required()?;

    let mut lookup = fetch_record(provider, &settings.zone_name, &settings.record_name).await?;
    let previous = lookup.record.content.clone();
    let current = resolve_public_ip(resolver).await?;

    if previous == current {
        info!("No change in IP: {previous}");
        return Ok(Outcome::Unchanged { ip: previous });
    }

    if opts.dry_run {
        info!("Dry run: would update DNS from {previous} to {current}");
        return Ok(Outcome::DryRun { previous, current });
    }

    update_record(provider, &mut lookup, &current).await?;
    info!("Updated DNS w/ IP: {current}");
    Ok(Outcome::Updated { previous, current })
}
