use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::broadcast::Sender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::bindings::ProviderBinding;
use crate::models::{Availability, SensorReading};
use crate::probe::{probe_binding, ProbeOutcome};
use crate::vendor::providers::{ConnectionProvider, ProviderKind, ProviderSet};

/// Ceiling for the error backoff. The wait doubles on every failed sweep
/// and never exceeds this.
pub const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// A sweep-level failure. Category-level trouble never surfaces here; it
/// is folded into the readings themselves so one bad sensor cannot stall
/// the rest.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SweepError {
    #[error("no listener is receiving readings")]
    SinkClosed,
}

/// Task: Runs periodically to sweep every bound sensor category and emit
/// one reading per category. The wait is measured from the end of one
/// sweep to the start of the next, doubles while sweeps fail, and snaps
/// back to the configured interval on the first clean sweep.
/// Can be cancelled.
#[tracing::instrument(skip_all)]
pub async fn task_poll_sweeps(
    token: CancellationToken,
    connection: Arc<dyn ConnectionProvider>,
    providers: Arc<ProviderSet>,
    bindings: Arc<Vec<ProviderBinding>>,
    interval: Duration,
    tx_readings: Sender<SensorReading>,
) {
    info!("Started.");
    let mut wait = interval;
    loop {
        match run_sweep(&token, connection.as_ref(), &providers, &bindings, &tx_readings).await {
            Ok(_) => {
                if wait != interval {
                    info!("Sweep recovered. Restoring interval {:?}.", interval);
                }
                wait = interval;
            }
            Err(e) => {
                wait = (wait * 2).min(MAX_BACKOFF);
                error!("Sweep failed. Backing off to {:?}. Error: {}", wait, e);
            }
        }

        tokio::select! {
            _ = token.cancelled() => {
                warn!("Cancelled.");
                break;
            },
            _ = tokio::time::sleep(wait) => {}
        };
    }
}

/// One full pass over the bindings. With no aircraft connected every
/// category reports disconnected without a single provider call. A
/// cancellation observed mid-sweep drops the remaining categories and
/// any reading not yet delivered.
#[tracing::instrument(skip_all)]
async fn run_sweep(
    token: &CancellationToken,
    connection: &dyn ConnectionProvider,
    providers: &ProviderSet,
    bindings: &[ProviderBinding],
    tx_readings: &Sender<SensorReading>,
) -> Result<(), SweepError> {
    trace!("Executing sweep.");
    let device = match connection.active_device() {
        None => {
            debug!("No aircraft connected. Reporting every category disconnected.");
            for binding in bindings {
                if token.is_cancelled() {
                    return Ok(());
                }
                deliver(
                    tx_readings,
                    SensorReading::offline(binding.category, Availability::Disconnected),
                )?;
            }
            return Ok(());
        }
        Some(device) => device,
    };
    trace!("Sweeping sensors of {}.", device);

    for binding in bindings {
        if token.is_cancelled() {
            debug!("Cancelled mid-sweep. Dropping remaining categories.");
            return Ok(());
        }
        let reading = poll_category(providers, binding);
        if token.is_cancelled() {
            debug!("Cancelled mid-sweep. Dropping the in-flight reading.");
            return Ok(());
        }
        deliver(tx_readings, reading)?;
    }
    Ok(())
}

/// Resolve one category to a reading: find its provider, walk the
/// candidate operations, shape the answer. Trouble stays inside the
/// category as an offline reading.
#[tracing::instrument(skip_all, fields(category = %binding.category))]
fn poll_category(providers: &ProviderSet, binding: &ProviderBinding) -> SensorReading {
    let kind = ProviderKind::serving(binding.category);
    let provider = match providers.get(kind) {
        None => {
            warn!("No {} provider bound. Reporting unavailable.", kind);
            return SensorReading::offline(binding.category, Availability::Unavailable);
        }
        Some(provider) => provider,
    };

    match probe_binding(provider, binding) {
        ProbeOutcome::Found { op, value } => {
            debug!("Got {} data via {}.", binding.category, op);
            SensorReading::from(value)
        }
        ProbeOutcome::Exhausted { last_fault: None } => {
            debug!(
                "No candidate operation for {} is supported. Reporting unavailable.",
                binding.category
            );
            SensorReading::offline(binding.category, Availability::Unavailable)
        }
        ProbeOutcome::Exhausted {
            last_fault: Some(fault),
        } => {
            error!(
                "Every candidate operation for {} failed. Error: {}",
                binding.category, fault
            );
            SensorReading::offline(binding.category, Availability::Error(fault.to_string()))
        }
    }
}

fn deliver(
    tx_readings: &Sender<SensorReading>,
    reading: SensorReading,
) -> Result<(), SweepError> {
    match tx_readings.send(reading) {
        Err(_) => Err(SweepError::SinkClosed),
        Ok(receivers) => {
            trace!("Sent a reading to {} receivers.", receivers);
            Ok(())
        }
    }
}
