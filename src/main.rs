pub mod bindings;
pub mod commands;
pub mod models;
pub mod poller;
pub mod probe;
pub mod vendor;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::{
    signal,
    sync::{broadcast, mpsc},
};
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::{debug, error, info, level_filters::LevelFilter, warn};

use crate::bindings::profile;
use crate::commands::{task_dispatch_commands, CommandClient};
use crate::poller::listener::{task_deliver_readings, LogListener};
use crate::poller::SensorPoller;
use crate::vendor::api::{OpArg, ProviderFault, OP_SET_COLLISION_AVOIDANCE_ENABLED};
use crate::vendor::providers::{DeviceModel, ProviderKind};
use crate::vendor::sim::SimDrone;
use crate::vendor::version::VendorApiVersion;

const POLL_INTERVAL: Duration = Duration::from_millis(1000);
const READING_CHANNEL_CAPACITY: usize = 32;
const COMMAND_CHANNEL_CAPACITY: usize = 16;

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(false)
        .with_max_level(LevelFilter::DEBUG)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    let tracker = TaskTracker::new();
    let token = CancellationToken::new();

    let drone = SimDrone::new(DeviceModel::Mini3Pro, VendorApiVersion::latest());
    drone.set_connected(true);
    let device = drone.handle();
    info!("Monitoring {}.", device);

    let (tx_readings, rx_readings) = broadcast::channel(READING_CHANNEL_CAPACITY);
    let (tx_commands, rx_commands) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);

    let token_clone = token.clone();
    tracker.spawn(async move {
        task_deliver_readings(token_clone, rx_readings, Arc::new(LogListener)).await
    });

    let token_clone = token.clone();
    let connection = drone.connection();
    let providers = drone.providers();
    let providers_clone = Arc::new(providers.clone());
    tracker.spawn(async move {
        task_dispatch_commands(token_clone, rx_commands, connection, providers_clone).await
    });

    let bindings = profile(device.api_version);
    for binding in &bindings {
        debug!("Bound {}.", binding);
    }
    let mut poller =
        SensorPoller::new(drone.connection(), providers, bindings, tx_readings.clone());
    poller.start(POLL_INTERVAL).await;

    let token_clone = token.clone();
    let drone_clone = Arc::clone(&drone);
    let command_client = CommandClient::new(tx_commands.clone());
    tracker.spawn(async move {
        task_exercise_sim_aircraft(token_clone, drone_clone, command_client).await
    });

    let token_clone = token.clone();
    tokio::select! {
        _ = token_clone.cancelled() => {}
        res = signal::ctrl_c() => {
            match res {
                Ok(_) => {
                    token.cancel();
                },
                Err(e) => {
                    error!("Failed to listen for ctrl_c. Error: {}", e);
                    token.cancel();
                }
            };
        },
    }

    if poller.is_running() {
        poller.stop().await;
    }
    tracker.close();
    tracker.wait().await;

    Ok(())
}

/// Task: Drive the simulated aircraft through a command, a link drop and
/// a provider fault so a bench run shows every reading state.
/// Can be cancelled.
#[tracing::instrument(skip_all)]
async fn task_exercise_sim_aircraft(
    token: CancellationToken,
    drone: Arc<SimDrone>,
    commands: CommandClient,
) {
    info!("Started.");

    if pause(&token, Duration::from_secs(4)).await {
        return;
    }
    info!("Disabling collision avoidance by command.");
    match commands
        .execute(
            ProviderKind::Perception,
            OP_SET_COLLISION_AVOIDANCE_ENABLED,
            OpArg::Flag(false),
        )
        .await
    {
        Err(e) => error!("Command failed. Error: {}", e),
        Ok(_) => info!("Collision avoidance disabled."),
    };

    if pause(&token, Duration::from_secs(4)).await {
        return;
    }
    info!("Dropping the aircraft link.");
    drone.set_connected(false);

    if pause(&token, Duration::from_secs(3)).await {
        return;
    }
    info!("Restoring the aircraft link.");
    drone.set_connected(true);

    if pause(&token, Duration::from_secs(4)).await {
        return;
    }
    info!("Injecting a battery provider fault.");
    drone.inject_fault(
        ProviderKind::Battery,
        ProviderFault::new(7100, "battery telemetry timeout"),
    );

    if pause(&token, Duration::from_secs(4)).await {
        return;
    }
    info!("Clearing the battery provider fault.");
    drone.clear_fault(ProviderKind::Battery);

    info!("Script finished. Aircraft keeps flying.");
}

/// Wait out one script beat. Returns true if cancelled meanwhile.
async fn pause(token: &CancellationToken, beat: Duration) -> bool {
    tokio::select! {
        _ = token.cancelled() => {
            warn!("Cancelled.");
            true
        },
        _ = tokio::time::sleep(beat) => false
    }
}
