pub mod listener;
pub mod task;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::Sender;
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::info;

use crate::bindings::ProviderBinding;
use crate::models::SensorReading;
use crate::vendor::providers::{ConnectionProvider, ProviderSet};

use task::task_poll_sweeps;

/// One running poll session: the sweep task plus the handles to wind it
/// down.
struct PollSession {
    token: CancellationToken,
    tasks: TaskTracker,
    interval: Duration,
}

/// Owns the periodic sweep over the bound sensor categories. At most one
/// session runs at a time; starting a new one winds the old one down
/// first, so two sweeps are never in flight together.
pub struct SensorPoller {
    connection: Arc<dyn ConnectionProvider>,
    providers: Arc<ProviderSet>,
    bindings: Arc<Vec<ProviderBinding>>,
    tx_readings: Sender<SensorReading>,
    session: Option<PollSession>,
}

impl SensorPoller {
    pub fn new(
        connection: Arc<dyn ConnectionProvider>,
        providers: ProviderSet,
        bindings: Vec<ProviderBinding>,
        tx_readings: Sender<SensorReading>,
    ) -> Self {
        Self {
            connection,
            providers: Arc::new(providers),
            bindings: Arc::new(bindings),
            tx_readings,
            session: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    pub fn interval(&self) -> Option<Duration> {
        self.session.as_ref().map(|session| session.interval)
    }

    /// Begin sweeping at the given interval.
    #[tracing::instrument(skip_all)]
    pub async fn start(&mut self, interval: Duration) {
        // 1. Wind down the running session, if any.
        self.stop().await;

        // 2. Spawn the sweep task under a fresh token.
        info!("Starting poll session with interval {:?}.", interval);
        let token = CancellationToken::new();
        let tasks = TaskTracker::new();

        let token_clone = token.clone();
        let connection = Arc::clone(&self.connection);
        let providers = Arc::clone(&self.providers);
        let bindings = Arc::clone(&self.bindings);
        let tx_readings = self.tx_readings.clone();
        tasks.spawn(async move {
            task_poll_sweeps(
                token_clone,
                connection,
                providers,
                bindings,
                interval,
                tx_readings,
            )
            .await
        });

        self.session = Some(PollSession {
            token,
            tasks,
            interval,
        });
    }

    /// Stop sweeping and wait for the in-flight sweep to wind down.
    /// Stopping an idle poller does nothing.
    #[tracing::instrument(skip_all)]
    pub async fn stop(&mut self) {
        let session = match self.session.take() {
            None => return,
            Some(session) => session,
        };
        info!("Stopping poll session.");
        session.token.cancel();
        session.tasks.close();
        session.tasks.wait().await;
    }
}
