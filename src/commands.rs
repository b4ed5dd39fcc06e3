use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::vendor::api::{CandidateOutcome, OpArg, OpName, ProviderFault, ProviderValue};
use crate::vendor::providers::{ConnectionProvider, ProviderKind, ProviderSet};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("no aircraft connected")]
    Disconnected,
    #[error("no {0} provider bound")]
    NoProvider(ProviderKind),
    #[error("operation {0} is not supported by this aircraft")]
    NotSupported(OpName),
    #[error(transparent)]
    Fault(#[from] ProviderFault),
    #[error("command dispatcher is gone")]
    DispatchGone,
}

/// A single operation to run against one provider, with a reply slot for
/// the outcome.
pub struct CommandRequest {
    pub kind: ProviderKind,
    pub op: OpName,
    pub arg: OpArg,
    pub reply: oneshot::Sender<Result<ProviderValue, CommandError>>,
}

/// Caller-side handle for issuing commands to the dispatch task.
#[derive(Clone)]
pub struct CommandClient {
    tx_commands: mpsc::Sender<CommandRequest>,
}

impl CommandClient {
    pub fn new(tx_commands: mpsc::Sender<CommandRequest>) -> Self {
        Self { tx_commands }
    }

    /// Run one operation and wait for its outcome.
    pub async fn execute(
        &self,
        kind: ProviderKind,
        op: OpName,
        arg: OpArg,
    ) -> Result<ProviderValue, CommandError> {
        let (reply, rx_reply) = oneshot::channel();
        let request = CommandRequest {
            kind,
            op,
            arg,
            reply,
        };
        if self.tx_commands.send(request).await.is_err() {
            return Err(CommandError::DispatchGone);
        }
        match rx_reply.await {
            Err(_) => Err(CommandError::DispatchGone),
            Ok(result) => result,
        }
    }
}

/// Task: Serve command requests one at a time against the bound
/// providers. Can be cancelled.
#[tracing::instrument(skip_all)]
pub async fn task_dispatch_commands(
    token: CancellationToken,
    mut rx_commands: mpsc::Receiver<CommandRequest>,
    connection: Arc<dyn ConnectionProvider>,
    providers: Arc<ProviderSet>,
) {
    info!("Started.");
    loop {
        tokio::select! {
            _ = token.cancelled() => {
                warn!("Cancelled.");
                break;
            },
            request = rx_commands.recv() => {
                match request {
                    None => {
                        warn!("Command channel closed.");
                        break;
                    }
                    Some(request) => handle_command(connection.as_ref(), &providers, request),
                }
            }
        };
    }
}

#[tracing::instrument(skip_all, fields(op = %request.op))]
fn handle_command(
    connection: &dyn ConnectionProvider,
    providers: &ProviderSet,
    request: CommandRequest,
) {
    debug!("Got command {}{}.", request.op, request.arg);
    let result = run_command(connection, providers, request.kind, request.op, request.arg);
    match &result {
        Ok(_) => debug!("Command {} succeeded.", request.op),
        Err(e) => error!("Command {} failed. Error: {}", request.op, e),
    };
    if request.reply.send(result).is_err() {
        warn!("Command caller went away before the reply.");
    }
}

fn run_command(
    connection: &dyn ConnectionProvider,
    providers: &ProviderSet,
    kind: ProviderKind,
    op: OpName,
    arg: OpArg,
) -> Result<ProviderValue, CommandError> {
    if connection.active_device().is_none() {
        return Err(CommandError::Disconnected);
    }
    let provider = providers.get(kind).ok_or(CommandError::NoProvider(kind))?;
    match provider.invoke(op, arg) {
        CandidateOutcome::Found(value) => Ok(value),
        CandidateOutcome::NotSupported => Err(CommandError::NotSupported(op)),
        CandidateOutcome::Failed(fault) => Err(CommandError::Fault(fault)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vendor::api::{AvoidanceMode, OP_SET_COLLISION_AVOIDANCE_ENABLED};
    use crate::vendor::providers::DeviceModel;
    use crate::vendor::sim::SimDrone;
    use crate::vendor::version::VendorApiVersion;

    fn spawn_dispatcher(
        drone: &Arc<SimDrone>,
        providers: ProviderSet,
    ) -> (CommandClient, CancellationToken) {
        let (tx_commands, rx_commands) = mpsc::channel(16);
        let token = CancellationToken::new();
        tokio::spawn(task_dispatch_commands(
            token.clone(),
            rx_commands,
            drone.connection(),
            Arc::new(providers),
        ));
        (CommandClient::new(tx_commands), token)
    }

    #[tokio::test]
    async fn test_command_round_trip_mutates_the_aircraft() {
        let drone = SimDrone::new(DeviceModel::Mini3Pro, VendorApiVersion::V5_11);
        drone.set_connected(true);
        let (client, token) = spawn_dispatcher(&drone, drone.providers());

        let value = client
            .execute(
                ProviderKind::Perception,
                OP_SET_COLLISION_AVOIDANCE_ENABLED,
                OpArg::Flag(false),
            )
            .await
            .unwrap();

        match value {
            ProviderValue::Vision(sample) => {
                assert_eq!(sample.avoidance_mode, AvoidanceMode::Disabled);
            }
            other => panic!("expected a vision echo, got {:?}", other),
        }
        token.cancel();
    }

    #[tokio::test]
    async fn test_disconnected_command_is_rejected() {
        let drone = SimDrone::new(DeviceModel::Mini3Pro, VendorApiVersion::V5_11);
        let (client, token) = spawn_dispatcher(&drone, drone.providers());

        let result = client
            .execute(
                ProviderKind::Perception,
                OP_SET_COLLISION_AVOIDANCE_ENABLED,
                OpArg::Flag(true),
            )
            .await;

        assert_eq!(result, Err(CommandError::Disconnected));
        token.cancel();
    }

    #[tokio::test]
    async fn test_unsupported_operation_is_reported() {
        let drone = SimDrone::new(DeviceModel::Mini3, VendorApiVersion::V5_8);
        drone.set_connected(true);
        let (client, token) = spawn_dispatcher(&drone, drone.providers());

        // 5.8 firmware only knows the old spelling.
        let result = client
            .execute(
                ProviderKind::Perception,
                OP_SET_COLLISION_AVOIDANCE_ENABLED,
                OpArg::Flag(true),
            )
            .await;

        assert_eq!(
            result,
            Err(CommandError::NotSupported(OP_SET_COLLISION_AVOIDANCE_ENABLED))
        );
        token.cancel();
    }

    #[tokio::test]
    async fn test_vendor_fault_passes_through() {
        let drone = SimDrone::new(DeviceModel::Mini3Pro, VendorApiVersion::V5_11);
        drone.set_connected(true);
        let fault = ProviderFault::new(6100, "gimbal obstruction");
        drone.inject_fault(ProviderKind::Perception, fault.clone());
        let (client, token) = spawn_dispatcher(&drone, drone.providers());

        let result = client
            .execute(
                ProviderKind::Perception,
                OP_SET_COLLISION_AVOIDANCE_ENABLED,
                OpArg::Flag(true),
            )
            .await;

        assert_eq!(result, Err(CommandError::Fault(fault)));
        token.cancel();
    }

    #[tokio::test]
    async fn test_missing_provider_is_reported() {
        let drone = SimDrone::new(DeviceModel::Mini3Pro, VendorApiVersion::V5_11);
        drone.set_connected(true);
        let (client, token) = spawn_dispatcher(&drone, ProviderSet::new());

        let result = client
            .execute(
                ProviderKind::Battery,
                OP_SET_COLLISION_AVOIDANCE_ENABLED,
                OpArg::Flag(true),
            )
            .await;

        assert_eq!(
            result,
            Err(CommandError::NoProvider(ProviderKind::Battery))
        );
        token.cancel();
    }

    #[tokio::test]
    async fn test_client_detects_a_dead_dispatcher() {
        let (tx_commands, rx_commands) = mpsc::channel(16);
        drop(rx_commands);
        let client = CommandClient::new(tx_commands);

        let result = client
            .execute(
                ProviderKind::Perception,
                OP_SET_COLLISION_AVOIDANCE_ENABLED,
                OpArg::Flag(true),
            )
            .await;

        assert_eq!(result, Err(CommandError::DispatchGone));
    }
}
