use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::broadcast::Receiver;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_util::sync::CancellationToken;
use tracing::{info, trace, warn};

use crate::models::SensorReading;

/// Presentation seam for sweep output. Implementations run on the
/// delivery task and must not block.
pub trait ReadingListener: Send + Sync {
    fn on_reading(&self, reading: &SensorReading);
}

/// Listener that renders each reading as one log line.
pub struct LogListener;

impl ReadingListener for LogListener {
    fn on_reading(&self, reading: &SensorReading) {
        info!("{}", reading);
    }
}

/// Task: Forward readings from the broadcast channel to the listener.
/// A slow listener skips lagged readings instead of stalling the poller.
/// Can be cancelled.
#[tracing::instrument(skip_all)]
pub async fn task_deliver_readings(
    token: CancellationToken,
    rx_readings: Receiver<SensorReading>,
    listener: Arc<dyn ReadingListener>,
) {
    info!("Started.");
    let mut readings = BroadcastStream::new(rx_readings);
    loop {
        tokio::select! {
            _ = token.cancelled() => {
                warn!("Cancelled.");
                break;
            },
            item = readings.next() => {
                match item {
                    None => {
                        warn!("Reading channel closed.");
                        break;
                    }
                    Some(Err(BroadcastStreamRecvError::Lagged(skipped))) => {
                        warn!("Listener fell behind. Skipped {} readings.", skipped);
                    }
                    Some(Ok(reading)) => {
                        trace!("Got a reading: {}", reading);
                        listener.on_reading(&reading);
                    }
                }
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tokio::sync::broadcast;

    use super::*;
    use crate::models::{Availability, Category};

    struct RecordingListener {
        readings: Mutex<Vec<SensorReading>>,
    }

    impl RecordingListener {
        fn new() -> Arc<Self> {
            Arc::new(RecordingListener {
                readings: Mutex::new(vec![]),
            })
        }

        fn seen(&self) -> Vec<SensorReading> {
            self.readings.lock().unwrap().clone()
        }
    }

    impl ReadingListener for RecordingListener {
        fn on_reading(&self, reading: &SensorReading) {
            self.readings.lock().unwrap().push(reading.clone());
        }
    }

    #[tokio::test]
    async fn test_readings_reach_the_listener_in_order() {
        let (tx, rx) = broadcast::channel(32);
        let token = CancellationToken::new();
        let listener = RecordingListener::new();

        let task = tokio::spawn(task_deliver_readings(
            token.clone(),
            rx,
            Arc::clone(&listener) as Arc<dyn ReadingListener>,
        ));

        tx.send(SensorReading::offline(
            Category::Gps,
            Availability::Disconnected,
        ))
        .unwrap();
        tx.send(SensorReading::offline(
            Category::Battery,
            Availability::Unavailable,
        ))
        .unwrap();
        drop(tx);
        task.await.unwrap();

        let seen = listener.seen();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].category(), Category::Gps);
        assert_eq!(seen[1].category(), Category::Battery);
    }

    #[tokio::test]
    async fn test_lagged_readings_are_skipped_not_fatal() {
        let (tx, rx) = broadcast::channel(2);
        let token = CancellationToken::new();
        let listener = RecordingListener::new();

        // Overrun the channel before the task gets to run.
        for _ in 0..5 {
            tx.send(SensorReading::offline(
                Category::Vision,
                Availability::Disconnected,
            ))
            .unwrap();
        }
        let task = tokio::spawn(task_deliver_readings(
            token.clone(),
            rx,
            Arc::clone(&listener) as Arc<dyn ReadingListener>,
        ));
        drop(tx);
        task.await.unwrap();

        assert_eq!(listener.seen().len(), 2);
    }

    #[tokio::test]
    async fn test_cancel_stops_delivery() {
        let (tx, rx) = broadcast::channel(32);
        let token = CancellationToken::new();
        let listener = RecordingListener::new();

        let task = tokio::spawn(task_deliver_readings(
            token.clone(),
            rx,
            Arc::clone(&listener) as Arc<dyn ReadingListener>,
        ));
        token.cancel();
        task.await.unwrap();

        // The task dropped its receiver, so nothing is listening anymore.
        assert!(tx
            .send(SensorReading::offline(
                Category::Flight,
                Availability::Disconnected,
            ))
            .is_err());
        assert!(listener.seen().is_empty());
    }
}
