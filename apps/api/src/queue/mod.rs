//! Queue worker — pulls tailoring jobs from the broker one at a time and
//! publishes results, with at-least-once delivery.
//!
//! Per message: Received → Processing → {Acked | Nacked-requeue |
//! Nacked-discard}. A result is published (persistent) to the output queue
//! *before* the input message is acked, so a crash between the two steps
//! redelivers instead of losing work. Decode failures are discarded without
//! requeue — a syntactically invalid message can never succeed on retry.
//! Every other failure is requeued for another worker instance.
//!
//! The decision logic lives in `process_message`, which knows nothing about
//! the broker, so dispositions are unit-tested without AMQP.

use std::time::Duration;

use futures_util::StreamExt;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicPublishOptions, BasicQosOptions,
    QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::models::job::{TailoredOutput, TailoringPayload};
use crate::tailoring::{TailorError, TailorService};

pub const IN_QUEUE: &str = "job_to_tailor_queue";
pub const OUT_QUEUE: &str = "job_completed_queue";
const CONSUMER_TAG: &str = "llm-worker";

/// AMQP delivery mode 2 marks a published message persistent.
const PERSISTENT: u8 = 2;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);
const MAX_CONNECT_ATTEMPTS: u32 = 10;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Broker error: {0}")]
    Broker(#[from] lapin::Error),

    #[error("Could not reach broker after {attempts} attempts")]
    ConnectExhausted { attempts: u32 },
}

/// Why one message failed. Drives the ack/nack decision.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Malformed message body: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Tailoring failed: {0}")]
    Tailoring(#[from] TailorError),
}

impl ProcessError {
    /// Malformed bodies are discarded — retrying an unparseable message can
    /// never succeed. Everything else gets another chance on the queue.
    pub fn should_requeue(&self) -> bool {
        !matches!(self, ProcessError::Malformed(_))
    }
}

/// Decodes one message body and runs the tailoring pipeline on it.
pub async fn process_message(
    service: &TailorService,
    body: &[u8],
) -> Result<TailoredOutput, ProcessError> {
    let payload: TailoringPayload = serde_json::from_slice(body)?;
    let options = payload.options.clone().unwrap_or_default();

    info!(
        job_id = %payload.job.job_id,
        platform = %payload.job.platform,
        "Received tailoring job"
    );

    let result = service
        .tailor(&payload.resume, &payload.job, &options)
        .await?;

    Ok(TailoredOutput {
        job_id: payload.job.job_id,
        status: "success".to_string(),
        result,
    })
}

/// Runs the worker until the broker becomes unreachable for
/// `MAX_CONNECT_ATTEMPTS` consecutive attempts. A successful connection
/// resets the attempt counter; connection loss mid-consume re-enters the
/// reconnect loop after a fixed delay.
pub async fn run(amqp_url: &str, service: &TailorService) -> Result<(), QueueError> {
    let mut attempts: u32 = 0;

    loop {
        match Connection::connect(amqp_url, ConnectionProperties::default()).await {
            Ok(connection) => {
                attempts = 0;
                info!("Connected to broker, waiting for jobs");
                if let Err(e) = consume(&connection, service).await {
                    warn!(error = %e, "Broker connection lost, reconnecting");
                }
            }
            Err(e) => {
                attempts += 1;
                warn!(
                    attempt = attempts,
                    max_attempts = MAX_CONNECT_ATTEMPTS,
                    error = %e,
                    "Could not connect to broker"
                );
                if attempts >= MAX_CONNECT_ATTEMPTS {
                    return Err(QueueError::ConnectExhausted { attempts });
                }
            }
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

/// One consumer session: declare durable queues, prefetch = 1, then handle
/// deliveries until the stream ends or the channel errors. The channel is
/// owned by this single loop — no other consumer touches it.
async fn consume(connection: &Connection, service: &TailorService) -> Result<(), lapin::Error> {
    let channel = connection.create_channel().await?;

    let durable = QueueDeclareOptions {
        durable: true,
        ..Default::default()
    };
    channel
        .queue_declare(IN_QUEUE, durable, FieldTable::default())
        .await?;
    channel
        .queue_declare(OUT_QUEUE, durable, FieldTable::default())
        .await?;

    // One unacked message in flight at a time.
    channel.basic_qos(1, BasicQosOptions::default()).await?;

    let mut consumer = channel
        .basic_consume(
            IN_QUEUE,
            CONSUMER_TAG,
            BasicConsumeOptions::default(),
            FieldTable::default(),
        )
        .await?;

    while let Some(delivery) = consumer.next().await {
        let delivery = delivery?;

        match process_message(service, &delivery.data).await {
            Ok(output) => {
                let body = match serde_json::to_vec(&output) {
                    Ok(body) => body,
                    Err(e) => {
                        error!(job_id = %output.job_id, error = %e, "Could not encode result, requeueing");
                        delivery
                            .nack(BasicNackOptions {
                                requeue: true,
                                ..Default::default()
                            })
                            .await?;
                        continue;
                    }
                };

                publish_result(&channel, &body).await?;
                delivery.ack(BasicAckOptions::default()).await?;
                info!(job_id = %output.job_id, "Finished job, published to {OUT_QUEUE}");
            }
            Err(e) => {
                let requeue = e.should_requeue();
                error!(error = %e, requeue, "Error processing job");
                delivery
                    .nack(BasicNackOptions {
                        requeue,
                        ..Default::default()
                    })
                    .await?;
            }
        }
    }

    Ok(())
}

async fn publish_result(channel: &Channel, body: &[u8]) -> Result<(), lapin::Error> {
    channel
        .basic_publish(
            "",
            OUT_QUEUE,
            BasicPublishOptions::default(),
            body,
            BasicProperties::default().with_delivery_mode(PERSISTENT),
        )
        .await?
        .await?;
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
