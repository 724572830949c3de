//! Outbound delivery seam.
//!
//! The runner only knows the [`Sender`] trait; concrete transports (push
//! gateways, SMS providers, chat webhooks) live behind it. The default
//! [`TracingSender`] just logs, which is what the server ships with until a
//! real provider is wired in.

use std::time::Duration;

use tokio::time::timeout;
use tracing::info;
use uuid::Uuid;

use tally_core::policy::Channel;

#[derive(Debug, thiserror::Error)]
pub enum SendError {
  #[error("delivery timed out after {0:?}")]
  Timeout(Duration),
  #[error("delivery failed: {0}")]
  Delivery(String),
}

pub trait Sender: Send + Sync {
  /// Deliver one message on one channel. Errors are recorded per attempt
  /// and never retried within the cycle.
  fn send<'a>(
    &'a self,
    channel: Channel,
    recipient: Uuid,
    message: &'a str,
  ) -> impl Future<Output = Result<(), SendError>> + Send + 'a;
}

/// Wrap a send in a hard deadline so a stuck provider cannot stall the
/// alert cycle.
pub async fn send_with_timeout<N: Sender>(
  sender: &N,
  channel: Channel,
  recipient: Uuid,
  message: &str,
  deadline: Duration,
) -> Result<(), SendError> {
  match timeout(deadline, sender.send(channel, recipient, message)).await {
    Ok(result) => result,
    Err(_) => Err(SendError::Timeout(deadline)),
  }
}

/// Logs every delivery at info level instead of sending anywhere.
#[derive(Debug, Default)]
pub struct TracingSender;

impl Sender for TracingSender {
  fn send<'a>(
    &'a self,
    channel: Channel,
    recipient: Uuid,
    message: &'a str,
  ) -> impl Future<Output = Result<(), SendError>> + Send + 'a {
    async move {
      info!(%channel, %recipient, message, "notification delivered");
      Ok(())
    }
  }
}
