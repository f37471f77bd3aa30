use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{contract::ContractConfig, mailbox::Mailbox};

/// Outcome of handing one config to the subscriber.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Forwarded {
    Sent,
    /// The stop signal fired while the subscriber was not receiving.
    Stopped,
    /// The subscriber dropped its end of the channel.
    Closed,
}

/// Moves configs from the mailbox to the subscriber until `stop` fires.
///
/// The subscriber may take arbitrarily long to receive; only `stop` interrupts a pending send.
/// Dropping `sender` on return is what closes the subscriber's stream.
pub(crate) async fn forward_configs(
    configs: Arc<Mailbox<ContractConfig>>,
    sender: mpsc::Sender<ContractConfig>,
    stop: CancellationToken,
) {
    'forwarding: loop {
        tokio::select! {
            biased;
            () = stop.cancelled() => break,
            () = configs.notified() => {}
        }

        while let Some(config) = configs.retrieve() {
            match forward(&sender, config, &stop).await {
                Forwarded::Sent => {}
                Forwarded::Stopped => break 'forwarding,
                Forwarded::Closed => {
                    warn!("Config subscriber dropped, stopping config forwarding");
                    break 'forwarding;
                }
            }
        }
    }
    debug!(pending = configs.len(), "Config forwarding stopped");
}

async fn forward(
    sender: &mpsc::Sender<ContractConfig>,
    config: ContractConfig,
    stop: &CancellationToken,
) -> Forwarded {
    let config_digest = config.config_digest;
    tokio::select! {
        biased;
        () = stop.cancelled() => Forwarded::Stopped,
        sent = sender.send(config) => match sent {
            Ok(()) => {
                info!(config_digest = %config_digest, "Forwarded new contract config");
                Forwarded::Sent
            }
            Err(_) => Forwarded::Closed,
        },
    }
}
