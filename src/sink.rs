use crate::delta::Delta;
use crate::errors::SinkResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::warn;

/// Host-side receiver of plugin deltas
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn handle_message(&self, plugin_id: &str, delta: Delta) -> SinkResult<()>;
}

/// A delta tagged with the plugin that produced it
#[derive(Clone, Debug)]
pub struct PublishedDelta {
    pub plugin_id: String,
    pub delta: Delta,
}

pub type DeltaStream = Pin<Box<dyn Stream<Item = PublishedDelta> + Send>>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceStats {
    pub messages_sent: u64,
    pub last_message_time_ns: u64,
}

/// In-process stand-in for the host message bus, fanning deltas out to every subscriber
#[derive(Clone)]
pub struct DeltaHub {
    tx: broadcast::Sender<PublishedDelta>,
    stats: Arc<RwLock<HashMap<String, SourceStats>>>,
}

impl DeltaHub {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            stats: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Stream of deltas published after this call. Lagging subscribers skip what they missed.
    pub fn subscribe(&self) -> DeltaStream {
        let stream = BroadcastStream::new(self.tx.subscribe()).filter_map(|item| match item {
            Ok(published) => Some(published),
            Err(e) => {
                warn!("[hub] subscriber dropped deltas: {}", e);
                None
            }
        });
        Box::pin(stream)
    }

    pub async fn stats(&self, plugin_id: &str) -> Option<SourceStats> {
        self.stats.read().await.get(plugin_id).cloned()
    }

    async fn update_stats(&self, plugin_id: &str) {
        let mut stats = self.stats.write().await;
        let entry = stats.entry(plugin_id.to_string()).or_default();

        entry.messages_sent += 1;
        entry.last_message_time_ns = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;
    }
}

impl Default for DeltaHub {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageSink for DeltaHub {
    async fn handle_message(&self, plugin_id: &str, delta: Delta) -> SinkResult<()> {
        let published = PublishedDelta {
            plugin_id: plugin_id.to_string(),
            delta,
        };

        // No active subscribers - this is fine
        let _ = self.tx.send(published);

        self.update_stats(plugin_id).await;
        Ok(())
    }
}
