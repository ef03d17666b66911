use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::application::ports::{ProgressNotifier, Subscription};
use crate::domain::{JobEvent, JobId};

const CHANNEL_CAPACITY: usize = 64;

/// Per-job fan-out over tokio broadcast channels.
///
/// A job's channel lives from `register` until its terminal event; after
/// that, `subscribe` returns None and clients read the stored snapshot
/// instead. Slow subscribers that overflow the channel miss intermediate
/// progress events but still observe the terminal event.
pub struct ChannelNotifier {
    channels: DashMap<JobId, broadcast::Sender<JobEvent>>,
}

impl ChannelNotifier {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }
}

impl Default for ChannelNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ChannelNotifier {
    fn register(&self, job_id: JobId) {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        self.channels.insert(job_id, sender);
    }

    fn notify(&self, job_id: JobId, event: JobEvent) {
        let terminal = event.is_terminal();
        if let Some(sender) = self.channels.get(&job_id) {
            // Err means no live subscribers; the event still lands in the
            // job store, so nothing is lost.
            let _ = sender.send(event);
        }
        if terminal {
            self.channels.remove(&job_id);
        }
    }

    fn subscribe(&self, job_id: JobId) -> Option<Subscription> {
        let mut receiver = self.channels.get(&job_id)?.subscribe();
        let events = async_stream::stream! {
            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        let terminal = event.is_terminal();
                        yield event;
                        if terminal {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Subscriber lagged, skipping progress events");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        };
        Some(Subscription {
            job_id,
            started_at: Utc::now(),
            events: Box::pin(events),
        })
    }
}
