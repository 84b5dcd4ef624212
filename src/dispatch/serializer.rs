//! Dispatch serializer
//!
//! Every chat gets its own FIFO lane: a channel drained by one worker task.
//! Events of one chat run strictly one after another in submission order,
//! while lanes of different chats run concurrently. The worker owns the
//! chat's conversation context for the duration of a turn.
//!
//! A lane that sees no traffic for the configured idle period is dropped;
//! the next event for that chat starts a fresh one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

use super::event::InboundEvent;
use super::reply::Outbound;
use crate::config::DispatchConfig;
use crate::state::{ConversationContext, SessionStorage};
use crate::utils::errors::{Result, SplitBuddyError};

/// Handles one event with exclusive access to its chat's context
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(
        &self,
        event: InboundEvent,
        session: &mut ConversationContext,
    ) -> Result<Vec<Outbound>>;
}

struct Job {
    event: InboundEvent,
    respond_to: oneshot::Sender<Result<Vec<Outbound>>>,
}

struct Shared {
    handler: Arc<dyn EventHandler>,
    sessions: Arc<dyn SessionStorage>,
    lanes: Mutex<HashMap<i64, mpsc::UnboundedSender<Job>>>,
    idle: Duration,
}

#[derive(Clone)]
pub struct DispatchSerializer {
    shared: Arc<Shared>,
}

impl DispatchSerializer {
    pub fn new(
        handler: Arc<dyn EventHandler>,
        sessions: Arc<dyn SessionStorage>,
        config: &DispatchConfig,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                handler,
                sessions,
                lanes: Mutex::new(HashMap::new()),
                idle: Duration::from_secs(config.idle_lane_seconds),
            }),
        }
    }

    /// Queue an event on its chat's lane.
    ///
    /// The position in the lane is fixed when this returns, so callers that
    /// submit in order are processed in order even if they await later.
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, event: InboundEvent) -> oneshot::Receiver<Result<Vec<Outbound>>> {
        let key = event.chat_key();
        let (respond_to, response) = oneshot::channel();
        let mut job = Job { event, respond_to };

        let mut lanes = self.shared.lanes.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(lane) = lanes.get(&key) {
            match lane.send(job) {
                Ok(()) => return response,
                // The worker died; start over with a new lane
                Err(mpsc::error::SendError(returned)) => {
                    warn!(chat_id = key, "Dispatch lane closed unexpectedly, restarting");
                    job = returned;
                }
            }
        }

        let (lane, jobs) = mpsc::unbounded_channel();
        if lane.send(job).is_err() {
            // Unreachable while `jobs` is alive
            error!(chat_id = key, "Failed to queue event on a new lane");
        }
        lanes.insert(key, lane);
        drop(lanes);

        debug!(chat_id = key, "Dispatch lane started");
        tokio::spawn(run_lane(self.shared.clone(), key, jobs));
        response
    }

    /// Submit an event and wait for its outcome
    pub async fn dispatch(&self, event: InboundEvent) -> Result<Vec<Outbound>> {
        self.submit(event)
            .await
            .map_err(|_| SplitBuddyError::Dispatch("event worker stopped before replying".to_string()))?
    }

    /// Number of chats with a live lane
    pub fn active_lanes(&self) -> usize {
        self.shared
            .lanes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

async fn run_lane(shared: Arc<Shared>, key: i64, mut jobs: mpsc::UnboundedReceiver<Job>) {
    loop {
        let job = match tokio::time::timeout(shared.idle, jobs.recv()).await {
            Ok(Some(job)) => job,
            Ok(None) => break,
            Err(_) => {
                // Submitters send while holding the lock, so an empty queue
                // checked under it stays empty until the lane is gone.
                let mut lanes = shared.lanes.lock().unwrap_or_else(PoisonError::into_inner);
                match jobs.try_recv() {
                    Ok(job) => {
                        drop(lanes);
                        job
                    }
                    Err(_) => {
                        lanes.remove(&key);
                        debug!(chat_id = key, "Dispatch lane idle, dropped");
                        return;
                    }
                }
            }
        };

        let result = process(&shared, job.event).await;
        if job.respond_to.send(result).is_err() {
            debug!(chat_id = key, "Event outcome discarded by caller");
        }
    }
}

async fn process(shared: &Shared, event: InboundEvent) -> Result<Vec<Outbound>> {
    let chat_id = event.chat_key();
    debug!(chat_id = chat_id, event = event.kind.name(), "Dispatching event");

    let loaded = shared.sessions.load(chat_id).await?;
    let existed = loaded.is_some();
    let mut session = loaded.unwrap_or_else(|| ConversationContext::new(chat_id));
    let before = session.clone();

    let result = shared.handler.handle(event, &mut session).await;

    let persisted = if session.is_idle() {
        if existed {
            shared.sessions.delete(chat_id).await
        } else {
            Ok(())
        }
    } else if session != before {
        shared.sessions.save(&session).await
    } else {
        Ok(())
    };
    if let Err(e) = persisted {
        error!(chat_id = chat_id, error = %e, "Failed to persist conversation context");
    }

    result
}
