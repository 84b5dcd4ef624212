//! Session storage
//!
//! Persists per-chat conversation contexts between inbound events. Redis is
//! used in production; the in-memory store backs tests and single-process
//! deployments. Expired contexts read as absent in both.

use std::collections::HashMap;

use async_trait::async_trait;
use redis::AsyncCommands;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use super::context::ConversationContext;
use crate::config::RedisConfig;
use crate::utils::errors::Result;

/// Minimum lifetime given to a stored context
const MIN_TTL_SECONDS: i64 = 60;

#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Load a live context; expired ones are removed and reported as `None`
    async fn load(&self, chat_id: i64) -> Result<Option<ConversationContext>>;

    async fn save(&self, context: &ConversationContext) -> Result<()>;

    async fn delete(&self, chat_id: i64) -> Result<()>;
}

/// Redis-based session storage
#[derive(Clone)]
pub struct RedisSessionStorage {
    connection_manager: redis::aio::ConnectionManager,
    config: RedisConfig,
}

impl RedisSessionStorage {
    pub async fn new(config: RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        let connection_manager = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self {
            connection_manager,
            config,
        })
    }

    /// Test Redis connection
    pub async fn test_connection(&self) -> Result<()> {
        let mut conn = self.connection_manager.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    fn session_key(&self, chat_id: i64) -> String {
        format!("{}session:{}", self.config.prefix, chat_id)
    }

    fn ttl_for(&self, context: &ConversationContext) -> u64 {
        match context.remaining_seconds() {
            Some(seconds) => seconds.max(MIN_TTL_SECONDS) as u64,
            None => self.config.ttl_seconds,
        }
    }
}

#[async_trait]
impl SessionStorage for RedisSessionStorage {
    async fn load(&self, chat_id: i64) -> Result<Option<ConversationContext>> {
        let key = self.session_key(chat_id);
        let mut conn = self.connection_manager.clone();

        let serialized: Option<String> = conn.get(&key).await.map_err(|e| {
            error!(chat_id = chat_id, error = %e, "Failed to get session from Redis");
            e
        })?;

        let Some(data) = serialized else {
            return Ok(None);
        };

        let context: ConversationContext = serde_json::from_str(&data).map_err(|e| {
            error!(chat_id = chat_id, error = %e, "Failed to deserialize session");
            e
        })?;

        if context.is_expired() {
            warn!(chat_id = chat_id, expires_at = ?context.expires_at, "Session has expired, removing");
            self.delete(chat_id).await?;
            return Ok(None);
        }

        debug!(chat_id = chat_id, step = ?context.step, "Session loaded");
        Ok(Some(context))
    }

    async fn save(&self, context: &ConversationContext) -> Result<()> {
        let key = self.session_key(context.chat_id);
        let serialized = serde_json::to_string(context)?;
        let ttl_seconds = self.ttl_for(context);

        let mut conn = self.connection_manager.clone();
        conn.set_ex::<_, _, ()>(&key, serialized, ttl_seconds)
            .await
            .map_err(|e| {
                error!(chat_id = context.chat_id, error = %e, "Failed to save session to Redis");
                e
            })?;

        debug!(chat_id = context.chat_id, ttl_seconds = ttl_seconds, "Session saved");
        Ok(())
    }

    async fn delete(&self, chat_id: i64) -> Result<()> {
        let key = self.session_key(chat_id);
        let mut conn = self.connection_manager.clone();
        let deleted: u32 = conn.del(&key).await?;
        debug!(chat_id = chat_id, deleted = deleted, "Session deleted");
        Ok(())
    }
}

impl std::fmt::Debug for RedisSessionStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSessionStorage")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Process-local session storage
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    sessions: Mutex<HashMap<i64, ConversationContext>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored contexts, expired ones included
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn load(&self, chat_id: i64) -> Result<Option<ConversationContext>> {
        let mut sessions = self.sessions.lock().await;
        match sessions.get(&chat_id) {
            Some(context) if context.is_expired() => {
                debug!(chat_id = chat_id, "Session has expired, removing");
                sessions.remove(&chat_id);
                Ok(None)
            }
            other => Ok(other.cloned()),
        }
    }

    async fn save(&self, context: &ConversationContext) -> Result<()> {
        self.sessions
            .lock()
            .await
            .insert(context.chat_id, context.clone());
        Ok(())
    }

    async fn delete(&self, chat_id: i64) -> Result<()> {
        self.sessions.lock().await.remove(&chat_id);
        Ok(())
    }
}
