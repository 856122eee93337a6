use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use webchat_core::{Sender, SessionOptions, Storage, StorageError, Turn};

use crate::backend::MemoryStorage;
use crate::record::{SessionHandle, SessionKind, SessionRecord};

/// Owns the lifecycle of the persisted session record.
///
/// Every method fails soft: storage and parse errors are logged and turned
/// into "no session data", so the send flow never sees them. Concurrent
/// writers are not coordinated; the last write wins.
pub struct SessionStore {
    storage: Arc<dyn Storage>,
    options: SessionOptions,
}

impl SessionStore {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, options: SessionOptions) -> Self {
        Self { storage, options }
    }

    /// A store backed by process memory with default options.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), SessionOptions::default())
    }

    #[must_use]
    pub const fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Return the active session, creating a fresh one when the stored record
    /// is absent, malformed or older than the configured TTL.
    ///
    /// When storage cannot be read, or a new record cannot be written, the
    /// returned id is temporary and will not survive a restart.
    pub async fn get_or_create_session(&self) -> SessionHandle {
        let now = Utc::now();

        let stored = match self.load().await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "Session storage unavailable, using temporary session");
                return self.temporary_handle(now);
            }
        };

        if let Some(mut record) = stored.filter(|r| self.is_valid(r, now)) {
            record.last_activity = now;
            if let Err(e) = self.save(&record).await {
                warn!(session_id = %record.id, error = %e, "Failed to refresh session activity");
            }
            debug!(session_id = %record.id, "Using existing session");
            return SessionHandle {
                message_count: record.conversation.len(),
                id: record.id,
                is_new: false,
                kind: SessionKind::Persistent,
            };
        }

        let record = SessionRecord::new(generate_id(&self.options.id_prefix, now), now);
        if let Err(e) = self.save(&record).await {
            warn!(error = %e, "Failed to persist new session, using temporary session");
            return self.temporary_handle(now);
        }

        info!(session_id = %record.id, "Created new session");
        SessionHandle {
            id: record.id,
            is_new: true,
            kind: SessionKind::Persistent,
            message_count: 0,
        }
    }

    /// Append one turn to the stored conversation.
    ///
    /// A no-op when there is no stored record. Never fails.
    pub async fn append_turn(&self, sender: Sender, message: &str) {
        let mut record = match self.load().await {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!("No session record, turn not tracked");
                return;
            }
            Err(e) => {
                warn!(error = %e, "Error tracking message in history");
                return;
            }
        };

        record.push_turn(Turn::new(sender, message), self.options.max_turns);

        match self.save(&record).await {
            Ok(()) => debug!(
                session_id = %record.id,
                turns = record.conversation.len(),
                "Added message to conversation history"
            ),
            Err(e) => warn!(session_id = %record.id, error = %e, "Error tracking message in history"),
        }
    }

    /// The last `n` stored turns, oldest first; empty without a record.
    pub async fn recent_history(&self, n: usize) -> Vec<Turn> {
        match self.load().await {
            Ok(Some(record)) => record.last_n_turns(n).to_vec(),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Could not read conversation history");
                Vec::new()
            }
        }
    }

    /// The stored record, if there is a valid one.
    pub async fn current(&self) -> Option<SessionRecord> {
        let now = Utc::now();
        match self.load().await {
            Ok(stored) => stored.filter(|r| self.is_valid(r, now)),
            Err(e) => {
                warn!(error = %e, "Could not read session record");
                None
            }
        }
    }

    /// Forget the stored record so the next send starts a new session.
    pub async fn reset(&self) {
        match self.storage.remove(&self.options.key).await {
            Ok(()) => info!(key = %self.options.key, "Session record removed"),
            Err(e) => warn!(error = %e, "Failed to remove session record"),
        }
    }

    async fn load(&self) -> Result<Option<SessionRecord>, StorageError> {
        let Some(raw) = self.storage.get(&self.options.key).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<SessionRecord>(&raw) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!(error = %e, "Error parsing session data, treating as absent");
                Ok(None)
            }
        }
    }

    async fn save(&self, record: &SessionRecord) -> Result<(), StorageError> {
        let raw = serde_json::to_string(record)
            .map_err(|e| StorageError::Unavailable(format!("cannot encode session: {e}")))?;
        self.storage.set(&self.options.key, &raw).await
    }

    fn is_valid(&self, record: &SessionRecord, now: DateTime<Utc>) -> bool {
        if record.id.is_empty() {
            return false;
        }
        if self.options.require_prefix && !record.id.starts_with(&self.options.id_prefix) {
            return false;
        }
        record.age(now) < self.options.ttl()
    }

    fn temporary_handle(&self, now: DateTime<Utc>) -> SessionHandle {
        SessionHandle {
            id: generate_id(&self.options.temporary_prefix, now),
            is_new: true,
            kind: SessionKind::Temporary,
            message_count: 0,
        }
    }
}

/// `prefix` + epoch millis + `_` + nine random characters.
fn generate_id(prefix: &str, now: DateTime<Utc>) -> String {
    let random: String = Uuid::new_v4().simple().to_string().chars().take(9).collect();
    format!("{prefix}{}_{random}", now.timestamp_millis())
}
