//! In-memory session map keyed by chat id.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use super::state::Session;

struct Entry {
    session: Session,
    last_seen: Instant,
}

/// Sessions for all chats. Lost on restart; chats that stay quiet longer
/// than the TTL are dropped by `evict_idle`.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<i64, Entry>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` on the chat's session, creating it on first contact.
    /// The entry stays locked for the duration of `f`.
    pub fn with_session<R>(&self, chat_id: i64, f: impl FnOnce(&mut Session) -> R) -> R {
        let now = Instant::now();
        let mut entry = self.sessions.entry(chat_id).or_insert_with(|| Entry {
            session: Session::default(),
            last_seen: now,
        });
        entry.last_seen = now;
        f(&mut entry.session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Drop sessions idle for at least `ttl`. Returns how many went.
    pub fn evict_idle(&self, ttl: Duration) -> usize {
        self.evict_idle_at(Instant::now(), ttl)
    }

    fn evict_idle_at(&self, now: Instant, ttl: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, e| now.saturating_duration_since(e.last_seen) < ttl);
        before.saturating_sub(self.sessions.len())
    }
}
