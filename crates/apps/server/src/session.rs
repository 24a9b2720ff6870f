//! Per-tab session state
//!
//! Each browser tab creates a session and keeps its id for the lifetime of
//! the tab. A session only holds the drawings reported by the map widget.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;
use vegscope_map::{Drawing, DrawingSession};

/// How often idle sessions are looked for
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct Session {
    pub drawings: DrawingSession,
    pub last_seen: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            drawings: DrawingSession::new(),
            last_seen: Instant::now(),
        }
    }
}

/// All live sessions
pub struct SessionStore {
    sessions: DashMap<Uuid, Session>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Start a new, empty session
    pub fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.insert(id, Session::new());
        tracing::debug!("Session {} created ({} live)", id, self.sessions.len());
        id
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Snapshot of a session's drawings; marks the session as seen
    ///
    /// The map guard is released before returning, so callers may await
    /// while holding the snapshot.
    pub fn drawings(&self, id: &Uuid) -> Option<DrawingSession> {
        let mut session = self.sessions.get_mut(id)?;
        session.last_seen = Instant::now();
        Some(session.drawings.clone())
    }

    /// Mark a session as seen; false when it does not exist
    pub fn touch(&self, id: &Uuid) -> bool {
        match self.sessions.get_mut(id) {
            Some(mut session) => {
                session.last_seen = Instant::now();
                true
            }
            None => false,
        }
    }

    /// Store what the widget reported; `None` leaves the drawings untouched
    pub fn replace_drawings(&self, id: &Uuid, all_drawings: Option<Vec<Drawing>>) -> Option<usize> {
        let mut session = self.sessions.get_mut(id)?;
        session.last_seen = Instant::now();
        session.drawings.replace_all(all_drawings);
        Some(session.drawings.len())
    }

    pub fn clear_drawings(&self, id: &Uuid) -> bool {
        match self.sessions.get_mut(id) {
            Some(mut session) => {
                session.last_seen = Instant::now();
                session.drawings.clear();
                true
            }
            None => false,
        }
    }

    /// Drop sessions not seen since `now - ttl`; returns how many went
    pub fn sweep(&self, now: Instant) -> usize {
        let mut evicted = 0;
        self.sessions.retain(|_, session| {
            let keep = now.saturating_duration_since(session.last_seen) < self.ttl;
            if !keep {
                evicted += 1;
            }
            keep
        });
        evicted
    }
}

/// Periodically evict idle sessions
pub async fn start_session_sweeper(store: Arc<SessionStore>) {
    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        interval.tick().await;
        let evicted = store.sweep(Instant::now());
        if evicted > 0 {
            tracing::info!("Evicted {} idle session(s), {} live", evicted, store.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square() -> Drawing {
        Drawing(json!({
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
            }
        }))
    }

    #[test]
    fn test_new_session_is_empty() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.create();
        assert_eq!(store.len(), 1);
        assert!(store.drawings(&id).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_session() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = Uuid::new_v4();
        assert!(store.drawings(&id).is_none());
        assert!(store.replace_drawings(&id, Some(vec![square()])).is_none());
        assert!(!store.clear_drawings(&id));
        assert!(!store.touch(&id));
    }

    #[test]
    fn test_replace_then_clear() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.create();

        assert_eq!(store.replace_drawings(&id, Some(vec![square(), square()])), Some(2));
        assert_eq!(store.replace_drawings(&id, None), Some(2));
        assert!(store.drawings(&id).unwrap().active_geometry().is_some());

        assert!(store.clear_drawings(&id));
        assert!(store.drawings(&id).unwrap().active_geometry().is_none());
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = SessionStore::new(Duration::from_secs(60));
        let a = store.create();
        let b = store.create();

        store.replace_drawings(&a, Some(vec![square()]));
        assert_eq!(store.drawings(&a).unwrap().len(), 1);
        assert!(store.drawings(&b).unwrap().is_empty());
    }

    #[test]
    fn test_sweep_evicts_idle_sessions() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.create();

        assert_eq!(store.sweep(Instant::now()), 0);
        assert_eq!(store.sweep(Instant::now() + Duration::from_secs(61)), 1);
        assert!(store.is_empty());
        assert!(store.drawings(&id).is_none());
    }

    #[test]
    fn test_sweep_while_sessions_are_created() {
        const PER_THREAD: usize = 5_000;
        let store = Arc::new(SessionStore::new(Duration::from_secs(60)));

        let creators: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..PER_THREAD {
                        store.create();
                    }
                })
            })
            .collect();

        // Nothing is idle yet, so nothing may be reported as evicted
        while !creators.iter().all(|h| h.is_finished()) {
            assert_eq!(store.sweep(Instant::now()), 0);
        }
        for handle in creators {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 4 * PER_THREAD);

        assert_eq!(store.sweep(Instant::now() + Duration::from_secs(61)), 4 * PER_THREAD);
        assert!(store.is_empty());
    }
}
