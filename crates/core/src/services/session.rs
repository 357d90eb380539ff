//! Session-scoped report cache and vote ledger.
//!
//! Reports created during a browsing session are staged here so they
//! show up in listings immediately, before the store's read-after-write
//! becomes visible. Votes live here too: they are session state, never
//! persisted. Nothing in this registry survives a restart.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::services::vote::VoteTally;
use pulso_db::entities::report;

/// State held for one session.
#[derive(Debug, Default)]
struct SessionState {
    /// Reports created this session, most recent first.
    reports: Vec<report::Model>,
    /// Vote tallies keyed by report ID.
    votes: HashMap<String, VoteTally>,
    /// Last time this session was touched.
    last_seen: Option<Instant>,
}

/// Registry of per-session state.
///
/// Entries idle longer than the TTL are swept out during writes, so
/// abandoned sessions do not accumulate.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, SessionState>>>,
    ttl: Duration,
}

impl SessionRegistry {
    /// Create a new registry with the given idle TTL.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Prepend a freshly created report to the session's cache.
    pub async fn prepend_report(&self, session_id: &str, model: report::Model) {
        let mut sessions = self.sessions.write().await;
        let state = sessions.entry(session_id.to_string()).or_default();
        state.reports.insert(0, model);
        state.last_seen = Some(Instant::now());

        Self::sweep(&mut sessions, self.ttl);
    }

    /// All reports created this session, most recent first.
    pub async fn reports(&self, session_id: &str) -> Vec<report::Model> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(session_id) {
            Some(state) => {
                state.last_seen = Some(Instant::now());
                state.reports.clone()
            }
            None => Vec::new(),
        }
    }

    /// Reports created this session by a single reporter.
    pub async fn reports_by_user(&self, session_id: &str, user_id: &str) -> Vec<report::Model> {
        self.reports(session_id)
            .await
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .collect()
    }

    /// Find one session-created report by ID.
    pub async fn find_report(&self, session_id: &str, report_id: &str) -> Option<report::Model> {
        self.reports(session_id)
            .await
            .into_iter()
            .find(|r| r.id == report_id)
    }

    /// Run a closure against the session's tally for a report, seeding
    /// it first if the session has not voted on that report yet.
    ///
    /// The registry lock is held for the duration of the closure, which
    /// serializes vote toggles within a session.
    pub async fn with_tally<F, R>(
        &self,
        session_id: &str,
        report_id: &str,
        seed: VoteTally,
        f: F,
    ) -> R
    where
        F: FnOnce(&mut VoteTally) -> R,
    {
        let mut sessions = self.sessions.write().await;
        let state = sessions.entry(session_id.to_string()).or_default();
        state.last_seen = Some(Instant::now());
        let tally = state.votes.entry(report_id.to_string()).or_insert(seed);
        let result = f(tally);

        Self::sweep(&mut sessions, self.ttl);
        result
    }

    /// Snapshot of every tally this session holds.
    pub async fn tallies(&self, session_id: &str) -> HashMap<String, VoteTally> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(session_id) {
            Some(state) => {
                state.last_seen = Some(Instant::now());
                state.votes.clone()
            }
            None => HashMap::new(),
        }
    }

    /// Drop every session idle longer than the TTL.
    pub async fn purge_expired(&self) {
        let mut sessions = self.sessions.write().await;
        let ttl = self.ttl;
        let now = Instant::now();
        sessions.retain(|_, state| {
            state
                .last_seen
                .is_some_and(|seen| now.duration_since(seen) <= ttl)
        });
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether the registry holds no sessions.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    // Drop idle entries occasionally, once the map grows past the point
    // where a linear pass is worth it.
    fn sweep(sessions: &mut HashMap<String, SessionState>, ttl: Duration) {
        if sessions.len() > 100 {
            let now = Instant::now();
            sessions.retain(|_, state| {
                state
                    .last_seen
                    .is_some_and(|seen| now.duration_since(seen) <= ttl)
            });
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::vote::VoteDirection;
    use chrono::Utc;
    use pulso_db::entities::report::{Category, Status, Urgency};
    use serde_json::json;

    fn test_report(id: &str, user_id: &str) -> report::Model {
        report::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            reporter: json!({"id": user_id, "name": "Test Reporter"}),
            category: Category::Pollution,
            urgency: Urgency::Low,
            status: Status::Pending,
            description: "Trash piling up by the river".to_string(),
            latitude: -18.0,
            longitude: -70.2,
            address: None,
            media: json!([]),
            upvotes: 0,
            downvotes: 0,
            internal_comments: json!([]),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_prepend_keeps_most_recent_first() {
        let registry = SessionRegistry::new(Duration::from_secs(60));

        registry.prepend_report("s1", test_report("r1", "u1")).await;
        registry.prepend_report("s1", test_report("r2", "u1")).await;

        let reports = registry.reports("s1").await;
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].id, "r2");
        assert_eq!(reports[1].id, "r1");
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let registry = SessionRegistry::new(Duration::from_secs(60));

        registry.prepend_report("s1", test_report("r1", "u1")).await;

        assert_eq!(registry.reports("s1").await.len(), 1);
        assert!(registry.reports("s2").await.is_empty());
    }

    #[tokio::test]
    async fn test_reports_by_user_filters_owner() {
        let registry = SessionRegistry::new(Duration::from_secs(60));

        registry.prepend_report("s1", test_report("r1", "u1")).await;
        registry.prepend_report("s1", test_report("r2", "u2")).await;

        let mine = registry.reports_by_user("s1", "u1").await;
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, "r1");
    }

    #[tokio::test]
    async fn test_with_tally_seeds_once() {
        let registry = SessionRegistry::new(Duration::from_secs(60));
        let seed = VoteTally::seeded(3, 1);

        let first = registry
            .with_tally("s1", "r1", seed, |t| {
                t.toggle(VoteDirection::Up);
                *t
            })
            .await;
        assert_eq!(first.upvotes, 4);

        // A second toggle must reuse the session tally, not the seed.
        let second = registry
            .with_tally("s1", "r1", VoteTally::seeded(0, 0), |t| {
                t.toggle(VoteDirection::Up);
                *t
            })
            .await;
        assert_eq!(second.upvotes, 3);
        assert_eq!(second.held, None);
    }

    #[tokio::test]
    async fn test_purge_expired_drops_idle_sessions() {
        let registry = SessionRegistry::new(Duration::from_millis(10));

        registry.prepend_report("s1", test_report("r1", "u1")).await;
        assert_eq!(registry.len().await, 1);

        tokio::time::sleep(Duration::from_millis(30)).await;
        registry.purge_expired().await;

        assert!(registry.is_empty().await);
    }
}
