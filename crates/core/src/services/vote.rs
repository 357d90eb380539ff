//! Vote tally logic and the vote service.
//!
//! Votes are session state. A session holds at most one active vote per
//! report, toggled between up and down. Tallies start from the report's
//! persisted counters but the toggles themselves are never written
//! back; each toggle emits the [`VoteDelta`] a store-side vote sink
//! would consume if one is ever added.

use serde::{Deserialize, Serialize};

use crate::services::session::SessionRegistry;
use pulso_common::AppResult;
use pulso_db::repositories::ReportRepository;

/// Direction of a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteDirection {
    Up,
    Down,
}

/// Net effect of a single toggle on the two counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VoteDelta {
    pub up: i32,
    pub down: i32,
}

/// Up/down counters plus the direction this session currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteTally {
    pub upvotes: i32,
    pub downvotes: i32,
    /// The vote this session has active, if any.
    pub held: Option<VoteDirection>,
}

impl VoteTally {
    /// Start a tally from persisted counters, with no held vote.
    #[must_use]
    pub const fn seeded(upvotes: i32, downvotes: i32) -> Self {
        Self {
            upvotes,
            downvotes,
            held: None,
        }
    }

    /// Toggle a vote in the given direction.
    ///
    /// Voting the held direction retracts it. Voting the opposite
    /// direction moves the vote: the held counter is decremented before
    /// the requested one is incremented. Counters never go below zero.
    pub fn toggle(&mut self, direction: VoteDirection) -> VoteDelta {
        let mut delta = VoteDelta::default();

        if self.held == Some(direction) {
            self.decrement(direction, &mut delta);
            self.held = None;
            return delta;
        }

        if let Some(previous) = self.held {
            self.decrement(previous, &mut delta);
        }

        match direction {
            VoteDirection::Up => {
                self.upvotes += 1;
                delta.up += 1;
            }
            VoteDirection::Down => {
                self.downvotes += 1;
                delta.down += 1;
            }
        }
        self.held = Some(direction);

        delta
    }

    fn decrement(&mut self, direction: VoteDirection, delta: &mut VoteDelta) {
        match direction {
            VoteDirection::Up => {
                self.upvotes = (self.upvotes - 1).max(0);
                delta.up -= 1;
            }
            VoteDirection::Down => {
                self.downvotes = (self.downvotes - 1).max(0);
                delta.down -= 1;
            }
        }
    }
}

/// Outcome of one toggle: the updated tally and its net effect.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VoteOutcome {
    #[serde(flatten)]
    pub tally: VoteTally,
    pub delta: VoteDelta,
}

/// Vote service for business logic.
#[derive(Clone)]
pub struct VoteService {
    report_repo: ReportRepository,
    sessions: SessionRegistry,
}

impl VoteService {
    /// Create a new vote service.
    #[must_use]
    pub const fn new(report_repo: ReportRepository, sessions: SessionRegistry) -> Self {
        Self {
            report_repo,
            sessions,
        }
    }

    /// Toggle this session's vote on a report.
    ///
    /// The report may live in the session cache (just submitted) or in
    /// the store; an unknown ID is an error. The first toggle seeds the
    /// tally from the report's persisted counters.
    pub async fn toggle(
        &self,
        session_id: &str,
        report_id: &str,
        direction: VoteDirection,
    ) -> AppResult<VoteOutcome> {
        let report = match self.sessions.find_report(session_id, report_id).await {
            Some(report) => report,
            None => self.report_repo.get_by_id(report_id).await?,
        };

        let seed = VoteTally::seeded(report.upvotes, report.downvotes);
        let outcome = self
            .sessions
            .with_tally(session_id, report_id, seed, |tally| {
                let delta = tally.toggle(direction);
                VoteOutcome {
                    tally: *tally,
                    delta,
                }
            })
            .await;

        tracing::debug!(
            report_id = report_id,
            direction = ?direction,
            upvotes = outcome.tally.upvotes,
            downvotes = outcome.tally.downvotes,
            "Vote toggled"
        );

        Ok(outcome)
    }

    /// Every tally this session holds, keyed by report ID.
    pub async fn session_tallies(
        &self,
        session_id: &str,
    ) -> std::collections::HashMap<String, VoteTally> {
        self.sessions.tallies(session_id).await
    }
}
