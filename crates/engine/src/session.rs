// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session and audit state.
//!
//! Persists the current focus, a search log with exact-match
//! deduplication, and a decision log with rationale. Entries older than
//! the TTL are pruned on every write. Semantic search matching belongs to
//! the external semantic cache; this layer only deduplicates exact
//! queries.

use chrono::{DateTime, Duration, Utc};
use relay_core::Clock;
use relay_storage::{read_json_shared, update_json, DocError, LockOptions};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Current session focus and active agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub current_focus: String,
    pub active_agents: Vec<String>,
    pub last_updated: DateTime<Utc>,
    pub context_summary: String,
}

/// One recorded search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub query: String,
    pub timestamp: DateTime<Utc>,
    pub agent: String,
    pub result_count: usize,
    pub files_found: Vec<String>,
}

/// One recorded decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub decision: String,
    pub rationale: String,
    pub alternatives: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state: Option<SessionState>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SearchDoc {
    #[serde(default)]
    searches: Vec<SearchRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DecisionDoc {
    #[serde(default)]
    decisions: Vec<DecisionRecord>,
}

/// Persists session, search, and decision state under the memory dir.
pub struct SessionStateManager {
    memory_dir: PathBuf,
    lock_options: LockOptions,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl SessionStateManager {
    pub fn new(
        memory_dir: impl Into<PathBuf>,
        ttl_days: i64,
        lock_options: LockOptions,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            memory_dir: memory_dir.into(),
            lock_options: lock_options.create_if_missing(),
            ttl: Duration::days(ttl_days),
            clock,
        }
    }

    fn session_file(&self) -> PathBuf {
        self.memory_dir.join("session-state.json")
    }

    fn search_file(&self) -> PathBuf {
        self.memory_dir.join("search-history.json")
    }

    fn decisions_file(&self) -> PathBuf {
        self.memory_dir.join("decisions.json")
    }

    /// Save the current session state.
    pub fn save_session(
        &self,
        focus: &str,
        active_agents: &[String],
        context_summary: &str,
    ) -> Result<(), DocError> {
        let state = SessionState {
            current_focus: focus.to_string(),
            active_agents: active_agents.to_vec(),
            last_updated: self.clock.now_utc(),
            context_summary: context_summary.to_string(),
        };
        update_json(
            &self.session_file(),
            &self.lock_options,
            |doc: &mut SessionDoc| {
                doc.state = Some(state);
            },
        )
    }

    /// Load the previous session state, if any.
    pub fn load_session(&self) -> Result<Option<SessionState>, DocError> {
        let doc: SessionDoc = read_json_shared(&self.session_file(), &self.lock_options)?;
        Ok(doc.state)
    }

    /// Record a search. A repeated identical query replaces the earlier
    /// record instead of appending a duplicate.
    pub fn record_search(
        &self,
        query: &str,
        files_found: &[String],
        agent: &str,
    ) -> Result<(), DocError> {
        let record = SearchRecord {
            query: query.to_string(),
            timestamp: self.clock.now_utc(),
            agent: agent.to_string(),
            result_count: files_found.len(),
            files_found: files_found.to_vec(),
        };
        let cutoff = self.clock.now_utc() - self.ttl;

        update_json(
            &self.search_file(),
            &self.lock_options,
            |doc: &mut SearchDoc| {
                doc.searches.retain(|s| s.timestamp >= cutoff);
                doc.searches.retain(|s| s.query != record.query);
                doc.searches.push(record);
            },
        )
    }

    /// Searches recorded within the trailing window.
    pub fn recent_searches(&self, hours: i64) -> Result<Vec<SearchRecord>, DocError> {
        let cutoff = self.clock.now_utc() - Duration::hours(hours);
        let doc: SearchDoc = read_json_shared(&self.search_file(), &self.lock_options)?;
        Ok(doc
            .searches
            .into_iter()
            .filter(|s| s.timestamp >= cutoff)
            .collect())
    }

    /// Exact-match lookup of a previous search.
    pub fn find_search(&self, query: &str) -> Result<Option<SearchRecord>, DocError> {
        let doc: SearchDoc = read_json_shared(&self.search_file(), &self.lock_options)?;
        Ok(doc.searches.into_iter().find(|s| s.query == query))
    }

    /// Record a decision with its rationale and rejected alternatives.
    pub fn record_decision(
        &self,
        decision: &str,
        rationale: &str,
        alternatives: &[String],
    ) -> Result<(), DocError> {
        let record = DecisionRecord {
            decision: decision.to_string(),
            rationale: rationale.to_string(),
            alternatives: alternatives.to_vec(),
            timestamp: self.clock.now_utc(),
        };
        let cutoff = self.clock.now_utc() - self.ttl;

        update_json(
            &self.decisions_file(),
            &self.lock_options,
            |doc: &mut DecisionDoc| {
                doc.decisions.retain(|d| d.timestamp >= cutoff);
                doc.decisions.push(record);
            },
        )
    }

    /// Decisions recorded within the trailing window.
    pub fn recent_decisions(&self, hours: i64) -> Result<Vec<DecisionRecord>, DocError> {
        let cutoff = self.clock.now_utc() - Duration::hours(hours);
        let doc: DecisionDoc = read_json_shared(&self.decisions_file(), &self.lock_options)?;
        Ok(doc
            .decisions
            .into_iter()
            .filter(|d| d.timestamp >= cutoff)
            .collect())
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
