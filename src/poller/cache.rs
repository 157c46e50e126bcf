//! Last-known agent cache and change detection.
//!
//! A poll result is compared against the cache before it replaces it:
//!
//! - an agent is *changed* if it is new or its `state` or `name` differs
//! - an agent missing from the new result is reported once, as `offline`,
//!   and then dropped from the cache
//!
//! Changes are listed in poll order first, then removals in the order the
//! previous poll reported them.

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::{FxHashMap, FxHashSet};

use crate::protocol::{Agent, AgentState};

// ============================================================================
// AgentCache
// ============================================================================

/// Agents from the last successful poll, keyed by ID.
#[derive(Debug, Default, Clone)]
pub struct AgentCache {
    /// IDs in first-seen order.
    order: Vec<String>,
    agents: FxHashMap<String, Agent>,
}

impl AgentCache {
    /// Creates an empty cache.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached agent with `id`.
    #[inline]
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Agent> {
        self.agents.get(id)
    }

    /// Returns the number of cached agents.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Returns `true` if nothing is cached.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Iterates cached agents in the order they were reported.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.order.iter().filter_map(|id| self.agents.get(id))
    }

    /// Lists the agents that differ between the cache and `fresh`.
    ///
    /// Removed agents are returned with their state set to
    /// [`AgentState::Offline`].
    #[must_use]
    pub fn diff(&self, fresh: &[Agent]) -> Vec<Agent> {
        let mut changes: Vec<Agent> = fresh
            .iter()
            .filter(|agent| match self.agents.get(&agent.id) {
                Some(cached) => cached.state != agent.state || cached.name != agent.name,
                None => true,
            })
            .cloned()
            .collect();

        let present: FxHashSet<&str> = fresh.iter().map(|agent| agent.id.as_str()).collect();
        changes.extend(
            self.iter()
                .filter(|cached| !present.contains(cached.id.as_str()))
                .map(|cached| cached.with_state(AgentState::Offline)),
        );

        changes
    }

    /// Replaces the cache contents with `fresh`.
    ///
    /// A repeated ID keeps its first position and its last value.
    pub fn replace(&mut self, fresh: &[Agent]) {
        self.order.clear();
        self.agents.clear();

        for agent in fresh {
            if self.agents.insert(agent.id.clone(), agent.clone()).is_none() {
                self.order.push(agent.id.clone());
            }
        }
    }

    /// Computes the changes against `fresh`, then stores `fresh`.
    pub fn update(&mut self, fresh: &[Agent]) -> Vec<Agent> {
        let changes = self.diff(fresh);
        self.replace(fresh);
        changes
    }
}

// ============================================================================
// Tests
// ============================================================================
