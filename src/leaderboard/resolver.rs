//! Agent resolution for performance records.
//!
//! A record's `agentId` is normally an agent document id, but older rows
//! stored the agent's display name instead. Resolution tries the id first,
//! then a name scan, and finally falls back to a synthetic agent so the
//! record is never dropped.

use std::collections::HashMap;

use crate::models::Agent;

/// Outcome of resolving one `agentId`.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentResolution<'a> {
    /// An agent document has this id.
    ExactMatch(&'a Agent),
    /// No id matched, but an agent's `name` equals the value.
    LegacyNameMatch(&'a Agent),
    /// Nothing matched; carries a synthetic agent keyed by the raw value.
    Unresolved(Agent),
}

impl AgentResolution<'_> {
    /// Metadata to aggregate the record under.
    pub fn meta(&self) -> &Agent {
        match self {
            AgentResolution::ExactMatch(agent) | AgentResolution::LegacyNameMatch(agent) => *agent,
            AgentResolution::Unresolved(agent) => agent,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, AgentResolution::Unresolved(_))
    }
}

/// Agents indexed by id, keeping store order for the legacy name scan.
#[derive(Debug, Default)]
pub struct AgentDirectory {
    agents: Vec<Agent>,
    by_id: HashMap<String, usize>,
}

impl AgentDirectory {
    /// Later documents with a duplicate id replace earlier ones.
    pub fn new(agents: Vec<Agent>) -> Self {
        let by_id = agents
            .iter()
            .enumerate()
            .map(|(idx, a)| (a.id.clone(), idx))
            .collect();
        Self { agents, by_id }
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Agent> {
        self.by_id.get(id).map(|&idx| &self.agents[idx])
    }

    /// Resolve a record's `agentId`: exact id, then legacy name, then synthetic.
    pub fn resolve(&self, agent_id: &str) -> AgentResolution<'_> {
        if let Some(agent) = self.get(agent_id) {
            return AgentResolution::ExactMatch(agent);
        }

        // First match in store order wins; shadowed duplicates are skipped.
        if let Some(agent) = self
            .agents
            .iter()
            .enumerate()
            .filter(|(idx, a)| self.by_id.get(&a.id) == Some(idx))
            .map(|(_, a)| a)
            .find(|a| a.name.as_deref() == Some(agent_id))
        {
            return AgentResolution::LegacyNameMatch(agent);
        }

        AgentResolution::Unresolved(Agent::synthetic(agent_id))
    }
}
