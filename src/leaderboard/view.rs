//! Per-view grouping and display rules.

use std::collections::HashMap;

use crate::models::{non_empty, Agent, ReferenceEntity, View};

pub const UNKNOWN_DEPOT: &str = "unknown-depot";
pub const UNKNOWN_COMPANY: &str = "unknown-company";

/// Depot, company and platoon documents keyed by id.
#[derive(Debug, Default)]
pub struct ReferenceLookups {
    depots: HashMap<String, ReferenceEntity>,
    companies: HashMap<String, ReferenceEntity>,
    platoons: HashMap<String, ReferenceEntity>,
}

impl ReferenceLookups {
    pub fn new(
        depots: Vec<ReferenceEntity>,
        companies: Vec<ReferenceEntity>,
        platoons: Vec<ReferenceEntity>,
    ) -> Self {
        let index = |entities: Vec<ReferenceEntity>| {
            entities
                .into_iter()
                .map(|e| (e.id.clone(), e))
                .collect::<HashMap<_, _>>()
        };

        Self {
            depots: index(depots),
            companies: index(companies),
            platoons: index(platoons),
        }
    }

    pub fn depot(&self, id: &str) -> Option<&ReferenceEntity> {
        self.depots.get(id)
    }

    pub fn company(&self, id: &str) -> Option<&ReferenceEntity> {
        self.companies.get(id)
    }

    pub fn platoon(&self, id: &str) -> Option<&ReferenceEntity> {
        self.platoons.get(id)
    }
}

/// Display fields fixed when a group is first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupDisplay {
    pub name: String,
    pub avatar_url: String,
    pub platoon: String,
}

/// How records are grouped and labelled, chosen once per aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingStrategy {
    Leaders,
    Depots,
    Companies,
    /// Unrecognized view: group by agent id, label with the key.
    AgentFallback,
}

impl GroupingStrategy {
    pub fn for_view(view: &View) -> Self {
        match view {
            View::Leaders => GroupingStrategy::Leaders,
            View::Depots => GroupingStrategy::Depots,
            View::Companies => GroupingStrategy::Companies,
            View::Other(_) => GroupingStrategy::AgentFallback,
        }
    }

    pub fn group_key(&self, meta: &Agent) -> String {
        match self {
            GroupingStrategy::Leaders | GroupingStrategy::AgentFallback => meta.id.clone(),
            GroupingStrategy::Depots => meta.depot_key().unwrap_or(UNKNOWN_DEPOT).to_string(),
            GroupingStrategy::Companies => {
                meta.company_key().unwrap_or(UNKNOWN_COMPANY).to_string()
            }
        }
    }

    pub fn display(&self, key: &str, meta: &Agent, refs: &ReferenceLookups) -> GroupDisplay {
        match self {
            GroupingStrategy::Leaders => {
                let platoon = meta
                    .platoon_id
                    .as_deref()
                    .and_then(|id| refs.platoon(id))
                    .and_then(|p| non_empty(p.name.as_deref()))
                    .or_else(|| non_empty(meta.platoon.as_deref()))
                    .unwrap_or_default();

                GroupDisplay {
                    name: meta.display_name().to_string(),
                    avatar_url: non_empty(meta.photo_url.as_deref())
                        .unwrap_or_default()
                        .to_string(),
                    platoon: platoon.to_string(),
                }
            }
            GroupingStrategy::Depots => reference_display(key, refs.depot(key)),
            GroupingStrategy::Companies => reference_display(key, refs.company(key)),
            GroupingStrategy::AgentFallback => GroupDisplay {
                name: key.to_string(),
                ..GroupDisplay::default()
            },
        }
    }
}

/// Name and avatar from a reference document, falling back to the raw key.
fn reference_display(key: &str, entity: Option<&ReferenceEntity>) -> GroupDisplay {
    let name = entity
        .and_then(|e| non_empty(e.name.as_deref()))
        .unwrap_or(key);
    let avatar_url = entity
        .and_then(|e| non_empty(e.photo_url.as_deref()))
        .unwrap_or_default();

    GroupDisplay {
        name: name.to_string(),
        avatar_url: avatar_url.to_string(),
        platoon: String::new(),
    }
}
