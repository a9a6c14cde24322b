use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use imperialism_protocol::{NationId, TilePosition, WorkforceAction, WorkforceId};

use crate::workforce::{Workforce, WorkforceError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("workforce of {workforce_nation} cannot be planned by {nation}")]
    WrongNation {
        nation: NationId,
        workforce_nation: NationId,
    },
    #[error("workforce {0} has no pending order")]
    NotPlanned(WorkforceId),
    #[error(transparent)]
    Workforce(#[from] WorkforceError),
}

/// Orders one nation has queued for the coming resolution, keyed by workforce.
///
/// Each entry is a snapshot of the workforce carrying its planned action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnPlanned {
    nation: NationId,
    workforces: BTreeMap<WorkforceId, Workforce>,
}

impl TurnPlanned {
    pub fn new(nation: NationId) -> Self {
        Self {
            nation,
            workforces: BTreeMap::new(),
        }
    }

    pub fn get_nation(&self) -> NationId {
        self.nation
    }

    /// Queues (or replaces) the order carried by `workforce`.
    pub fn add_workforce(&mut self, workforce: Workforce) -> Result<(), PlanError> {
        if workforce.get_nation() != self.nation {
            return Err(PlanError::WrongNation {
                nation: self.nation,
                workforce_nation: workforce.get_nation(),
            });
        }
        self.workforces.insert(workforce.get_id(), workforce);
        Ok(())
    }

    /// Plans `action` at `target` for `workforce` and queues it.
    pub fn plan_action(
        &mut self,
        workforce: &Workforce,
        target: TilePosition,
        action: WorkforceAction,
    ) -> Result<(), PlanError> {
        let mut planned = self
            .workforces
            .get(&workforce.get_id())
            .cloned()
            .unwrap_or_else(|| workforce.clone());
        planned.plan_action(target.row, target.column, action)?;
        self.add_workforce(planned)
    }

    /// Withdraws a pending order.
    pub fn remove_workforce(&mut self, id: WorkforceId) -> Result<Workforce, PlanError> {
        self.workforces
            .remove(&id)
            .ok_or(PlanError::NotPlanned(id))
    }

    pub fn get_workforces(&self) -> &BTreeMap<WorkforceId, Workforce> {
        &self.workforces
    }

    pub fn get(&self, id: WorkforceId) -> Option<&Workforce> {
        self.workforces.get(&id)
    }

    pub fn contains(&self, id: WorkforceId) -> bool {
        self.workforces.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.workforces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workforces.is_empty()
    }

    /// Another queued workforce standing on or heading for `position`.
    pub fn claims(&self, position: TilePosition, except: WorkforceId) -> Option<WorkforceId> {
        self.workforces
            .values()
            .filter(|w| w.get_id() != except)
            .find(|w| w.get_current_position() == position || w.order().target == position)
            .map(|w| w.get_id())
    }
}
