use serde::{Deserialize, Serialize};
use thiserror::Error;

use imperialism_protocol::{
    NationId, PlannedAction, RoadSegment, TilePosition, WorkforceAction, WorkforceId,
    WorkforceSnapshot, WorkforceType,
};

use crate::scenario::ServerScenario;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkforceError {
    #[error("{kind} cannot perform {action}")]
    ActionNotAllowed {
        kind: WorkforceType,
        action: WorkforceAction,
    },
}

/// A unit belonging to a nation that performs a location-bound action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workforce {
    id: WorkforceId,
    nation: NationId,
    kind: WorkforceType,
    position: TilePosition,
    #[serde(default)]
    action: WorkforceAction,
    #[serde(default)]
    planned: Option<PlannedAction>,
}

impl Workforce {
    /// A standing workforce. Nothing is validated here; placement rules live
    /// in [`crate::WorkforceFactory`].
    pub fn new(
        id: WorkforceId,
        row: i32,
        column: i32,
        nation: NationId,
        kind: WorkforceType,
    ) -> Self {
        Self {
            id,
            nation,
            kind,
            position: TilePosition::new(row, column),
            action: WorkforceAction::Stand,
            planned: None,
        }
    }

    pub fn get_id(&self) -> WorkforceId {
        self.id
    }

    pub fn get_nation(&self) -> NationId {
        self.nation
    }

    pub fn get_type(&self) -> WorkforceType {
        self.kind
    }

    pub fn get_current_position(&self) -> TilePosition {
        self.position
    }

    pub fn get_action(&self) -> WorkforceAction {
        self.action
    }

    pub fn get_planned(&self) -> Option<PlannedAction> {
        self.planned
    }

    /// The order resolution will execute: the planned action, or standing in place.
    pub fn order(&self) -> PlannedAction {
        self.planned.unwrap_or(PlannedAction {
            target: self.position,
            action: WorkforceAction::Stand,
        })
    }

    /// Records what this workforce should do next turn.
    pub fn plan_action(
        &mut self,
        row: i32,
        column: i32,
        action: WorkforceAction,
    ) -> Result<(), WorkforceError> {
        self.ensure_allowed(action)?;
        self.planned = Some(PlannedAction {
            target: TilePosition::new(row, column),
            action,
        });
        Ok(())
    }

    /// Marks a workforce placed by the scenario editor. It has no order.
    pub fn placed_by_editor(mut self) -> Self {
        self.action = WorkforceAction::Editor;
        self.planned = None;
        self
    }

    pub fn clear_plan(&mut self) {
        self.planned = None;
    }

    /// True when the current action and any planned action suit the type.
    pub fn is_consistent(&self) -> bool {
        self.kind.can_perform(self.action)
            && self
                .planned
                .map_or(true, |p| self.kind.can_perform(p.action))
    }

    /// Moves the workforce after a successful order and clears its plan.
    pub(crate) fn complete_order(&mut self, order: PlannedAction) {
        self.position = order.target;
        self.action = order.action;
        self.planned = None;
    }

    fn ensure_allowed(&self, action: WorkforceAction) -> Result<(), WorkforceError> {
        if self.kind.can_perform(action) {
            Ok(())
        } else {
            Err(WorkforceError::ActionNotAllowed {
                kind: self.kind,
                action,
            })
        }
    }

    /// Picks the action a right-click on `target` most plausibly means.
    pub fn default_action_at(
        &self,
        scenario: &ServerScenario,
        target: TilePosition,
    ) -> WorkforceAction {
        if target == self.position {
            return WorkforceAction::Stand;
        }
        match self.kind {
            WorkforceType::Engineer
                if self.position.is_adjacent(target)
                    && !scenario.has_road(RoadSegment::new(self.position, target)) =>
            {
                WorkforceAction::BuildRoad
            }
            WorkforceType::Geologist | WorkforceType::Prospector
                if scenario
                    .map()
                    .get(target)
                    .is_some_and(|tile| !tile.prospected) =>
            {
                WorkforceAction::Prospect
            }
            kind => match kind.structure() {
                Some(structure_kind)
                    if scenario.can_build_structure(self.nation, structure_kind, target)
                        || scenario.structure_at(target).is_some_and(|s| {
                            s.get_type() == structure_kind && s.get_nation() == self.nation
                        }) =>
                {
                    WorkforceAction::Build
                }
                _ => WorkforceAction::Move,
            },
        }
    }

    pub fn snapshot(&self) -> WorkforceSnapshot {
        WorkforceSnapshot {
            id: self.id,
            nation: self.nation,
            kind: self.kind,
            position: self.position,
            action: self.action,
            planned: self.planned,
        }
    }

    pub fn from_snapshot(snapshot: &WorkforceSnapshot) -> Self {
        Self {
            id: snapshot.id,
            nation: snapshot.nation,
            kind: snapshot.kind,
            position: snapshot.position,
            action: snapshot.action,
            planned: snapshot.planned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engineer() -> Workforce {
        Workforce::new(
            WorkforceId::from_u128(1),
            4,
            13,
            NationId(1),
            WorkforceType::Engineer,
        )
    }

    #[test]
    fn new_workforce_stands_without_a_plan() {
        let w = engineer();
        assert_eq!(w.get_action(), WorkforceAction::Stand);
        assert_eq!(w.get_current_position(), TilePosition::new(4, 13));
        assert_eq!(w.get_planned(), None);
        assert_eq!(
            w.order(),
            PlannedAction {
                target: TilePosition::new(4, 13),
                action: WorkforceAction::Stand
            }
        );
    }

    #[test]
    fn plan_action_rejects_actions_outside_the_type() {
        let mut w = engineer();
        let err = w.plan_action(4, 14, WorkforceAction::Prospect).unwrap_err();
        assert_eq!(
            err,
            WorkforceError::ActionNotAllowed {
                kind: WorkforceType::Engineer,
                action: WorkforceAction::Prospect
            }
        );
        assert_eq!(w.get_planned(), None);

        w.plan_action(4, 14, WorkforceAction::BuildRoad).unwrap();
        assert_eq!(w.get_planned().unwrap().target, TilePosition::new(4, 14));
    }

    #[test]
    fn completing_an_order_moves_and_clears_the_plan() {
        let mut w = engineer();
        w.plan_action(5, 13, WorkforceAction::Move).unwrap();
        let order = w.order();
        w.complete_order(order);
        assert_eq!(w.get_current_position(), TilePosition::new(5, 13));
        assert_eq!(w.get_action(), WorkforceAction::Move);
        assert!(w.get_planned().is_none());
    }

    #[test]
    fn editor_placement_sets_the_editor_action() {
        let mut w = engineer();
        w.plan_action(4, 14, WorkforceAction::BuildRoad).unwrap();
        let placed = w.placed_by_editor();
        assert_eq!(placed.get_action(), WorkforceAction::Editor);
        assert!(placed.get_planned().is_none());
        assert!(placed.is_consistent());
        assert_eq!(placed.order().action, WorkforceAction::Stand);
    }

    #[test]
    fn snapshot_round_trips() {
        let mut w = engineer();
        w.plan_action(4, 12, WorkforceAction::Move).unwrap();
        assert_eq!(Workforce::from_snapshot(&w.snapshot()), w);
    }
}
