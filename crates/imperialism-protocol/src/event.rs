use serde::{Deserialize, Serialize};

use crate::{NationId, RejectionReason, TurnResult, WorkforceId};

/// Engine→presentation notifications. Fully serializable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TurnEvent {
    TurnCompleted {
        result: TurnResult,
    },
    /// An order was skipped; the workforce kept its previous state.
    OrderRejected {
        turn: u32,
        nation: NationId,
        workforce: WorkforceId,
        reason: RejectionReason,
    },
}
