//! Serializable vocabulary shared between the turn engine and whatever
//! presents it: identifiers, tile positions, closed workforce/structure
//! enumerations, snapshots, turn results, intents and events.

mod event;
mod ids;
mod intent;
mod position;
mod snapshot;
mod turn;
mod types;
pub mod wire;

pub use crate::event::*;
pub use crate::ids::*;
pub use crate::intent::*;
pub use crate::position::*;
pub use crate::snapshot::*;
pub use crate::turn::*;
pub use crate::types::*;
