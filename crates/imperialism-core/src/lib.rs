//! Scenario model and turn resolution for the Imperialism remake.
//!
//! A [`ServerScenario`] holds the world; nations queue orders in a
//! [`TurnPlanned`]; the [`TurnManager`] resolves them into a [`TurnResult`]
//! and publishes the next state.
//!
//! [`TurnResult`]: imperialism_protocol::TurnResult

mod factory;
mod map;
mod nation;
mod persistence;
mod rules;
mod scenario;
mod structure;
mod turn;
mod turn_planned;
mod workforce;

pub use crate::factory::*;
pub use crate::map::*;
pub use crate::nation::*;
pub use crate::persistence::*;
pub use crate::rules::*;
pub use crate::scenario::*;
pub use crate::structure::*;
pub use crate::turn::*;
pub use crate::turn_planned::*;
pub use crate::workforce::*;
