//! Requirement model
//!
//! In-memory representation of the conditions that make up an achievement
//! or leaderboard slot. A [`Trigger`] holds a core [`RequirementGroup`]
//! and zero or more alternate groups that are OR-ed against it.

mod group;
mod operand;
mod requirement;

pub use group::{RequirementGroup, Trigger};
pub use operand::{FieldModifier, FieldSize, Operand};
pub use requirement::{Operator, Requirement, RequirementFlag};
