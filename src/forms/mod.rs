//! Smart-form field conditions.
//!
//! ```text
//! set_value(field) → rules watching field → ConditionNode::evaluate
//!     → Show/Hide/Enable/Disable update FieldState
//!     → SetValue writes under the EvalContext guard (no cascade)
//! ```

pub mod condition;
pub mod engine;

pub use condition::{
    strict_eq, Condition, ConditionGroup, ConditionNode, FormValues, LegacyCondition, Logic,
    Operator, Predicate,
};
pub use engine::{Action, EvalContext, FieldConditionEngine, FieldRule, FieldState};
