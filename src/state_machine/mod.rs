//! Execution schedule lifecycle state management.
//!
//! `scheduled → executing → {completed | failed}`, with `failed → scheduled`
//! as the retry re-entry transition. The transition table is pure; the
//! orchestration layer persists the results.

pub mod events;
pub mod schedule_state_machine;
pub mod states;

pub use events::ScheduleEvent;
pub use schedule_state_machine::{ScheduleStateMachine, StateMachineError, StateMachineResult};
pub use states::ScheduleStatus;
