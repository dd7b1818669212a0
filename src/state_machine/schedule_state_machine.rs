use thiserror::Error;

use super::events::ScheduleEvent;
use super::states::ScheduleStatus;

/// Errors raised by the transition table.
#[derive(Debug, Clone, Error)]
pub enum StateMachineError {
    #[error("Invalid transition from {from} on {event}")]
    InvalidTransition { from: ScheduleStatus, event: String },
}

pub type StateMachineResult<T> = Result<T, StateMachineError>;

/// Pure transition table for the schedule lifecycle.
///
/// The orchestration layer applies the returned target state to the loaded
/// record and persists it as a single read-modify-write; the table itself
/// holds no state and does no I/O.
pub struct ScheduleStateMachine;

impl ScheduleStateMachine {
    /// Determine the target state for an event, or reject the transition.
    pub fn determine_target_state(
        current: ScheduleStatus,
        event: &ScheduleEvent,
    ) -> StateMachineResult<ScheduleStatus> {
        let target = match (current, event) {
            (ScheduleStatus::Scheduled, ScheduleEvent::Start) => ScheduleStatus::Executing,

            (ScheduleStatus::Executing, ScheduleEvent::Complete) => ScheduleStatus::Completed,

            (ScheduleStatus::Executing, ScheduleEvent::Fail(_)) => ScheduleStatus::Failed,
            (ScheduleStatus::Scheduled, ScheduleEvent::Fail(_)) => ScheduleStatus::Failed,

            // Retry policy re-arms a failed schedule for another attempt
            (ScheduleStatus::Failed, ScheduleEvent::Retry) => ScheduleStatus::Scheduled,

            (from, event) => {
                return Err(StateMachineError::InvalidTransition {
                    from,
                    event: event.name().to_string(),
                })
            }
        };

        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        assert_eq!(
            ScheduleStateMachine::determine_target_state(
                ScheduleStatus::Scheduled,
                &ScheduleEvent::Start
            )
            .unwrap(),
            ScheduleStatus::Executing
        );
        assert_eq!(
            ScheduleStateMachine::determine_target_state(
                ScheduleStatus::Executing,
                &ScheduleEvent::Complete
            )
            .unwrap(),
            ScheduleStatus::Completed
        );
    }

    #[test]
    fn test_failure_and_retry_transitions() {
        assert_eq!(
            ScheduleStateMachine::determine_target_state(
                ScheduleStatus::Executing,
                &ScheduleEvent::Fail("deployment failed".to_string())
            )
            .unwrap(),
            ScheduleStatus::Failed
        );
        assert_eq!(
            ScheduleStateMachine::determine_target_state(
                ScheduleStatus::Failed,
                &ScheduleEvent::Retry
            )
            .unwrap(),
            ScheduleStatus::Scheduled
        );
    }

    #[test]
    fn test_invalid_transitions_rejected() {
        // Cannot start from a terminal state
        assert!(ScheduleStateMachine::determine_target_state(
            ScheduleStatus::Completed,
            &ScheduleEvent::Start
        )
        .is_err());

        // Cannot complete without an in-flight execution
        assert!(ScheduleStateMachine::determine_target_state(
            ScheduleStatus::Scheduled,
            &ScheduleEvent::Complete
        )
        .is_err());

        // Completed schedules are never retried
        assert!(ScheduleStateMachine::determine_target_state(
            ScheduleStatus::Completed,
            &ScheduleEvent::Retry
        )
        .is_err());
    }
}
