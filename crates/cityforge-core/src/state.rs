//! Project status transition graph.
//!
//! Validates the monotonic lifecycle:
//!
//! ```text
//! pending     -> in_progress
//! in_progress -> in_progress  (step relabel)
//! in_progress -> completed
//! in_progress -> failed
//! ```
//!
//! `completed` and `failed` are terminal: no outgoing edges, so no reader
//! can ever observe a terminal status followed by a non-terminal one.

use cityforge_db::models::ProjectStatus;

/// The project state machine.
pub struct ProjectStateMachine;

impl ProjectStateMachine {
    /// Check whether a transition from `from` to `to` is a valid edge.
    pub fn is_valid_transition(from: ProjectStatus, to: ProjectStatus) -> bool {
        matches!(
            (from, to),
            (ProjectStatus::Pending, ProjectStatus::InProgress)
                | (ProjectStatus::InProgress, ProjectStatus::InProgress)
                | (ProjectStatus::InProgress, ProjectStatus::Completed)
                | (ProjectStatus::InProgress, ProjectStatus::Failed)
        )
    }

    /// Whether a status has no outgoing edges.
    pub fn is_terminal(status: ProjectStatus) -> bool {
        matches!(status, ProjectStatus::Completed | ProjectStatus::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ProjectStatus; 4] = [
        ProjectStatus::Pending,
        ProjectStatus::InProgress,
        ProjectStatus::Completed,
        ProjectStatus::Failed,
    ];

    #[test]
    fn happy_path_is_valid() {
        assert!(ProjectStateMachine::is_valid_transition(
            ProjectStatus::Pending,
            ProjectStatus::InProgress
        ));
        assert!(ProjectStateMachine::is_valid_transition(
            ProjectStatus::InProgress,
            ProjectStatus::Completed
        ));
        assert!(ProjectStateMachine::is_valid_transition(
            ProjectStatus::InProgress,
            ProjectStatus::Failed
        ));
    }

    #[test]
    fn step_relabel_is_valid() {
        assert!(ProjectStateMachine::is_valid_transition(
            ProjectStatus::InProgress,
            ProjectStatus::InProgress
        ));
    }

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        for from in [ProjectStatus::Completed, ProjectStatus::Failed] {
            for to in ALL {
                assert!(
                    !ProjectStateMachine::is_valid_transition(from, to),
                    "{from} -> {to} must be invalid"
                );
            }
        }
    }

    #[test]
    fn pending_cannot_jump_to_terminal() {
        assert!(!ProjectStateMachine::is_valid_transition(
            ProjectStatus::Pending,
            ProjectStatus::Completed
        ));
        assert!(!ProjectStateMachine::is_valid_transition(
            ProjectStatus::Pending,
            ProjectStatus::Failed
        ));
    }

    #[test]
    fn no_edge_reenters_pending() {
        for from in ALL {
            assert!(!ProjectStateMachine::is_valid_transition(
                from,
                ProjectStatus::Pending
            ));
        }
    }

    #[test]
    fn terminal_predicate() {
        assert!(ProjectStateMachine::is_terminal(ProjectStatus::Completed));
        assert!(ProjectStateMachine::is_terminal(ProjectStatus::Failed));
        assert!(!ProjectStateMachine::is_terminal(ProjectStatus::Pending));
        assert!(!ProjectStateMachine::is_terminal(ProjectStatus::InProgress));
    }
}
