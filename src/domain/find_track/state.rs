//! Find-track conversation state and status.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Whether a conversation is inside the guided find-track flow.
///
/// `InProgress` corresponds to a stored [`FindTrackState`]; `NotStarted` to
/// its absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindTrackStatus {
    NotStarted,
    InProgress,
}

impl StateMachine for FindTrackStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use FindTrackStatus::*;
        matches!(
            (self, target),
            // A repeated /findTrack restarts the flow with a fresh history
            (NotStarted, InProgress) | (InProgress, InProgress) | (InProgress, NotStarted)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use FindTrackStatus::*;
        match self {
            NotStarted => vec![InProgress],
            InProgress => vec![InProgress, NotStarted],
        }
    }
}

/// Transcript of a guided find-track conversation.
///
/// Lines are `"User: ..."` and `"Assistant: ..."` in the order they happened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindTrackState {
    history: Vec<String>,
}

impl FindTrackState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn push_user(&mut self, text: &str) {
        self.history.push(format!("User: {}", text));
    }

    pub fn push_assistant(&mut self, text: &str) {
        self.history.push(format!("Assistant: {}", text));
    }

    /// History joined by newlines, as embedded in the turn prompt.
    pub fn transcript(&self) -> String {
        self.history.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_started_can_only_start() {
        assert_eq!(
            FindTrackStatus::NotStarted.valid_transitions(),
            vec![FindTrackStatus::InProgress]
        );
        assert!(FindTrackStatus::NotStarted
            .transition_to(FindTrackStatus::NotStarted)
            .is_err());
    }

    #[test]
    fn in_progress_can_finish_or_restart() {
        assert_eq!(
            FindTrackStatus::InProgress.transition_to(FindTrackStatus::NotStarted),
            Ok(FindTrackStatus::NotStarted)
        );
        assert!(FindTrackStatus::InProgress.can_transition_to(&FindTrackStatus::InProgress));
        assert!(!FindTrackStatus::InProgress.is_terminal());
    }

    #[test]
    fn history_lines_are_prefixed_by_speaker() {
        let mut state = FindTrackState::new();
        state.push_assistant("Which decade?");
        state.push_user("the 80s");

        assert_eq!(state.history(), ["Assistant: Which decade?", "User: the 80s"]);
        assert_eq!(state.transcript(), "Assistant: Which decade?\nUser: the 80s");
    }
}
