use serde::{Deserialize, Serialize};

/// Step of the subject/predicate/object wizard.
///
/// The numeric codes are what gets persisted in the `status` column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardPhase {
    #[default]
    AwaitingSubject,
    AwaitingPredicate,
    AwaitingObject,
    Ready,
}

impl WizardPhase {
    pub fn code(self) -> i64 {
        match self {
            WizardPhase::AwaitingSubject => 0,
            WizardPhase::AwaitingPredicate => 1,
            WizardPhase::AwaitingObject => 2,
            WizardPhase::Ready => 3,
        }
    }

    /// The phase after this one, `None` once ready.
    pub fn next(self) -> Option<Self> {
        match self {
            WizardPhase::AwaitingSubject => Some(WizardPhase::AwaitingPredicate),
            WizardPhase::AwaitingPredicate => Some(WizardPhase::AwaitingObject),
            WizardPhase::AwaitingObject => Some(WizardPhase::Ready),
            WizardPhase::Ready => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown wizard phase code {0}")]
pub struct UnknownPhase(pub i64);

impl TryFrom<i64> for WizardPhase {
    type Error = UnknownPhase;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(WizardPhase::AwaitingSubject),
            1 => Ok(WizardPhase::AwaitingPredicate),
            2 => Ok(WizardPhase::AwaitingObject),
            3 => Ok(WizardPhase::Ready),
            other => Err(UnknownPhase(other)),
        }
    }
}

/// Text collected so far by one user's wizard.
///
/// Fields ahead of `phase` are always empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardState {
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub phase: WizardPhase,
}

impl WizardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.phase == WizardPhase::Ready
    }

    /// Store `text` in the slot the current phase expects and advance.
    /// Returns false (and changes nothing) once the wizard is ready.
    pub fn submit(&mut self, text: &str) -> bool {
        let Some(next) = self.phase.next() else {
            return false;
        };
        let text = text.trim().to_lowercase();
        match self.phase {
            WizardPhase::AwaitingSubject => self.subject = text,
            WizardPhase::AwaitingPredicate => self.predicate = text,
            WizardPhase::AwaitingObject => self.object = text,
            WizardPhase::Ready => unreachable!("ready has no next phase"),
        }
        self.phase = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_codes_round_trip() {
        for phase in [
            WizardPhase::AwaitingSubject,
            WizardPhase::AwaitingPredicate,
            WizardPhase::AwaitingObject,
            WizardPhase::Ready,
        ] {
            assert_eq!(WizardPhase::try_from(phase.code()), Ok(phase));
        }
        assert_eq!(WizardPhase::try_from(7), Err(UnknownPhase(7)));
        assert_eq!(WizardPhase::try_from(-1), Err(UnknownPhase(-1)));
    }

    #[test]
    fn test_submit_walks_all_phases() {
        let mut state = WizardState::new();
        assert!(state.submit("Douglas Adams"));
        assert_eq!(state.phase, WizardPhase::AwaitingPredicate);
        assert_eq!(state.subject, "douglas adams");
        assert!(state.predicate.is_empty());

        assert!(state.submit("Occupation"));
        assert_eq!(state.phase, WizardPhase::AwaitingObject);
        assert!(state.object.is_empty());

        assert!(state.submit("WRITER"));
        assert!(state.is_ready());
        assert_eq!(state.object, "writer");
    }

    #[test]
    fn test_submit_when_ready_is_noop() {
        let mut state = WizardState::new();
        state.submit("a");
        state.submit("b");
        state.submit("c");
        let before = state.clone();
        assert!(!state.submit("d"));
        assert_eq!(state, before);
    }
}
