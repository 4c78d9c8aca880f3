//! Generic state machine trait for lifecycle enums.
//!
//! Status enums that follow a fixed transition graph (most prominently the
//! invoice lifecycle) implement this trait to get validated transitions and
//! terminal-state detection with a single source of truth: the
//! `can_transition_to` table.

use super::ValidationError;

/// A type with a fixed set of allowed state transitions.
///
/// Implementors define `can_transition_to` and `valid_transitions`; the
/// trait supplies validated `transition_to` and `is_terminal` on top.
///
/// # Example
///
/// ```ignore
/// let status = InvoiceStatus::Pending;
/// let next = status.transition_to(InvoiceStatus::Fulfilled)?;
/// assert!(!next.is_terminal());
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if a transition from `self` to `target` is allowed.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all states reachable from `self` in one transition.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Attempts the transition, returning the new state or a validation
    /// error naming both endpoints.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Returns true if no further transitions are possible.
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal three-state lifecycle used to exercise the trait defaults.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum SettlementPhase {
        Open,
        Settling,
        Closed,
    }

    impl StateMachine for SettlementPhase {
        fn can_transition_to(&self, target: &Self) -> bool {
            matches!(
                (self, target),
                (SettlementPhase::Open, SettlementPhase::Settling)
                    | (SettlementPhase::Open, SettlementPhase::Closed)
                    | (SettlementPhase::Settling, SettlementPhase::Closed)
            )
        }

        fn valid_transitions(&self) -> Vec<Self> {
            match self {
                SettlementPhase::Open => {
                    vec![SettlementPhase::Settling, SettlementPhase::Closed]
                }
                SettlementPhase::Settling => vec![SettlementPhase::Closed],
                SettlementPhase::Closed => vec![],
            }
        }
    }

    #[test]
    fn transition_to_allowed_state_succeeds() {
        let phase = SettlementPhase::Open;
        let next = phase.transition_to(SettlementPhase::Settling);
        assert_eq!(next, Ok(SettlementPhase::Settling));
    }

    #[test]
    fn transition_to_disallowed_state_fails() {
        let phase = SettlementPhase::Closed;
        let result = phase.transition_to(SettlementPhase::Open);
        assert!(result.is_err());
        let message = result.unwrap_err().to_string();
        assert!(message.contains("Closed"));
        assert!(message.contains("Open"));
    }

    #[test]
    fn is_terminal_only_for_states_without_exits() {
        assert!(!SettlementPhase::Open.is_terminal());
        assert!(!SettlementPhase::Settling.is_terminal());
        assert!(SettlementPhase::Closed.is_terminal());
    }

    #[test]
    fn valid_transitions_are_consistent_with_can_transition_to() {
        let all = [
            SettlementPhase::Open,
            SettlementPhase::Settling,
            SettlementPhase::Closed,
        ];

        for from in &all {
            for to in &all {
                let listed = from.valid_transitions().contains(to);
                assert_eq!(
                    from.can_transition_to(to),
                    listed,
                    "inconsistent transition {:?} -> {:?}",
                    from,
                    to
                );
            }
        }
    }
}
