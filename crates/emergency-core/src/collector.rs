//! Incident Collector
//!
//! Guided prompt sequence that turns user answers into an [`IncidentReport`].
//! The flow is an acyclic state machine; invalid answers loop on the current
//! state, and a negative answer at either gate cancels the whole collection.
//!
//! ```text
//! AskActive -> SelectType -> EnterLocation -> EnterSeverity -> Confirm -> Reported
//!     |                                                          |
//!     +-------------------------> Cancelled <--------------------+
//! ```

use crate::console::is_affirmative;
use crate::{EmergencyError, EmergencyKind, IncidentReport, Profile, Terminal};
use crate::{MAX_SEVERITY, MIN_SEVERITY};

/// Outcome of one detection round
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Detection {
    Reported(IncidentReport),
    Cancelled,
}

/// Collector states. Data gathered so far travels with the state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CollectorState {
    AskActive,
    SelectType,
    EnterLocation {
        kind: EmergencyKind,
    },
    EnterSeverity {
        kind: EmergencyKind,
        location: String,
    },
    Confirm {
        kind: EmergencyKind,
        location: String,
        severity: u8,
    },
    Reported(IncidentReport),
    Cancelled,
}

pub struct IncidentCollector {
    affirmative: String,
}

impl IncidentCollector {
    pub fn new(affirmative: impl Into<String>) -> Self {
        Self {
            affirmative: affirmative.into(),
        }
    }

    /// Run the state machine to a terminal state
    pub fn detect(
        &self,
        term: &mut dyn Terminal,
        profile: &Profile,
    ) -> Result<Detection, EmergencyError> {
        let mut state = CollectorState::AskActive;
        loop {
            state = match state {
                CollectorState::Reported(report) => return Ok(Detection::Reported(report)),
                CollectorState::Cancelled => {
                    term.println("Process cancelled by the user.");
                    return Ok(Detection::Cancelled);
                }
                other => {
                    let next = self.step(term, profile, other)?;
                    tracing::debug!(state = ?next, "collector transition");
                    next
                }
            };
        }
    }

    /// Advance one state. Each invalid answer re-prompts inside the step.
    pub fn step(
        &self,
        term: &mut dyn Terminal,
        profile: &Profile,
        state: CollectorState,
    ) -> Result<CollectorState, EmergencyError> {
        let next = match state {
            CollectorState::AskActive => {
                term.println("\n=== EMERGENCY DETECTION ===");
                let prompt = format!("Are you in an emergency? ({}/N): ", self.affirmative);
                if term.confirm(&prompt, &self.affirmative)? {
                    CollectorState::SelectType
                } else {
                    CollectorState::Cancelled
                }
            }
            CollectorState::SelectType => CollectorState::EnterLocation {
                kind: self.select_type(term)?,
            },
            CollectorState::EnterLocation { kind } => CollectorState::EnterSeverity {
                kind,
                location: self.enter_location(term)?,
            },
            CollectorState::EnterSeverity { kind, location } => CollectorState::Confirm {
                kind,
                location,
                severity: self.enter_severity(term)?,
            },
            CollectorState::Confirm {
                kind,
                location,
                severity,
            } => {
                term.println("\n=== EMERGENCY SUMMARY ===");
                term.println(&format!("Type: {}", kind));
                term.println(&format!("Location: {}", location));
                term.println(&format!("Severity: {}/{}", severity, MAX_SEVERITY));

                let prompt = format!(
                    "\nConfirm and send the emergency alert? ({}/N): ",
                    self.affirmative
                );
                let answer = term.prompt(&prompt)?;
                if is_affirmative(&answer, &self.affirmative) {
                    CollectorState::Reported(IncidentReport::new(
                        kind,
                        location,
                        severity,
                        profile.snapshot(),
                    ))
                } else {
                    CollectorState::Cancelled
                }
            }
            terminal @ (CollectorState::Reported(_) | CollectorState::Cancelled) => terminal,
        };
        Ok(next)
    }

    fn select_type(&self, term: &mut dyn Terminal) -> Result<EmergencyKind, EmergencyError> {
        loop {
            term.println("\nAvailable emergency types:");
            for kind in EmergencyKind::ALL {
                term.println(&format!("{}. {}", kind.menu_number(), kind));
            }
            let answer = term.prompt("Select the emergency type (1-5): ")?;
            match EmergencyKind::from_menu_choice(&answer) {
                Some(kind) => return Ok(kind),
                None => term.println("⚠️  Invalid option. Please enter a number between 1 and 5."),
            }
        }
    }

    fn enter_location(&self, term: &mut dyn Terminal) -> Result<String, EmergencyError> {
        loop {
            let location = term.prompt("\nCurrent location of the emergency (required): ")?;
            if !location.is_empty() {
                return Ok(location);
            }
            term.println("⚠️  Error: the location cannot be empty. Try again.");
        }
    }

    fn enter_severity(&self, term: &mut dyn Terminal) -> Result<u8, EmergencyError> {
        loop {
            let prompt = format!("\nSeverity level ({}-{}): ", MIN_SEVERITY, MAX_SEVERITY);
            let answer = term.prompt(&prompt)?;
            match parse_severity(&answer) {
                Ok(severity) => return Ok(severity),
                Err(SeverityError::NotANumber) => {
                    term.println("⚠️  Please enter a valid number.");
                }
                Err(SeverityError::OutOfRange) => {
                    term.println(&format!(
                        "⚠️  Please enter a value between {} and {}.",
                        MIN_SEVERITY, MAX_SEVERITY
                    ));
                }
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum SeverityError {
    NotANumber,
    OutOfRange,
}

/// Parse a severity answer; only integers in `MIN_SEVERITY..=MAX_SEVERITY` pass
pub fn parse_severity(input: &str) -> Result<u8, SeverityError> {
    let value: i64 = input.trim().parse().map_err(|_| SeverityError::NotANumber)?;
    if (MIN_SEVERITY as i64..=MAX_SEVERITY as i64).contains(&value) {
        Ok(value as u8)
    } else {
        Err(SeverityError::OutOfRange)
    }
}
