//! User profile: identity, medical and emergency-contact data

use crate::{EmergencyError, Terminal, MIN_PHONE_DIGITS};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Substituted when the user leaves medical info blank
pub const MEDICAL_INFO_UNSPECIFIED: &str = "Not specified";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub full_name: String,
    /// Phone as typed (trimmed); validated on its digit projection
    pub phone: String,
    pub medical_info: String,
    /// Name and phone of the person to notify
    pub emergency_contact: String,
}

impl Profile {
    /// Text snapshot attached to every incident report
    pub fn snapshot(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Name: {}\nPhone: {}\nEmergency contact: {}\nMedical info: {}",
            self.full_name, self.phone, self.emergency_contact, self.medical_info
        )
    }
}

/// Phone is valid iff, after dropping whitespace and hyphens, it is all
/// digits and at least `MIN_PHONE_DIGITS` long
pub fn is_valid_phone(input: &str) -> bool {
    let projected: Vec<char> = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    projected.len() >= MIN_PHONE_DIGITS && projected.iter().all(|c| c.is_ascii_digit())
}

/// Guided profile collection; blocks until every field is valid
pub fn collect(term: &mut dyn Terminal) -> Result<Profile, EmergencyError> {
    term.println("\n=== USER REGISTRATION ===");

    let full_name = prompt_non_empty(term, "Enter your full name: ")?;

    let phone = loop {
        let input = term.prompt("Enter your phone number (at least 9 digits): ")?;
        if is_valid_phone(&input) {
            break input;
        }
        term.println("⚠️  Error: the phone number must contain at least 9 digits. Try again.");
    };

    let medical = term.prompt("Relevant medical information (allergies, etc.) [optional]: ")?;
    let medical_info = if medical.is_empty() {
        MEDICAL_INFO_UNSPECIFIED.to_string()
    } else {
        medical
    };

    let emergency_contact = prompt_non_empty(term, "Emergency contact name and phone: ")?;

    term.println("\n✅ Thank you! Your details have been registered.");
    term.println(&"=".repeat(42));

    tracing::info!("profile collected");

    Ok(Profile {
        full_name,
        phone,
        medical_info,
        emergency_contact,
    })
}

fn prompt_non_empty(term: &mut dyn Terminal, question: &str) -> Result<String, EmergencyError> {
    loop {
        let input = term.prompt(question)?;
        if !input.is_empty() {
            return Ok(input);
        }
        term.println("⚠️  Error: this field cannot be empty. Try again.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Console;
    use proptest::prelude::*;
    use std::io::Cursor;

    fn run_collect(script: &str) -> (Result<Profile, EmergencyError>, String) {
        let mut console = Console::new(Cursor::new(script.to_string()), Vec::new(), Vec::new());
        let result = collect(&mut console);
        let out = String::from_utf8_lossy(console.output()).to_string();
        (result, out)
    }

    #[test]
    fn test_collect_retries_until_valid() {
        let script = "\nAna Ruiz\n12345\n600 123-456\n\n\nLuis 600654321\n";
        let (result, out) = run_collect(script);
        let profile = result.unwrap();

        assert_eq!(profile.full_name, "Ana Ruiz");
        assert_eq!(profile.phone, "600 123-456");
        assert_eq!(profile.medical_info, MEDICAL_INFO_UNSPECIFIED);
        assert_eq!(profile.emergency_contact, "Luis 600654321");
        assert_eq!(out.matches("cannot be empty").count(), 2);
        assert_eq!(out.matches("at least 9 digits. Try again").count(), 1);
    }

    #[test]
    fn test_collect_keeps_medical_info() {
        let (result, _) = run_collect("Ana\n600123456\nAllergic to penicillin\nLuis\n");
        assert_eq!(result.unwrap().medical_info, "Allergic to penicillin");
    }

    #[test]
    fn test_collect_eof_is_fatal() {
        let (result, _) = run_collect("Ana\n123\n");
        assert!(matches!(result, Err(EmergencyError::InputExhausted)));
    }

    #[test]
    fn test_phone_examples() {
        assert!(is_valid_phone("600123456"));
        assert!(!is_valid_phone("+34 600 123 456"));
        assert!(is_valid_phone("34 600-123-456"));
        assert!(!is_valid_phone("60012345"));
        assert!(!is_valid_phone("600abc456789"));
        assert!(!is_valid_phone(""));
    }

    #[test]
    fn test_snapshot_layout() {
        let profile = Profile {
            full_name: "Ana Ruiz".into(),
            phone: "600123456".into(),
            medical_info: "A+".into(),
            emergency_contact: "Luis 600654321".into(),
        };
        assert_eq!(
            profile.snapshot(),
            "Name: Ana Ruiz\nPhone: 600123456\nEmergency contact: Luis 600654321\nMedical info: A+"
        );
    }

    proptest! {
        #[test]
        fn prop_digit_strings_accepted_iff_long_enough(digits in "[0-9]{0,15}") {
            prop_assert_eq!(is_valid_phone(&digits), digits.len() >= MIN_PHONE_DIGITS);
        }

        #[test]
        fn prop_separators_are_ignored(digits in "[0-9]{1,15}", sep in "[ -]{0,3}") {
            let spaced: String = digits
                .chars()
                .map(|c| format!("{}{}", c, sep))
                .collect();
            prop_assert_eq!(is_valid_phone(&spaced), digits.len() >= MIN_PHONE_DIGITS);
        }
    }
}
