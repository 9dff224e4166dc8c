//! Incident reports and the fixed set of emergency kinds

use crate::{DISPLAY_TIME_FORMAT, MAX_SEVERITY};
use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Emergency kinds
// =============================================================================

/// Closed set of emergency categories offered in the menu
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmergencyKind {
    TrafficAccident,
    MedicalProblem,
    Fire,
    Assault,
    Other,
}

/// Per-kind response metadata
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResponseProfile {
    /// Priority on a 1-10 scale
    pub priority: u8,
    pub requires_medical_assistance: bool,
    pub description: &'static str,
    pub protocol: &'static [&'static str],
    pub required_services: &'static [&'static str],
}

const TRAFFIC_ACCIDENT: ResponseProfile = ResponseProfile {
    priority: 8,
    requires_medical_assistance: true,
    description: "Collision or run-over on a public road",
    protocol: &[
        "Switch on hazard lights and place warning triangles if it is safe.",
        "Do not move injured people unless there is an immediate danger.",
        "Keep clear of traffic and wait for the emergency services.",
    ],
    required_services: &["Ambulance", "Traffic police", "Fire brigade (if people are trapped)"],
};

const MEDICAL_PROBLEM: ResponseProfile = ResponseProfile {
    priority: 8,
    requires_medical_assistance: true,
    description: "Health emergency such as a heart attack or a serious fall",
    protocol: &[
        "Check the patient's consciousness and breathing.",
        "Give first aid if it is possible and safe.",
        "Do not move the patient if a spinal injury is suspected.",
        "Prepare for the arrival of the ambulance.",
    ],
    required_services: &["Advanced life support ambulance", "Emergency medical team"],
};

const FIRE: ResponseProfile = ResponseProfile {
    priority: 9,
    requires_medical_assistance: false,
    description: "Fire in a building, vehicle or open area",
    protocol: &[
        "Leave the area and close doors behind you.",
        "Stay low if there is smoke; do not use lifts.",
        "Meet at a safe point and report anyone missing.",
    ],
    required_services: &["Fire brigade", "Ambulance"],
};

const ASSAULT: ResponseProfile = ResponseProfile {
    priority: 9,
    requires_medical_assistance: false,
    description: "Physical aggression or threat to a person",
    protocol: &[
        "Move to a safe place away from the aggressor.",
        "Do not confront the aggressor.",
        "Note any description that can help the police.",
    ],
    required_services: &["Police", "Ambulance (if there are injuries)"],
};

const OTHER: ResponseProfile = ResponseProfile {
    priority: 5,
    requires_medical_assistance: false,
    description: "Any other situation that needs emergency assistance",
    protocol: &[
        "Stay in a safe place.",
        "Follow the operator's instructions.",
    ],
    required_services: &["Emergency coordination centre"],
};

impl EmergencyKind {
    /// Menu order
    pub const ALL: [EmergencyKind; 5] = [
        EmergencyKind::TrafficAccident,
        EmergencyKind::MedicalProblem,
        EmergencyKind::Fire,
        EmergencyKind::Assault,
        EmergencyKind::Other,
    ];

    /// Parse a menu answer ("1".."5")
    pub fn from_menu_choice(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(EmergencyKind::TrafficAccident),
            "2" => Some(EmergencyKind::MedicalProblem),
            "3" => Some(EmergencyKind::Fire),
            "4" => Some(EmergencyKind::Assault),
            "5" => Some(EmergencyKind::Other),
            _ => None,
        }
    }

    pub fn menu_number(&self) -> u8 {
        match self {
            EmergencyKind::TrafficAccident => 1,
            EmergencyKind::MedicalProblem => 2,
            EmergencyKind::Fire => 3,
            EmergencyKind::Assault => 4,
            EmergencyKind::Other => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EmergencyKind::TrafficAccident => "Traffic Accident",
            EmergencyKind::MedicalProblem => "Medical Problem",
            EmergencyKind::Fire => "Fire",
            EmergencyKind::Assault => "Assault",
            EmergencyKind::Other => "Other",
        }
    }

    pub fn response(&self) -> &'static ResponseProfile {
        match self {
            EmergencyKind::TrafficAccident => &TRAFFIC_ACCIDENT,
            EmergencyKind::MedicalProblem => &MEDICAL_PROBLEM,
            EmergencyKind::Fire => &FIRE,
            EmergencyKind::Assault => &ASSAULT,
            EmergencyKind::Other => &OTHER,
        }
    }

    /// Numbered protocol steps followed by the required services
    pub fn protocol_text(&self) -> String {
        let response = self.response();
        let mut text = format!(
            "{} PROTOCOL (priority {}/{})\n",
            self.label().to_uppercase(),
            response.priority,
            MAX_SEVERITY
        );
        for (i, step) in response.protocol.iter().enumerate() {
            text.push_str(&format!("{}. {}\n", i + 1, step));
        }
        text.push_str("Required services:");
        for service in response.required_services {
            text.push_str(&format!("\n  - {}", service));
        }
        text
    }
}

impl fmt::Display for EmergencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Incident report
// =============================================================================

/// Serialized as `yyyy-MM-ddTHH:mm:ss`
pub(crate) mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Current local time truncated to whole seconds, so that stored and
/// in-memory values compare equal
pub(crate) fn now_seconds() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// A confirmed emergency. Only the identifier changes after construction,
/// and only inside the record store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentReport {
    id: Option<String>,
    emergency_type: EmergencyKind,
    location: String,
    severity_level: u8,
    #[serde(with = "timestamp_format")]
    timestamp: NaiveDateTime,
    user_data: String,
}

impl IncidentReport {
    pub(crate) fn new(kind: EmergencyKind, location: String, severity: u8, user_data: String) -> Self {
        Self {
            id: None,
            emergency_type: kind,
            location,
            severity_level: severity,
            timestamp: now_seconds(),
            user_data,
        }
    }

    pub(crate) fn assign_id(&mut self, id: String) {
        self.id = Some(id);
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn kind(&self) -> EmergencyKind {
        self.emergency_type
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn severity(&self) -> u8 {
        self.severity_level
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// Profile snapshot taken when the report was confirmed
    pub fn user_data(&self) -> &str {
        &self.user_data
    }

    /// One-line summary used by the history listing
    pub fn summary(&self) -> String {
        format!(
            "[{}] {}, Location: {}, Severity: {}, User: {}",
            self.timestamp.format("%Y-%m-%d %H:%M"),
            self.emergency_type,
            self.location,
            self.severity_level,
            self.user_data.lines().next().unwrap_or("")
        )
    }

    /// Timestamp in the alert display format
    pub fn display_time(&self) -> String {
        self.timestamp.format(DISPLAY_TIME_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> IncidentReport {
        IncidentReport::new(
            EmergencyKind::Fire,
            "Gran Vía 12".into(),
            6,
            "Name: Ana Ruiz\nPhone: 600123456".into(),
        )
    }

    #[test]
    fn test_menu_choices_round_trip() {
        for kind in EmergencyKind::ALL {
            let choice = kind.menu_number().to_string();
            assert_eq!(EmergencyKind::from_menu_choice(&choice), Some(kind));
        }
        assert_eq!(EmergencyKind::from_menu_choice("0"), None);
        assert_eq!(EmergencyKind::from_menu_choice("6"), None);
        assert_eq!(EmergencyKind::from_menu_choice("two"), None);
    }

    #[test]
    fn test_every_kind_has_protocol_and_services() {
        for kind in EmergencyKind::ALL {
            let response = kind.response();
            assert!(!response.protocol.is_empty());
            assert!(!response.required_services.is_empty());
            assert!((1..=10).contains(&response.priority));
        }
        assert!(EmergencyKind::MedicalProblem.response().requires_medical_assistance);
    }

    #[test]
    fn test_protocol_text_numbers_steps() {
        let text = EmergencyKind::MedicalProblem.protocol_text();
        assert!(text.starts_with("MEDICAL PROBLEM PROTOCOL"));
        assert!(text.contains("1. Check the patient's consciousness"));
        assert!(text.contains("  - Emergency medical team"));
    }

    #[test]
    fn test_new_report_has_no_id() {
        let report = sample();
        assert!(report.id().is_none());
        assert_eq!(report.timestamp().nanosecond(), 0);
    }

    #[test]
    fn test_json_shape() {
        let mut report = sample();
        report.assign_id("abc".into());
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["id"], "abc");
        assert_eq!(value["emergencyType"], "Fire");
        assert_eq!(value["severityLevel"], 6);
        let ts = value["timestamp"].as_str().unwrap();
        assert_eq!(ts.len(), "2024-01-01T00:00:00".len());

        let back: IncidentReport = serde_json::from_value(value).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_summary_uses_first_snapshot_line() {
        let summary = sample().summary();
        assert!(summary.contains("Fire, Location: Gran Vía 12, Severity: 6, User: Name: Ana Ruiz"));
        assert!(!summary.contains("Phone"));
    }
}
