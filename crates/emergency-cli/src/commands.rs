//! Non-interactive commands: history, health centers, protocols

use colored::*;
use emergency_core::health_centers::{self, HealthCenter};
use emergency_core::{EmergencyKind, RecordStore, StoreError};
use std::fmt::Write;
use std::path::Path;

// =============================================================================
// History
// =============================================================================

pub fn history(logs_dir: &Path, limit: Option<usize>) -> Result<(), StoreError> {
    print!("{}", render_history(logs_dir, limit)?);
    Ok(())
}

/// Most recent `limit` incidents (all when `None`), each followed by its feedback
pub fn render_history(logs_dir: &Path, limit: Option<usize>) -> Result<String, StoreError> {
    let mut out = banner("EMERGENCY HISTORY");

    let store = RecordStore::new(logs_dir);
    let incidents = store.load_incidents()?;
    let feedback = store.load_feedback()?;

    if incidents.is_empty() {
        let _ = writeln!(out, "  No emergencies recorded in {}", logs_dir.display());
        return Ok(out);
    }

    let skip = limit.map_or(0, |n| incidents.len().saturating_sub(n));
    for report in incidents.iter().skip(skip) {
        let _ = writeln!(out, "{}", report.summary());
        let _ = writeln!(out, "  id: {}", report.id().unwrap_or("-").cyan());
        for entry in feedback.iter().filter(|f| Some(f.emergency_id()) == report.id()) {
            let _ = writeln!(
                out,
                "  feedback: {} \"{}\"",
                entry.rating().to_string().yellow(),
                entry.comments()
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  {} incidents, {} feedback entries",
        incidents.len().to_string().cyan(),
        feedback.len().to_string().cyan()
    );
    Ok(out)
}

// =============================================================================
// Health centers
// =============================================================================

pub fn centers(municipality: Option<&str>) {
    print!("{}", render_centers(&health_centers::bundled(), municipality));
}

pub fn render_centers(all: &[HealthCenter], municipality: Option<&str>) -> String {
    let mut out = banner("HEALTH CENTERS");

    let listed = health_centers::in_municipality(all, municipality.unwrap_or(""));
    if listed.is_empty() {
        let _ = writeln!(out, "  No health centers match.");
        return out;
    }
    for center in listed {
        let _ = writeln!(out, "{} {}", center.code.cyan(), center);
        let _ = writeln!(out, "    {} ({}, {})", center.address, center.latitude, center.longitude);
    }
    out
}

fn banner(title: &str) -> String {
    let rule = "─".repeat(60);
    format!("{}\n{}\n{}\n", rule, title.green().bold(), rule)
}

// =============================================================================
// Protocols
// =============================================================================

pub fn protocol(choice: u8) -> Result<(), String> {
    let kind = EmergencyKind::from_menu_choice(&choice.to_string())
        .ok_or_else(|| format!("no emergency type {} (expected 1-5)", choice))?;

    print!("{}", banner(&kind.label().to_uppercase()));
    println!("  {}", kind.response().description);
    println!(
        "  Medical assistance always required: {}",
        if kind.response().requires_medical_assistance { "yes" } else { "no" }
    );
    println!();
    println!("{}", kind.protocol_text());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use emergency_core::{
        Console, Detection, FeedbackRecord, IncidentCollector, Profile, Rating,
    };
    use std::io::Cursor;
    use tempfile::TempDir;

    fn record(store: &RecordStore, script: &str) -> String {
        let profile = Profile {
            full_name: "Ana Ruiz".into(),
            phone: "600123456".into(),
            medical_info: "Not specified".into(),
            emergency_contact: "Luis Ruiz 600654321".into(),
        };
        let mut console = Console::new(Cursor::new(script.to_string()), Vec::new(), Vec::new());
        let mut report = match IncidentCollector::new("S").detect(&mut console, &profile).unwrap() {
            Detection::Reported(report) => report,
            Detection::Cancelled => panic!("expected a report"),
        };
        store.save_incident(&mut report).unwrap()
    }

    #[test]
    fn test_history_limit_and_feedback_join() {
        colored::control::set_override(false);
        let tmp = TempDir::new().unwrap();
        let store = RecordStore::new(tmp.path());
        let first = record(&store, "S\n1\nRoundabout\n4\nS\n");
        let second = record(&store, "S\n3\nMill Road\n8\nS\n");
        let third = record(&store, "S\n2\nDowntown\n7\nS\n");
        store
            .save_feedback(&FeedbackRecord::new(&second, Rating::Score(4), "quick"))
            .unwrap();
        store
            .save_feedback(&FeedbackRecord::new(&third, Rating::Skipped, ""))
            .unwrap();

        let out = render_history(tmp.path(), Some(2)).unwrap();
        assert!(!out.contains(&first));
        assert!(!out.contains("Roundabout"));
        assert!(out.contains(&second));
        assert!(out.contains(&third));
        assert!(out.contains("feedback: 4/5 \"quick\""));
        assert!(out.contains("\"No comments\""));
        // totals cover the whole store, not just the listed tail
        assert!(out.contains("3 incidents, 2 feedback entries"));

        let all = render_history(tmp.path(), None).unwrap();
        assert!(all.contains("Roundabout"));
        let oversized = render_history(tmp.path(), Some(10)).unwrap();
        assert!(oversized.contains("Roundabout"));
    }

    #[test]
    fn test_history_of_empty_store() {
        let tmp = TempDir::new().unwrap();
        let out = render_history(tmp.path(), None).unwrap();
        assert!(out.contains("No emergencies recorded"));
    }

    #[test]
    fn test_history_of_corrupt_store_fails() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("emergency_history.json"), "not json").unwrap();
        assert!(render_history(tmp.path(), None).is_err());
    }

    #[test]
    fn test_centers_filter_by_municipality() {
        let all = health_centers::bundled();

        let lorca = render_centers(&all, Some("lorca"));
        assert!(lorca.contains("Lorca Centro"));
        assert!(!lorca.contains("Murcia Centro"));

        let everything = render_centers(&all, None);
        assert!(everything.contains("Lorca Centro"));
        assert!(everything.contains("Murcia Centro"));

        assert!(render_centers(&all, Some("Atlantis")).contains("No health centers match"));
    }
}
