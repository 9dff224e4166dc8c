//! Session Orchestrator
//!
//! Collects the profile once, then loops: detect → persist → dispatch →
//! notify → feedback, asking after each round whether to continue. Errors
//! inside a round are reported and the loop carries on; only running out of
//! input ends the session early.

use crate::dispatch::{AlertChannel, Pause};
use crate::health_centers::{self, HealthCenter};
use crate::{feedback, profile};
use crate::{
    AlertDispatcher, Config, Detection, EmergencyError, IncidentCollector, IncidentReport,
    Profile, RecordStore, Terminal, RULE_WIDTH,
};
use colored::*;
use std::sync::Arc;

/// What happened in one round of the loop
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IterationOutcome {
    Cancelled,
    Dispatched { id: String },
    DispatchFailed { id: String },
}

pub struct Session {
    config: Config,
    collector: IncidentCollector,
    store: RecordStore,
    dispatcher: AlertDispatcher,
    centers: Vec<HealthCenter>,
}

impl Session {
    /// Session using the alert channel named in the config
    pub fn new(config: Config, pause: Arc<dyn Pause>) -> Self {
        let dispatcher = AlertDispatcher::from_config(&config, pause);
        Self::with_dispatcher(config, dispatcher)
    }

    pub fn with_channel(config: Config, channel: Box<dyn AlertChannel>) -> Self {
        Self::with_dispatcher(config, AlertDispatcher::new(channel))
    }

    fn with_dispatcher(config: Config, dispatcher: AlertDispatcher) -> Self {
        Self {
            collector: IncidentCollector::new(config.affirmative.clone()),
            store: RecordStore::new(config.logs_dir.clone()),
            dispatcher,
            centers: health_centers::bundled(),
            config,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Run until the user declines to continue
    pub fn run(&self, term: &mut dyn Terminal) -> Result<(), EmergencyError> {
        term.println(&format!("{}", "Emergency Management System - Started".bold()));
        term.println(&"=".repeat(41));
        tracing::info!(channel = self.dispatcher.describe(), "session started");

        let profile = profile::collect(term)?;

        loop {
            match self.run_iteration(term, &profile) {
                Ok(outcome) => tracing::debug!(?outcome, "iteration finished"),
                Err(e) if e.is_fatal() => {
                    tracing::error!(error = %e, "session aborted");
                    return Err(e);
                }
                Err(e) => {
                    tracing::error!(error = %e, "iteration failed");
                    term.eprintln(&format!("{} {}", "❌ Error:".red().bold(), e));
                }
            }

            let question = format!(
                "\nDo you want to perform another action? ({}/N): ",
                self.config.affirmative
            );
            let again = match term.confirm(&question, &self.config.affirmative) {
                Ok(again) => again,
                // end of input at this prompt is an ordinary exit
                Err(EmergencyError::InputExhausted) => false,
                Err(e) => {
                    tracing::error!(error = %e, "continue prompt failed");
                    term.eprintln(&format!("{} {}", "❌ Error:".red().bold(), e));
                    false
                }
            };
            if !again {
                term.println("\nLeaving the emergency system. Take care!");
                tracing::info!("session finished");
                return Ok(());
            }
            term.println(&format!("\n{}\n", "=".repeat(RULE_WIDTH)));
        }
    }

    /// One detect → persist → dispatch → feedback round
    pub fn run_iteration(
        &self,
        term: &mut dyn Terminal,
        profile: &Profile,
    ) -> Result<IterationOutcome, EmergencyError> {
        let mut report = match self.collector.detect(term, profile)? {
            Detection::Reported(report) => report,
            Detection::Cancelled => return Ok(IterationOutcome::Cancelled),
        };

        let id = self.store.save_incident(&mut report)?;
        term.println(&format!("\nIncident registered with id {}", id));

        let result = self.dispatcher.dispatch(term, &report);
        if !result.success {
            term.eprintln(&format!(
                "\n{} Please try again or call {} manually.",
                "The alert could not be sent.".red().bold(),
                self.config.emergency_number
            ));
            return Ok(IterationOutcome::DispatchFailed { id });
        }

        self.dispatcher.notify(term, profile, &report);
        self.show_guidance(term, &report);

        term.println(&format!("\n{}", "Emergency reported successfully!".green().bold()));
        term.println("A record of the emergency has been saved.");

        let feedback = feedback::prompt_feedback(term, &id)?;
        self.store.save_feedback(&feedback)?;
        term.println("Thank you for your feedback.");

        Ok(IterationOutcome::Dispatched { id })
    }

    /// Response protocol for the kind, plus nearby health centers when the
    /// location is inside the configured region
    fn show_guidance(&self, term: &mut dyn Terminal, report: &IncidentReport) {
        term.println(&format!("\n{}", report.kind().protocol_text()));

        if !health_centers::location_matches(report.location(), &self.config.region_keyword) {
            return;
        }
        let nearby = health_centers::in_municipality(&self.centers, &self.config.region_keyword);
        let listed: Vec<&HealthCenter> = if nearby.is_empty() {
            self.centers.iter().collect()
        } else {
            nearby
        };
        if listed.is_empty() {
            return;
        }
        term.println("\nHealth centers in your area:");
        for center in listed {
            term.println(&format!("  - {}", center));
            term.println(&format!("    {}", center.address));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::NoPause;
    use crate::Console;
    use std::io::{self, BufReader, Cursor, Read};
    use tempfile::TempDir;

    const PROFILE: &str = "Ana Ruiz\n600123456\n\nLuis Ruiz 600654321\n";

    fn config(dir: &TempDir) -> Config {
        Config {
            logs_dir: dir.path().to_path_buf(),
            connect_interval_ms: Some(0),
            ..Config::default()
        }
    }

    #[test]
    fn test_cancel_then_exit() {
        let tmp = TempDir::new().unwrap();
        let session = Session::new(config(&tmp), Arc::new(NoPause));
        let script = format!("{}N\nN\n", PROFILE);
        let mut console = Console::new(Cursor::new(script), Vec::new(), Vec::new());

        session.run(&mut console).unwrap();

        assert!(session.store().load_incidents().unwrap().is_empty());
        assert!(!session.store().incidents_path().exists());
        let out = String::from_utf8_lossy(console.output()).to_string();
        assert!(out.contains("perform another action"));
        assert!(out.contains("Leaving the emergency system"));
    }

    #[test]
    fn test_region_keyword_lists_centers() {
        let tmp = TempDir::new().unwrap();
        let session = Session::new(config(&tmp), Arc::new(NoPause));
        let script = format!("{}S\n3\nGran Vía, Murcia\n5\nS\n4\n\nN\n", PROFILE);
        let mut console = Console::new(Cursor::new(script), Vec::new(), Vec::new());

        session.run(&mut console).unwrap();

        let out = String::from_utf8_lossy(console.output()).to_string();
        assert!(out.contains("FIRE PROTOCOL"));
        assert!(out.contains("Health centers in your area"));
        assert!(out.contains("Centro de Salud Murcia Centro"));
        assert!(!out.contains("Lorca Centro"));
    }

    #[test]
    fn test_other_locations_get_no_centers() {
        let tmp = TempDir::new().unwrap();
        let session = Session::new(config(&tmp), Arc::new(NoPause));
        let script = format!("{}S\n1\nDowntown\n2\nS\n\n\nN\n", PROFILE);
        let mut console = Console::new(Cursor::new(script), Vec::new(), Vec::new());

        session.run(&mut console).unwrap();

        let out = String::from_utf8_lossy(console.output()).to_string();
        assert!(out.contains("TRAFFIC ACCIDENT PROTOCOL"));
        assert!(!out.contains("Health centers in your area"));
    }

    #[test]
    fn test_eof_during_profile_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let session = Session::new(config(&tmp), Arc::new(NoPause));
        let mut console = Console::new(Cursor::new("Ana Ruiz\n"), Vec::new(), Vec::new());

        assert!(matches!(
            session.run(&mut console),
            Err(EmergencyError::InputExhausted)
        ));
    }

    #[test]
    fn test_eof_at_continue_prompt_exits_cleanly() {
        let tmp = TempDir::new().unwrap();
        let session = Session::new(config(&tmp), Arc::new(NoPause));
        let script = format!("{}N\n", PROFILE);
        let mut console = Console::new(Cursor::new(script), Vec::new(), Vec::new());

        session.run(&mut console).unwrap();
    }

    #[test]
    fn test_invalid_utf8_answers_do_not_end_session() {
        let tmp = TempDir::new().unwrap();
        let session = Session::new(config(&tmp), Arc::new(NoPause));
        let mut script = b"\xffAna\n600123456\n\nLuis Ruiz 600654321\nN\n".to_vec();
        script.extend_from_slice(b"\xff\xfe\n");
        let mut console = Console::new(Cursor::new(script), Vec::new(), Vec::new());

        session.run(&mut console).unwrap();

        let out = String::from_utf8_lossy(console.output()).to_string();
        assert!(out.contains("Process cancelled"));
        assert!(out.contains("Leaving the emergency system"));
    }

    /// Yields the script, then fails every later read
    struct BrokenAfter(Cursor<Vec<u8>>);

    impl Read for BrokenAfter {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.read(buf)? {
                0 => Err(io::Error::new(io::ErrorKind::Other, "device gone")),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn test_read_error_at_continue_prompt_is_reported() {
        let tmp = TempDir::new().unwrap();
        let session = Session::new(config(&tmp), Arc::new(NoPause));
        let script = format!("{}N\n", PROFILE).into_bytes();
        let input = BufReader::new(BrokenAfter(Cursor::new(script)));
        let mut console = Console::new(input, Vec::new(), Vec::new());

        session.run(&mut console).unwrap();

        let err = String::from_utf8_lossy(console.error_output()).to_string();
        assert!(err.contains("device gone"));
        let out = String::from_utf8_lossy(console.output()).to_string();
        assert!(out.contains("Leaving the emergency system"));
    }
}
