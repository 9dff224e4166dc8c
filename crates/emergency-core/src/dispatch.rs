//! Alert Dispatcher
//!
//! Delivers a confirmed [`IncidentReport`] through an [`AlertChannel`]:
//!
//! 1. format and display the alert
//! 2. append it to the channel's audit log (best-effort)
//! 3. simulate the connection to the emergency line with a visible delay
//!
//! Contact notification is a separate capability of the same channel.
//! Only an interrupted connection wait makes a dispatch fail.

use crate::config::Config;
use crate::{IncidentReport, Profile, Terminal, RULE_WIDTH};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Number of visible pauses while "connecting"
pub const CONNECT_STAGES: usize = 3;

/// Audit file of the standard alert channel
pub const STANDARD_AUDIT_FILE: &str = "emergency_alerts.log";

/// Audit file of the phone-call channel
pub const CALL_AUDIT_FILE: &str = "call_alerts.log";

// =============================================================================
// Pausing and interruption
// =============================================================================

#[derive(Debug, Error, PartialEq, Eq)]
#[error("connection wait was interrupted")]
pub struct Interrupted;

/// Blocking pause on the caller's thread
pub trait Pause: Send + Sync {
    fn pause(&self, duration: Duration) -> Result<(), Interrupted>;
}

/// Returns immediately; used by tests and non-interactive runs
pub struct NoPause;

impl Pause for NoPause {
    fn pause(&self, _duration: Duration) -> Result<(), Interrupted> {
        Ok(())
    }
}

const IDLE: u8 = 0;
const PAUSING: u8 = 1;
const INTERRUPTED: u8 = 2;

/// Shared between the signal handler and [`InterruptiblePause`].
///
/// One atomic word moves idle → pausing → interrupted → idle, so an
/// interrupt is either absorbed by the running pause or reported as
/// unhandled, never both and never neither.
#[derive(Debug, Default)]
pub struct InterruptState {
    phase: AtomicU8,
}

impl InterruptState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an interrupt. Returns `false` when no pause is in progress, in
    /// which case the caller decides what the interrupt means.
    pub fn interrupt(&self) -> bool {
        match self
            .phase
            .compare_exchange(PAUSING, INTERRUPTED, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => true,
            Err(current) => current == INTERRUPTED,
        }
    }

    fn is_interrupted(&self) -> bool {
        self.phase.load(Ordering::SeqCst) == INTERRUPTED
    }
}

/// Sleeps in short slices, checking for an interrupt between slices
pub struct InterruptiblePause {
    state: Arc<InterruptState>,
    slice: Duration,
}

impl InterruptiblePause {
    pub fn new(state: Arc<InterruptState>) -> Self {
        Self {
            state,
            slice: Duration::from_millis(25),
        }
    }
}

impl Pause for InterruptiblePause {
    fn pause(&self, duration: Duration) -> Result<(), Interrupted> {
        self.state.phase.store(PAUSING, Ordering::SeqCst);

        let mut remaining = duration;
        while !remaining.is_zero() && !self.state.is_interrupted() {
            let step = remaining.min(self.slice);
            thread::sleep(step);
            remaining -= step;
        }

        if self.state.phase.swap(IDLE, Ordering::SeqCst) == INTERRUPTED {
            Err(Interrupted)
        } else {
            Ok(())
        }
    }
}

// =============================================================================
// Audit log
// =============================================================================

/// Append-only plain-text log of dispatched alerts
#[derive(Clone, Debug)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, alert: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(file, "{}\n", alert)?;
        Ok(())
    }
}

/// Step 2 of every dispatch; failure is reported, never propagated
fn record_alert(term: &mut dyn Terminal, audit: &AuditLog, alert: &str) {
    if let Err(e) = audit.append(alert) {
        tracing::warn!(path = %audit.path().display(), error = %e, "audit log write failed");
        term.eprintln(&format!("❌ Error: could not write the alert to the audit log: {}", e));
    }
}

/// Print one dot per stage, pausing between them
fn wait_for_line(
    term: &mut dyn Terminal,
    pause: &dyn Pause,
    interval: Duration,
) -> Result<(), Interrupted> {
    for _ in 0..CONNECT_STAGES {
        term.print(".");
        pause.pause(interval)?;
    }
    term.println("");
    Ok(())
}

// =============================================================================
// Channels
// =============================================================================

/// A way of delivering alerts
pub trait AlertChannel {
    /// Display, log and deliver the alert. `false` means delivery failed.
    fn send(&self, term: &mut dyn Terminal, report: &IncidentReport) -> bool;

    /// Tell the user's personal emergency contact about the incident
    fn notify(&self, term: &mut dyn Terminal, profile: &Profile, report: &IncidentReport);

    fn describe(&self) -> &'static str;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    #[default]
    Standard,
    Call,
}

impl ChannelKind {
    /// Default interval between connection dots
    pub fn default_interval(&self) -> Duration {
        match self {
            ChannelKind::Standard => Duration::from_millis(400),
            ChannelKind::Call => Duration::from_millis(500),
        }
    }

    pub fn audit_file(&self) -> &'static str {
        match self {
            ChannelKind::Standard => STANDARD_AUDIT_FILE,
            ChannelKind::Call => CALL_AUDIT_FILE,
        }
    }
}

impl FromStr for ChannelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(ChannelKind::Standard),
            "call" => Ok(ChannelKind::Call),
            other => Err(format!("unknown alert channel: {} (expected standard or call)", other)),
        }
    }
}

/// Full alert sent to the emergency service, including the profile snapshot
pub fn format_alert(report: &IncidentReport) -> String {
    format!(
        "[{}] EMERGENCY ALERT\nType: {}\nLocation: {}\nSeverity: {}/{}\n\n--- USER INFORMATION ---\n{}",
        report.display_time(),
        report.kind(),
        report.location(),
        report.severity(),
        crate::MAX_SEVERITY,
        report.user_data()
    )
}

/// Default channel: alert to the emergency coordination service
pub struct StandardAlert {
    emergency_number: String,
    interval: Duration,
    audit: AuditLog,
    pause: Arc<dyn Pause>,
}

impl StandardAlert {
    pub fn new(
        emergency_number: impl Into<String>,
        interval: Duration,
        audit: AuditLog,
        pause: Arc<dyn Pause>,
    ) -> Self {
        Self {
            emergency_number: emergency_number.into(),
            interval,
            audit,
            pause,
        }
    }
}

impl AlertChannel for StandardAlert {
    fn send(&self, term: &mut dyn Terminal, report: &IncidentReport) -> bool {
        let alert = format_alert(report);
        term.println("\n=== ALERT SENT TO EMERGENCY SERVICES ===");
        term.println(&alert);
        record_alert(term, &self.audit, &alert);

        term.println(&format!(
            "\nConnecting to emergency service {}...",
            self.emergency_number
        ));
        if wait_for_line(term, self.pause.as_ref(), self.interval).is_err() {
            tracing::warn!("standard alert connection interrupted");
            term.eprintln("\n❌ Error: the connection to the emergency service was interrupted.");
            return false;
        }

        term.println("\n✅ Connected to the emergency coordination centre!");
        term.println("   Operator: \"Emergency services, what is your situation?\"");
        term.println("   System: \"Automated emergency report.\"");
        term.println(&format!("   - Type: {}", report.kind()));
        term.println(&format!("   - Location: {}", report.location()));
        term.println("\n✅ Help is on the way! Emergency services have been dispatched.");
        true
    }

    fn notify(&self, term: &mut dyn Terminal, profile: &Profile, report: &IncidentReport) {
        term.println("\n--- Notifying emergency contacts ---");
        if profile.emergency_contact.trim().is_empty() {
            term.eprintln("⚠️  No emergency contact configured; nobody was notified.");
            return;
        }
        term.println(&format!("✅ Notification sent to: {}", profile.emergency_contact));
        term.println("   Details sent:");
        term.println(&format!("   - Emergency type: {}", report.kind()));
        term.println(&format!("   - Location: {}", report.location()));
        term.println(&"-".repeat(43));
    }

    fn describe(&self) -> &'static str {
        "Standard emergency alert system"
    }
}

/// Phone-call simulation
pub struct CallAlert {
    emergency_number: String,
    interval: Duration,
    audit: AuditLog,
    pause: Arc<dyn Pause>,
}

impl CallAlert {
    pub fn new(
        emergency_number: impl Into<String>,
        interval: Duration,
        audit: AuditLog,
        pause: Arc<dyn Pause>,
    ) -> Self {
        Self {
            emergency_number: emergency_number.into(),
            interval,
            audit,
            pause,
        }
    }
}

impl AlertChannel for CallAlert {
    fn send(&self, term: &mut dyn Terminal, report: &IncidentReport) -> bool {
        let alert = format_alert(report);
        term.println("\n=== STARTING EMERGENCY CALL ===");
        term.println(&alert);
        record_alert(term, &self.audit, &alert);

        term.println(&format!("\nDialing {}...", self.emergency_number));
        if wait_for_line(term, self.pause.as_ref(), self.interval).is_err() {
            tracing::warn!("emergency call interrupted");
            term.eprintln("\n❌ The emergency call was interrupted.");
            return false;
        }

        term.println("✅ Connected to the operator!");
        term.println(&format!(
            "   System: \"Reporting a {} emergency at {}.\"",
            report.kind(),
            report.location()
        ));
        true
    }

    fn notify(&self, term: &mut dyn Terminal, profile: &Profile, report: &IncidentReport) {
        term.println("\n--- Calling emergency contacts... ---");
        if profile.emergency_contact.trim().is_empty() {
            term.eprintln("⚠️  No emergency contacts to call.");
            return;
        }
        term.println(&format!(
            "✅ Notification call placed to: {} ({} at {})",
            profile.emergency_contact,
            report.kind(),
            report.location()
        ));
        term.println(&"-".repeat(52));
    }

    fn describe(&self) -> &'static str {
        "Phone call"
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchResult {
    pub success: bool,
}

/// Wraps the channel selected at construction
pub struct AlertDispatcher {
    channel: Box<dyn AlertChannel>,
}

impl AlertDispatcher {
    pub fn new(channel: Box<dyn AlertChannel>) -> Self {
        Self { channel }
    }

    /// Build the channel named in the config, with its audit log under `logs_dir`
    pub fn from_config(config: &Config, pause: Arc<dyn Pause>) -> Self {
        let kind = config.channel;
        let interval = config
            .connect_interval_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| kind.default_interval());
        let audit = AuditLog::new(config.logs_dir.join(kind.audit_file()));

        let channel: Box<dyn AlertChannel> = match kind {
            ChannelKind::Standard => Box::new(StandardAlert::new(
                config.emergency_number.clone(),
                interval,
                audit,
                pause,
            )),
            ChannelKind::Call => Box::new(CallAlert::new(
                config.emergency_number.clone(),
                interval,
                audit,
                pause,
            )),
        };
        Self::new(channel)
    }

    pub fn dispatch(&self, term: &mut dyn Terminal, report: &IncidentReport) -> DispatchResult {
        let success = self.channel.send(term, report);
        tracing::info!(
            channel = self.channel.describe(),
            id = report.id().unwrap_or("-"),
            success,
            "alert dispatched"
        );
        DispatchResult { success }
    }

    pub fn notify(&self, term: &mut dyn Terminal, profile: &Profile, report: &IncidentReport) {
        self.channel.notify(term, profile, report);
    }

    pub fn describe(&self) -> &'static str {
        self.channel.describe()
    }
}
