//! Emergency Core - Guided Emergency Reporting
//!
//! Interactive workflow that walks a single user through reporting an
//! emergency: profile collection, guided incident detection, simulated alert
//! dispatch, durable JSON records and post-incident feedback.
//!
//! # Components
//!
//! - [`profile`]: user identity/medical/contact data with input validation
//! - [`collector`]: the prompt-driven incident state machine
//! - [`dispatch`]: alert channels, audit log and the simulated connection
//! - [`store`]: whole-collection JSON persistence for incidents and feedback
//! - [`session`]: the orchestration loop tying everything together
//!
//! # Example
//!
//! ```rust
//! use emergency_core::{Config, Console, Session};
//! use emergency_core::dispatch::NoPause;
//! use std::io::Cursor;
//! use std::sync::Arc;
//!
//! let dir = std::env::temp_dir().join("emergency-core-doctest");
//! let config = Config { logs_dir: dir, ..Config::default() };
//!
//! // Profile, then "not an emergency", then exit
//! let script = "Ana Ruiz\n600123456\n\nLuis Ruiz 600654321\nN\nN\n";
//! let mut console = Console::new(Cursor::new(script), Vec::new(), Vec::new());
//!
//! let session = Session::new(config, Arc::new(NoPause));
//! session.run(&mut console).unwrap();
//! ```

pub mod collector;
pub mod config;
pub mod console;
pub mod dispatch;
pub mod error;
pub mod feedback;
pub mod health_centers;
pub mod incident;
pub mod profile;
pub mod session;
pub mod store;

// Re-export commonly used types for convenience
pub use collector::{Detection, IncidentCollector};
pub use config::Config;
pub use console::{Console, Terminal};
pub use dispatch::{AlertChannel, AlertDispatcher, ChannelKind, DispatchResult};
pub use error::{EmergencyError, StoreError};
pub use feedback::{FeedbackRecord, Rating};
pub use health_centers::HealthCenter;
pub use incident::{EmergencyKind, IncidentReport};
pub use profile::Profile;
pub use session::Session;
pub use store::RecordStore;

/// Lowest accepted severity level
pub const MIN_SEVERITY: u8 = 1;

/// Highest accepted severity level
pub const MAX_SEVERITY: u8 = 10;

/// Minimum number of digits in a valid phone number
pub const MIN_PHONE_DIGITS: usize = 9;

/// Display format for timestamps in alerts and audit logs
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Width of the horizontal rules used in console output and audit logs
pub const RULE_WIDTH: usize = 80;
