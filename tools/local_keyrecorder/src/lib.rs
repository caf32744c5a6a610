//! Keystroke recorder bound to a single text-entry surface.
//!
//! Key presses delivered to the application's own input widget are turned into
//! timestamped, tab-separated lines, appended to a tagged log file and echoed to
//! stdout. Nothing outside that widget is observed.

pub mod capture;
pub mod config;
pub mod error;
pub mod inspect;
pub mod keysym;
pub mod log_store;
pub mod record;
#[cfg(windows)]
pub mod window;

pub use capture::{CapturePipeline, Console, KeyHandler, KeySurface};
pub use config::RecorderConfig;
pub use error::LogStoreError;
pub use log_store::{LogStore, TagStatus};
pub use record::{Clock, KeyEvent, KeyRecord, RecordKind, SystemClock};

/// Marker written at the top of every log so scanners can identify it.
pub const IDENTIFICATION_TAG: &str = "LOCAL_KEYRECORDER_EDU_v1";

/// Log file used when nothing else is configured, relative to the working dir.
pub const DEFAULT_LOG_FILE: &str = "local_keyrecorder_edu.log";
