/// Version of the classification algorithm embedded in every output.
/// Bump whenever the decision table or reason format changes.
pub const PSW_VERSION: &str = "1.0.0";

/// Default idle gap (seconds) above which a heartbeat gap is not counted as active time
/// and a chunk is considered to contain a long idle.
pub const DEFAULT_IDLE_CUTOFF_SECONDS: f64 = 60.0;

/// Default minimum active time in a chunk before struggle detection engages.
pub const DEFAULT_T_ACTIVE_SECONDS: f64 = 120.0;

/// Default gap since the last test run that counts as stalling.
pub const DEFAULT_RUN_GAP_SECONDS: f64 = 90.0;

/// Default number of unproductive runs in a chunk that counts as flailing.
pub const DEFAULT_FLAIL_RUNS: u32 = 3;

/// Default net character change below which a chunk has "low edits".
pub const DEFAULT_MIN_CHAR_CHANGE: f64 = 20.0;

/// Default number of edit events that, with low edits, counts as churn.
pub const DEFAULT_MIN_EDIT_EVENTS: u32 = 12;

/// Default size (in characters) at or below which an edit is small.
pub const DEFAULT_SMALL_EDIT: f64 = 5.0;

/// Default sustain window carried in the thresholds for downstream consumers.
pub const DEFAULT_PSW_SUSTAIN_SECONDS: f64 = 20.0;

/// Failure class used when an external run reports an error without a recognizable name.
pub const ERROR_CLASS_EXECUTION: &str = "execution_error";

/// Failure class used when tests failed without any error text.
pub const ERROR_CLASS_ASSERTION_MISMATCH: &str = "assertion_mismatch";

/// Environment variables read by [`crate::settings::Settings::apply_env`].
pub mod env {
    /// `"true"` (case-insensitive) routes test runs to the external evaluator.
    pub const ORACLE_AS_RUN_TESTS: &str = "PSW_ORACLE_AS_RUN_TESTS";

    /// Version id bound for external evaluation. Empty unbinds.
    pub const ORACLE_VERSION_ID: &str = "PSW_ORACLE_VERSION_ID";

    /// Base URL of the external evaluator service.
    pub const ORACLE_URL: &str = "PSW_ORACLE_URL";
}
