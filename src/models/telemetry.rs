//! Telemetry events consumed by the detector.
//!
//! Events arrive on the wire as `{"ts": <ms>, "type": "...", "payload": {...}}`.
//! The payload is kept as raw JSON so unknown keys survive a round trip, and
//! [`TelemetryEvent::signal`] is the single place where payload fields are
//! coerced into the typed values the detector works with.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Kind of interaction that produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Edit,
    RunTests,
    RunProgram,
    IdleHeartbeat,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Edit => "edit",
            EventKind::RunTests => "run_tests",
            EventKind::RunProgram => "run_program",
            EventKind::IdleHeartbeat => "idle_heartbeat",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A single telemetry event from a learner session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    /// Milliseconds since the epoch. Non-numeric wire values become NaN and
    /// are rejected by the detector rather than by the parser.
    #[serde(deserialize_with = "deserialize_lenient_ts")]
    pub ts: f64,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default)]
    pub payload: Map<String, Value>,
}

/// Typed view of an event payload after normalization.
///
/// `None` means the field was present but not usable as a finite number.
/// Missing fields are read as zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Signal {
    Edit {
        delta_chars: Option<f64>,
    },
    RunTests {
        pass_count: Option<f64>,
        total_tests: Option<f64>,
    },
    RunProgram,
    IdleHeartbeat {
        idle_seconds: Option<f64>,
    },
}

impl Signal {
    /// Idle time this event reports for the activity clock.
    ///
    /// Only heartbeats report idle time; gaps between other events are never
    /// inferred as idle.
    pub fn reported_idle_seconds(&self) -> f64 {
        match self {
            Signal::IdleHeartbeat { idle_seconds } => idle_seconds.unwrap_or(0.0),
            _ => 0.0,
        }
    }
}

impl TelemetryEvent {
    /// Create an event with an empty payload
    pub fn new(ts: f64, kind: EventKind) -> Self {
        Self {
            ts,
            kind,
            payload: Map::new(),
        }
    }

    /// Create an edit event
    pub fn edit(ts: f64, delta_chars: i64) -> Self {
        Self::new(ts, EventKind::Edit).with_payload("delta_chars", delta_chars)
    }

    /// Create a test-run event
    pub fn run_tests(ts: f64, pass_count: i64, total_tests: i64) -> Self {
        Self::new(ts, EventKind::RunTests)
            .with_payload("pass_count", pass_count)
            .with_payload("total_tests", total_tests)
    }

    /// Create a program-run event
    pub fn run_program(ts: f64) -> Self {
        Self::new(ts, EventKind::RunProgram)
    }

    /// Create an idle heartbeat
    pub fn idle_heartbeat(ts: f64, idle_seconds: f64) -> Self {
        Self::new(ts, EventKind::IdleHeartbeat)
            .with_payload("idle_seconds_since_last_activity", json_number(idle_seconds))
    }

    /// Set an arbitrary payload field
    pub fn with_payload(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.payload.insert(key.to_string(), value.into());
        self
    }

    /// Set the run duration in milliseconds
    pub fn with_duration_ms(self, duration_ms: f64) -> Self {
        self.with_payload("duration_ms", json_number(duration_ms))
    }

    /// Read a payload field as a finite number.
    ///
    /// Missing and `null` fields read as `Some(0.0)`. Fields that cannot be
    /// coerced to a finite number read as `None`.
    pub fn payload_number(&self, key: &str) -> Option<f64> {
        match self.payload.get(key) {
            None => Some(0.0),
            Some(value) => coerce_number(value),
        }
    }

    /// Read a payload field as a string
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }

    /// Normalize the payload into the typed signal for this event kind
    pub fn signal(&self) -> Signal {
        match self.kind {
            EventKind::Edit => Signal::Edit {
                delta_chars: self.payload_number("delta_chars"),
            },
            EventKind::RunTests => Signal::RunTests {
                pass_count: self.payload_number("pass_count"),
                total_tests: self.payload_number("total_tests"),
            },
            EventKind::RunProgram => Signal::RunProgram,
            EventKind::IdleHeartbeat => Signal::IdleHeartbeat {
                idle_seconds: self.payload_number("idle_seconds_since_last_activity"),
            },
        }
    }
}

/// Coerce a JSON value into a finite number.
///
/// Numbers pass through, numeric strings are parsed (blank strings read as
/// zero), booleans map to 1/0 and `null` reads as zero. Everything else, and
/// any non-finite result, is `None`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().ok()?
            }
        }
        Value::Array(_) | Value::Object(_) => return None,
    };
    number.is_finite().then_some(number)
}

/// Encode a float as JSON, using an integer when the value is integral so
/// `60.0` serializes as `60`.
pub fn json_number(value: f64) -> Value {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        Value::from(value as i64)
    } else {
        serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

fn deserialize_lenient_ts<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => f64::NAN,
        other => coerce_number(&other).unwrap_or(f64::NAN),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_wire_event() {
        let event: TelemetryEvent = serde_json::from_value(json!({
            "ts": 1710000000000_i64,
            "type": "edit",
            "payload": {"delta_chars": 12, "cursor_line": 42, "file_id": "main.py"}
        }))
        .unwrap();

        assert_eq!(event.ts, 1_710_000_000_000.0);
        assert_eq!(event.kind, EventKind::Edit);
        assert_eq!(event.payload_str("file_id"), Some("main.py"));
        assert_eq!(
            event.signal(),
            Signal::Edit {
                delta_chars: Some(12.0)
            }
        );
    }

    #[test]
    fn test_missing_payload_defaults_to_empty() {
        let event: TelemetryEvent =
            serde_json::from_value(json!({"ts": 5, "type": "run_program"})).unwrap();
        assert!(event.payload.is_empty());
        assert_eq!(event.signal(), Signal::RunProgram);
    }

    #[test]
    fn test_null_ts_becomes_nan() {
        let event: TelemetryEvent =
            serde_json::from_value(json!({"ts": null, "type": "edit", "payload": {}})).unwrap();
        assert!(event.ts.is_nan());

        let event: TelemetryEvent =
            serde_json::from_value(json!({"ts": "soon", "type": "edit"})).unwrap();
        assert!(event.ts.is_nan());
    }

    #[test]
    fn test_unknown_event_type_is_rejected() {
        let parsed: Result<TelemetryEvent, _> =
            serde_json::from_value(json!({"ts": 1, "type": "keypress", "payload": {}}));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&json!(3)), Some(3.0));
        assert_eq!(coerce_number(&json!(-2.5)), Some(-2.5));
        assert_eq!(coerce_number(&json!("7")), Some(7.0));
        assert_eq!(coerce_number(&json!("  ")), Some(0.0));
        assert_eq!(coerce_number(&json!(true)), Some(1.0));
        assert_eq!(coerce_number(&json!(false)), Some(0.0));
        assert_eq!(coerce_number(&Value::Null), Some(0.0));
        assert_eq!(coerce_number(&json!("abc")), None);
        assert_eq!(coerce_number(&json!("inf")), None);
        assert_eq!(coerce_number(&json!([1])), None);
        assert_eq!(coerce_number(&json!({"n": 1})), None);
    }

    #[test]
    fn test_missing_fields_read_as_zero() {
        let event = TelemetryEvent::new(0.0, EventKind::RunTests);
        assert_eq!(
            event.signal(),
            Signal::RunTests {
                pass_count: Some(0.0),
                total_tests: Some(0.0)
            }
        );
    }

    #[test]
    fn test_malformed_fields_read_as_absent() {
        let event = TelemetryEvent::new(0.0, EventKind::IdleHeartbeat)
            .with_payload("idle_seconds_since_last_activity", "a while");
        assert_eq!(event.signal(), Signal::IdleHeartbeat { idle_seconds: None });
        assert_eq!(event.signal().reported_idle_seconds(), 0.0);
    }

    #[test]
    fn test_only_heartbeats_report_idle() {
        assert_eq!(
            TelemetryEvent::idle_heartbeat(0.0, 42.0)
                .signal()
                .reported_idle_seconds(),
            42.0
        );
        assert_eq!(
            TelemetryEvent::edit(0.0, 500).signal().reported_idle_seconds(),
            0.0
        );
    }

    #[test]
    fn test_json_number_prefers_integers() {
        assert_eq!(json_number(60.0), json!(60));
        assert_eq!(json_number(0.5), json!(0.5));
        assert_eq!(json_number(f64::NAN), Value::Null);
    }

    #[test]
    fn test_serialize_uses_wire_names() {
        let event = TelemetryEvent::run_tests(1000.0, 1, 5).with_duration_ms(1200.0);
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "run_tests");
        assert_eq!(value["payload"]["total_tests"], 5);
        assert_eq!(value["payload"]["duration_ms"], 1200);
    }
}
