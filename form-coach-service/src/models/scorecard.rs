//! Scorecard model and the structural contract AI output must satisfy
//! before it is persisted.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Number of metrics every scorecard must carry.
pub const METRIC_COUNT: usize = 6;

/// Fields each metric entry must contain (values may be falsy).
pub const REQUIRED_METRIC_FIELDS: [&str; 4] = ["name", "score", "observed_flaw", "recommendation"];

/// Sentinel used for flaw/recommendation when a metric is not visible.
pub const NOT_OBSERVABLE: &str = "N/A";

/// The six bench-press metrics, in prompt order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricName {
    #[serde(rename = "Scapular Retraction")]
    ScapularRetraction,
    #[serde(rename = "Bar Path")]
    BarPath,
    #[serde(rename = "Elbow Position")]
    ElbowPosition,
    #[serde(rename = "Range of Motion")]
    RangeOfMotion,
    #[serde(rename = "Wrist Alignment")]
    WristAlignment,
    #[serde(rename = "Leg Drive")]
    LegDrive,
}

impl MetricName {
    pub const ALL: [MetricName; METRIC_COUNT] = [
        MetricName::ScapularRetraction,
        MetricName::BarPath,
        MetricName::ElbowPosition,
        MetricName::RangeOfMotion,
        MetricName::WristAlignment,
        MetricName::LegDrive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ScapularRetraction => "Scapular Retraction",
            Self::BarPath => "Bar Path",
            Self::ElbowPosition => "Elbow Position",
            Self::RangeOfMotion => "Range of Motion",
            Self::WristAlignment => "Wrist Alignment",
            Self::LegDrive => "Leg Drive",
        }
    }
}

impl std::fmt::Display for MetricName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Visual context the model reports before scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanContext {
    pub camera_angle: String,
    pub environment: String,
    pub visual_issues: String,
}

/// One scored sub-assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: MetricName,
    /// 0-100; 0 means the metric was not observable.
    pub score: u8,
    pub observed_flaw: String,
    pub recommendation: String,
}

impl Metric {
    pub fn is_observable(&self) -> bool {
        self.score != 0 && self.observed_flaw != NOT_OBSERVABLE
    }
}

/// A full biomechanical assessment as produced by the form-analysis prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    pub context: ScanContext,
    pub overall_score: u8,
    pub metrics: Vec<Metric>,
}

impl Scorecard {
    /// Read a stored `analysis_data` value into the typed form.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Scorecard::deserialize(value)
    }
}

/// Why a parsed AI response was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScorecardError {
    #[error("Invalid analysis data structure from AI: expected a JSON object")]
    NotAnObject,

    #[error("Invalid analysis data structure from AI: missing '{0}'")]
    MissingField(&'static str),

    #[error("Invalid metrics array structure from AI: expected 6 metrics, got {0}")]
    WrongMetricCount(String),

    #[error("Missing required field '{0}' in metrics")]
    MissingMetricField(&'static str),
}

impl ScorecardError {
    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NotAnObject => "not_an_object",
            Self::MissingField(_) => "missing_field",
            Self::WrongMetricCount(_) => "metric_count",
            Self::MissingMetricField(_) => "missing_metric_field",
        }
    }
}

/// JSON truthiness: `null`, `false`, `0`, and `""` are falsy; everything
/// else (including empty arrays and objects) is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Check that a parsed AI response has the shape required for persistence.
///
/// Checks presence only: metric names, score ranges, and context fields are
/// not inspected. `overall_score: 0` is rejected as missing.
pub fn validate_scorecard(value: &Value) -> Result<(), ScorecardError> {
    let Some(root) = value.as_object() else {
        return Err(ScorecardError::NotAnObject);
    };

    if !root.get("overall_score").is_some_and(is_truthy) {
        return Err(ScorecardError::MissingField("overall_score"));
    }

    let metrics = match root.get("metrics") {
        Some(m) if !m.is_null() => m,
        _ => return Err(ScorecardError::MissingField("metrics")),
    };

    if !root.get("context").is_some_and(Value::is_object) {
        return Err(ScorecardError::MissingField("context"));
    }

    let metrics = match metrics.as_array() {
        Some(items) if items.len() == METRIC_COUNT => items,
        Some(items) => return Err(ScorecardError::WrongMetricCount(items.len().to_string())),
        None => {
            return Err(ScorecardError::WrongMetricCount(
                json_type_name(metrics).to_string(),
            ))
        }
    };

    for metric in metrics {
        for field in REQUIRED_METRIC_FIELDS {
            let present = metric
                .as_object()
                .is_some_and(|entry| entry.contains_key(field));
            if !present {
                return Err(ScorecardError::MissingMetricField(field));
            }
        }
    }

    Ok(())
}
