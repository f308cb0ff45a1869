pub mod coach_output;
pub mod form_scan;
pub mod record_id;
pub mod scorecard;

pub use coach_output::{CoachOutput, NewCoachOutput, COACH_OUTPUT_TABLE};
pub use form_scan::{FormScan, NewFormScan, FORM_SCANS_TABLE};
pub use record_id::RecordId;
pub use scorecard::{
    is_truthy, validate_scorecard, Metric, MetricName, ScanContext, Scorecard, ScorecardError,
    METRIC_COUNT,
};
