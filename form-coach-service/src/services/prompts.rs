//! Fixed instruction prompts sent to the model.

use crate::models::{MetricName, METRIC_COUNT};
use serde_json::{json, Value};

const ANALYSIS_INSTRUCTIONS: &str = "You are an expert biomechanist and strength and conditioning coach specializing in the bench press. Your task is to analyze the user's bench press video and provide a precise, data-driven assessment.

Instructions:
First, analyze the visual context of the video. Describe the lifter's body position, the environment (e.g., gym, home), and the camera angle. Identify any visual obstructions or poor lighting that might affect the analysis.
Then, perform a biomechanical analysis of the user's form for a barbell bench press.
Do not include any conversational text or summary outside of the final JSON object.
Output only a single JSON object that strictly adheres to the schema provided below.
If a metric is not visible, provide a score of 0 and note N/A for the flaw and recommendation.";

const COACHING_INSTRUCTIONS: &str = "You are a professional strength and conditioning coach with an encouraging and helpful tone. Your job is to analyze raw biomechanical data from a bench press. Based on the JSON data provided below, write a short, one-paragraph coaching summary for the user. Reference their overall score and briefly explain what it means. Do not include any scores in your final output. Then, for each of the 6 metrics in the JSON, provide a short, actionable, and tailored tip that is based on the 'observed_flaw' field. The tips should be encouraging and directly connected to the metric.";

/// JSON schema the analysis prompt asks the model to follow.
pub fn scorecard_schema() -> Value {
    let names: Vec<&str> = MetricName::ALL.iter().map(MetricName::as_str).collect();

    json!({
        "context": {
            "type": "object",
            "description": "A brief analysis of the video's visual context.",
            "properties": {
                "camera_angle": {
                    "type": "string",
                    "description": "The camera's perspective (e.g., side view, front view, etc.)."
                },
                "environment": {
                    "type": "string",
                    "description": "A short description of the environment (e.g., commercial gym, home gym)."
                },
                "visual_issues": {
                    "type": "string",
                    "description": "Any visual issues that might affect the analysis (e.g., poor lighting, obstructions)."
                }
            }
        },
        "overall_score": {
            "type": "integer",
            "description": "A single score out of 100 representing the overall quality of the bench press form. A score below 70 indicates critical errors."
        },
        "metrics": {
            "type": "array",
            "description": format!("An array of {} objects, each representing a key metric of bench press form.", METRIC_COUNT),
            "items": {
                "type": "object",
                "properties": {
                    "name": { "type": "string", "enum": names },
                    "score": {
                        "type": "integer",
                        "description": "A score from 0 to 100 for this specific metric."
                    },
                    "observed_flaw": {
                        "type": "string",
                        "description": "A brief, specific description of the form flaw observed in the video for this metric. If there is no flaw, describe the good form."
                    },
                    "recommendation": {
                        "type": "string",
                        "description": "A concise, actionable coaching tip to improve this metric, based directly on the observed flaw."
                    }
                },
                "required": ["name", "score", "observed_flaw", "recommendation"]
            }
        }
    })
}

/// Master prompt for form analysis, without the video reference.
pub fn analysis_master_prompt() -> String {
    format!(
        "{}\n\nJSON Schema:\n{:#}",
        ANALYSIS_INSTRUCTIONS,
        scorecard_schema()
    )
}

/// Full form-analysis prompt for one video.
pub fn analysis_prompt(video_url: &str) -> String {
    format!(
        "{}\n\nPlease analyze this video: {}",
        analysis_master_prompt(),
        video_url
    )
}

/// Full coaching prompt; `json_data` is embedded pretty-printed with
/// two-space indentation.
pub fn coaching_prompt(json_data: &Value) -> String {
    format!("{}\n\nJSON Data:\n{:#}", COACHING_INSTRUCTIONS, json_data)
}
