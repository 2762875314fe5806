use serde::{Deserialize, Serialize};

use super::project::Project;
use crate::utils::validate_utils::deserialize_whole_number;

/// Project suggestion produced by the AI provider for one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiMatch {
    pub project_id: String,
    pub project_name: String,
    pub reasoning: String,
    pub suggested_task: String,
    #[serde(deserialize_with = "deserialize_whole_number")]
    pub estimated_reward: u64,
}

impl AiMatch {
    /// Decodes a completion into a match. Every field must be present with the right
    /// type and `projectId` must name one of `candidates`.
    pub fn decode(content: &str, candidates: &[Project]) -> Result<Self, String> {
        let decoded: AiMatch = serde_json::from_str(content.trim())
            .map_err(|e| format!("match decode failed: {e}"))?;

        let empty_field = [
            ("projectId", &decoded.project_id),
            ("projectName", &decoded.project_name),
            ("reasoning", &decoded.reasoning),
            ("suggestedTask", &decoded.suggested_task),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty());
        if let Some((name, _)) = empty_field {
            return Err(format!("match field {name} is empty"));
        }

        if !candidates.iter().any(|p| p.id == decoded.project_id) {
            return Err(format!(
                "match projectId {} is not one of the candidate projects",
                decoded.project_id
            ));
        }

        Ok(decoded)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskVerification {
    pub verified: bool,
    pub feedback: String,
}

impl TaskVerification {
    pub fn decode(content: &str) -> Result<Self, String> {
        serde_json::from_str(content.trim()).map_err(|e| format!("verification decode failed: {e}"))
    }
}
