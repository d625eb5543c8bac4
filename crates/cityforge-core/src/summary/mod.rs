//! Debate summarizer: condenses a project's narration log into structured
//! key arguments, agreements, disagreements, and a conclusion.
//!
//! Same tolerant JSON extraction as the plan parser. Degrades instead of
//! failing: an empty log short-circuits without touching the backend, and
//! an unparseable response yields a fixed empty shape.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use cityforge_db::store::ProjectStore;

use crate::llm::{ChatMessage, CompletionClient};
use crate::plan::parser::extract_json_object;
use crate::plan::prompt;

/// Conclusion used when the project has no narration yet.
pub const EMPTY_LOG_CONCLUSION: &str = "No debate data available yet.";

/// Conclusion used when the model's response cannot be parsed.
pub const PARSE_FAILURE_CONCLUSION: &str = "Failed to generate summary.";

/// One role's main point in the debate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyArgument {
    #[serde(rename = "llm")]
    pub speaker: String,
    pub argument: String,
}

/// Structured summary of a project's narration log.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DebateSummary {
    pub key_arguments: Vec<KeyArgument>,
    pub agreements: Vec<String>,
    pub disagreements: Vec<String>,
    pub conclusion: String,
}

impl DebateSummary {
    fn empty_with(conclusion: &str) -> Self {
        Self {
            conclusion: conclusion.to_string(),
            ..Self::default()
        }
    }
}

/// Summarize a project's debate.
///
/// Errors only on a generative-backend transport failure; storage and
/// parse problems degrade to fixed shapes.
pub async fn summarize_debate(
    store: &dyn ProjectStore,
    llm: &dyn CompletionClient,
    project_id: i64,
) -> Result<DebateSummary> {
    // Read path: degrade to empty on storage failure.
    let mut logs = match store.list_logs(project_id).await {
        Ok(logs) => logs,
        Err(err) => {
            tracing::warn!(project_id, error = %err, "log read failed, treating as empty");
            Vec::new()
        }
    };

    if logs.is_empty() {
        return Ok(DebateSummary::empty_with(EMPTY_LOG_CONCLUSION));
    }

    // The store returns newest-first; the transcript reads in stored order.
    logs.reverse();
    let debate_text = logs
        .iter()
        .map(|log| format!("{} → {}: {}", log.from_agent, log.to_agent, log.message))
        .collect::<Vec<_>>()
        .join("\n");

    let messages = [
        ChatMessage::system(prompt::SUMMARY_SYSTEM),
        ChatMessage::user(prompt::build_summary_prompt(&debate_text)),
    ];
    let raw = llm.complete(&messages).await?;

    let Some(span) = extract_json_object(&raw) else {
        tracing::warn!(project_id, "no JSON in summary response");
        return Ok(DebateSummary::empty_with(PARSE_FAILURE_CONCLUSION));
    };

    match serde_json::from_str::<DebateSummary>(span) {
        Ok(summary) => Ok(summary),
        Err(err) => {
            tracing::warn!(project_id, error = %err, "could not decode summary response");
            Ok(DebateSummary::empty_with(PARSE_FAILURE_CONCLUSION))
        }
    }
}
