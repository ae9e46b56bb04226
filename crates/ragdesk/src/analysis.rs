//! Per-document analysis: summary, action items, and role assignment.
//!
//! Runs once per ingested document over an excerpt (the first few
//! chunks). The three generation calls are independent and issued
//! concurrently, joined before the ingestion proceeds.

use serde::{Deserialize, Serialize};

use ragdesk_core::error::Result;

use crate::model::ModelClient;

/// How many leading chunks feed the analysis excerpt.
pub const ANALYSIS_CHUNKS: usize = 4;

/// Roles a document may be routed to.
const ROLES: &str = "[Finance Manager, Customer Manager, Safety Manager, HR Coordinator, \
                     Legal Counsel, Rolling Stock Engineer]";

/// Analysis result returned from ingestion and pushed to webhooks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub summary: String,
    pub action_items: Vec<String>,
    pub assigned_role: String,
}

/// Run the three analysis calls concurrently over `excerpt`.
pub async fn analyze(model: &dyn ModelClient, excerpt: &str) -> Result<Analysis> {
    let summary_prompt = format!(
        "Provide a concise, professional summary (around 100-150 words) of the following \
         document content:\n\n{}",
        excerpt
    );
    let actions_prompt = format!(
        "Extract the 3 to 5 most important, actionable tasks from the following document. \
         Present them as a bulleted list. If no clear action items exist, respond with \
         'None'.\n\n{}",
        excerpt
    );
    let role_prompt = format!(
        "Read the document and determine the single most relevant employee role to handle \
         it. Choose ONLY from this list: {}. Respond with ONLY the role name. \
         Document:\n\n{}",
        ROLES, excerpt
    );

    let (summary, actions_raw, role_raw) = tokio::try_join!(
        model.generate(&summary_prompt),
        model.generate(&actions_prompt),
        model.generate(&role_prompt),
    )?;

    Ok(Analysis {
        summary: summary.trim().to_string(),
        action_items: parse_action_items(&actions_raw),
        assigned_role: role_raw.trim().trim_matches(&['\'', '"'][..]).to_string(),
    })
}

/// Clean the model's bulleted list into plain action-item strings,
/// dropping blank lines and "none" responses.
fn parse_action_items(raw: &str) -> Vec<String> {
    raw.lines()
        .map(|line| line.trim().trim_start_matches(&['-', '*', ' '][..]).trim())
        .filter(|line| !line.is_empty() && !line.to_lowercase().contains("none"))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bulleted_list() {
        let raw = "- Review the refund policy\n* Notify the finance team\n  - File the report\n";
        assert_eq!(
            parse_action_items(raw),
            vec![
                "Review the refund policy",
                "Notify the finance team",
                "File the report"
            ]
        );
    }

    #[test]
    fn filters_none_and_blank_lines() {
        assert!(parse_action_items("None").is_empty());
        assert!(parse_action_items("  \n- none identified\n\n").is_empty());
    }

    #[test]
    fn plain_lines_pass_through() {
        assert_eq!(parse_action_items("Ship the release"), vec!["Ship the release"]);
    }
}
