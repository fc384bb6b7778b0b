//! Model-backed operations: routing, extraction, summarization
//!
//! The instruction text for every model call lives here, next to the parsers
//! for the answers, so the workflow nodes stay free of prompt plumbing.

use tokio_util::sync::CancellationToken;

use super::Model;
use crate::error::ModelError;
use crate::store::csv;
use crate::workflow::state::AgentKind;

const ROUTING_SYSTEM: &str = r#"You are a task routing assistant. Analyze the user query and decide which agents to invoke.

Available agents:
- compliance: For technical compliance items, audits, certificates, compliance requirements
- issue: For issue tracking, bugs, features, tasks, documentation
- scan: For security scan results, vulnerabilities, CVEs, SAST/DAST findings

Respond with ONLY a JSON array of agent names. Examples:
- ["compliance"] - for compliance queries
- ["issue"] - for issue tracking queries
- ["scan"] - for security scan/vulnerability queries
- ["compliance", "issue", "scan"] - for queries that need all

Do not include any other text, only the JSON array."#;

const SUMMARY_SYSTEM: &str = r#"You are a helpful assistant. Summarize the collected task items in a concise, user-friendly format.

Include:
- Total count of items found
- Brief categorization by type
- Any urgent items (upcoming due dates or critical status)
- Key highlights

Be concise but informative. Use markdown formatting."#;

/// Ask the model which agents a query needs.
pub async fn route_query(
    model: &dyn Model,
    query: &str,
    cancel: &CancellationToken,
) -> Result<Vec<AgentKind>, ModelError> {
    let answer = model.complete(ROUTING_SYSTEM, query, cancel).await?;
    parse_decision(&answer)
}

/// Parse a routing answer into agent kinds.
///
/// The answer must be a JSON array of strings (code fences tolerated). Tags
/// outside the closed set are dropped with a warning; duplicates keep their
/// first position. An empty result is valid here - the planner treats it as
/// "no usable decision" and falls back to keywords.
pub fn parse_decision(text: &str) -> Result<Vec<AgentKind>, ModelError> {
    let cleaned = strip_fences(text);
    let tags: Vec<String> = serde_json::from_str(&cleaned).map_err(|e| {
        ModelError::invalid_response(format!("routing answer is not a JSON string array: {}", e))
    })?;

    let mut kinds = Vec::new();
    for tag in &tags {
        match AgentKind::parse_tag(tag) {
            Some(kind) => {
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
            None => log::warn!("Dropping unknown agent tag in routing answer: {:?}", tag),
        }
    }
    Ok(kinds)
}

/// Ask the model to extract task rows from a raw HTML document.
///
/// Returns the raw row text; the caller parses it with the csv codec.
pub async fn extract_rows(
    model: &dyn Model,
    document: &str,
    kind: AgentKind,
    app_id: &str,
    cancel: &CancellationToken,
) -> Result<String, ModelError> {
    let system = extraction_instructions(app_id);
    let user = format!("Extract CSV from this {} HTML:\n\n{}", kind.tag(), document);
    let answer = model.complete(&system, &user, cancel).await?;
    Ok(answer.trim().to_string())
}

/// Instructions pinning the extraction output to the store's column order.
pub fn extraction_instructions(app_id: &str) -> String {
    format!(
        "You are a data extraction assistant. Extract task items from the HTML table and convert them to CSV rows.\n\n\
         Required CSV columns: {}\n\n\
         Rules:\n\
         - Use \"{}\" for app_id\n\
         - Extract values from the HTML table rows\n\
         - Leave columns empty if data is not available in the HTML\n\
         - Do NOT include the header row in output, just the data rows\n\
         - Output ONLY the CSV data, no explanations",
        csv::HEADER, app_id
    )
}

/// Ask the model for the final narrative over the per-agent reports.
pub async fn summarize(
    model: &dyn Model,
    query: &str,
    compliance: Option<&str>,
    issue: Option<&str>,
    scan: Option<&str>,
    cancel: &CancellationToken,
) -> Result<String, ModelError> {
    let content = build_summary_content(query, compliance, issue, scan);
    model.complete(SUMMARY_SYSTEM, &content, cancel).await
}

/// Assemble the summarizer's user message from the per-agent reports.
pub fn build_summary_content(
    query: &str,
    compliance: Option<&str>,
    issue: Option<&str>,
    scan: Option<&str>,
) -> String {
    format!(
        "User Query: {}\n\n\
         Compliance Results:\n{}\n\n\
         Issue Results:\n{}\n\n\
         Scan Results:\n{}\n",
        query,
        compliance.unwrap_or("No compliance items found"),
        issue.unwrap_or("No issue items found"),
        scan.unwrap_or("No scan issues found"),
    )
}

fn strip_fences(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
