use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::AgentError;
use crate::types::{Decision, RenderSnapshot};

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Fixed schema-constraining instruction sent with every request. The loop
/// depends on replies matching one of these two shapes exactly, so this is
/// part of the wire contract, not a tunable.
const SYSTEM_PROMPT: &str = r#"You are an AI agent that helps users navigate web pages to accomplish tasks.
Given a screenshot of a webpage and a user's prompt, you need to either:
1. Determine the next action to take to move closer to the solution, or
2. Provide the solution if it's already visible on the page.

Your response MUST be valid JSON with exactly this structure:
{
  "type": "action" | "solution",
  "data": {
    // If type is "action":
    "action": "click" | "type",
    "target": "exact visible text of the element to act on, prefer unique texts",
    "value": "text to input if action is 'type'",
    "explanation": "brief explanation of why this action is needed"

    // If type is "solution":
    "answer": "the solution to the user's prompt",
    "source": "where on the page the solution was found"
  }
}

Return ONLY the JSON object. No markdown, no commentary."#;

/// Decides the next step from a snapshot of the page.
#[async_trait]
pub trait Oracle: Send {
    async fn decide(
        &self,
        snapshot: &RenderSnapshot,
        prompt: &str,
    ) -> Result<Decision, AgentError>;
}

/// Production oracle client backed by the OpenAI vision endpoint.
pub struct Brain {
    client: Client,
    api_key: String,
    model: String,
}

impl Brain {
    pub fn new() -> Result<Self, AgentError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| AgentError::Config("OPENAI_API_KEY not set in environment".into()))?;
        let model =
            std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self {
            client: Client::new(),
            api_key,
            model,
        })
    }
}

#[async_trait]
impl Oracle for Brain {
    async fn decide(
        &self,
        snapshot: &RenderSnapshot,
        prompt: &str,
    ) -> Result<Decision, AgentError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": prompt },
                        {
                            "type": "image_url",
                            "image_url": { "url": snapshot.as_data_uri() }
                        }
                    ]
                }
            ],
            "max_tokens": 1000,
            "response_format": { "type": "json_object" },
        });

        let response = self
            .client
            .post(COMPLETIONS_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::OracleRequest(e.to_string()))?;

        let status = response.status();
        let envelope: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AgentError::OracleRequest(e.to_string()))?;

        if !status.is_success() {
            let message = envelope["error"]["message"]
                .as_str()
                .unwrap_or("unknown API error");
            warn!(%status, message, "oracle returned an error");
            return Err(AgentError::OracleRequest(format!("{status}: {message}")));
        }

        let content = envelope["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                AgentError::OracleRequest(format!("no content in reply: {envelope}"))
            })?;

        debug!(content, "oracle replied");
        parse_decision(content)
    }
}

/// Strict parse of the oracle's reply into the decision tagged union.
pub fn parse_decision(content: &str) -> Result<Decision, AgentError> {
    // Strip markdown fences the model sometimes wraps JSON in.
    let cleaned = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    serde_json::from_str(cleaned).map_err(|e| AgentError::DecisionParse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActionKind, Decision};

    #[test]
    fn parses_action_decision() {
        let decision = parse_decision(
            r#"{"type":"action","data":{"action":"click","target":"Search","explanation":"submit the query"}}"#,
        )
        .unwrap();

        match decision {
            Decision::Action(a) => {
                assert_eq!(a.action, ActionKind::Click);
                assert_eq!(a.target, "Search");
                assert_eq!(a.value, None);
            }
            other => panic!("expected action, got {other:?}"),
        }
    }

    #[test]
    fn parses_solution_decision() {
        let decision = parse_decision(
            r#"{"type":"solution","data":{"answer":"42","source":"footer"}}"#,
        )
        .unwrap();

        assert_eq!(
            decision,
            Decision::Solution(crate::types::Solution {
                answer: "42".into(),
                source: "footer".into(),
            })
        );
    }

    #[test]
    fn strips_markdown_fences() {
        let decision = parse_decision(
            "```json\n{\"type\":\"solution\",\"data\":{\"answer\":\"cats\",\"source\":\"results\"}}\n```",
        )
        .unwrap();
        assert!(matches!(decision, Decision::Solution(_)));
    }

    #[test]
    fn rejects_unknown_tag() {
        let err = parse_decision(r#"{"type":"guess","data":{"answer":"?"}}"#).unwrap_err();
        assert!(matches!(err, AgentError::DecisionParse(_)));
    }

    #[test]
    fn rejects_payload_inconsistent_with_tag() {
        // Solution payload under an action tag must not be forwarded.
        let err = parse_decision(
            r#"{"type":"action","data":{"answer":"42","source":"footer"}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, AgentError::DecisionParse(_)));

        let err = parse_decision(
            r#"{"type":"solution","data":{"answer":"42","source":"footer","action":"click"}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, AgentError::DecisionParse(_)));
    }

    #[test]
    fn rejects_unknown_action_kind() {
        let err = parse_decision(
            r#"{"type":"action","data":{"action":"scroll","target":"Footer"}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, AgentError::DecisionParse(_)));
    }

    #[test]
    fn rejects_invalid_json() {
        let err = parse_decision("the answer is probably 42").unwrap_err();
        assert!(matches!(err, AgentError::DecisionParse(_)));
    }
}
