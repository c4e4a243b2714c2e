use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::error::GatewayError;
use super::http::{build_client, read_json};
use crate::config::LlmGatewayConfig;

const ANALYSIS_SYSTEM_PROMPT: &str = "You are a headache-medicine assistant reviewing a patient's migraine diary. \
Respond with a single JSON object with the keys summary (string), patterns (array of strings), \
triggers (array of strings), recommendations (array of strings), and questionsForDoctor \
(array of strings). Do not diagnose; suggest topics to raise with a clinician.";

const APPEAL_SYSTEM_PROMPT: &str = "You draft prior-authorization appeal letters for migraine \
medications on behalf of patients. Write a formal, concise letter in plain text addressed to the \
insurer's appeals department, citing the patient's history and medical necessity. Leave \
placeholders in square brackets for names, member IDs, and signatures.";

/// Sends one system and one user message, returning the assistant's text.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, GatewayError>;
}

/// Chat completions against any OpenAI-compatible endpoint.
pub struct OpenAiCompatibleClient {
    client: reqwest::Client,
    config: LlmGatewayConfig,
}

impl OpenAiCompatibleClient {
    pub fn new(config: &LlmGatewayConfig, timeout: Duration) -> Result<Self, GatewayError> {
        Ok(Self {
            client: build_client(timeout)?,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl ChatGateway for OpenAiCompatibleClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, GatewayError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(GatewayError::NotConfigured("LLM gateway API key"))?;

        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ],
            "temperature": 0.3
        });
        debug!(model = %self.config.model, "sending chat completion");
        let response = self
            .client
            .post(format!(
                "{}/chat/completions",
                self.config.base_url.trim_end_matches('/')
            ))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        completion_text(&read_json(response).await?)
    }
}

pub(crate) fn completion_text(payload: &Value) -> Result<String, GatewayError> {
    payload
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| GatewayError::Decode("completion has no message content".to_string()))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default)]
    pub entries: Vec<Value>,
    #[serde(default)]
    pub medications: Vec<Value>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub patient_notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisReport {
    pub summary: String,
    pub patterns: Vec<String>,
    pub triggers: Vec<String>,
    pub recommendations: Vec<String>,
    pub questions_for_doctor: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppealLetterRequest {
    pub drug_name: String,
    pub insurance_plan_type: String,
    #[serde(default)]
    pub denial_reason: Option<String>,
    pub patient_summary: String,
}

/// Removes a surrounding Markdown code fence, with or without a language tag.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

impl AnalysisReport {
    /// True when no known field carried any content.
    pub fn is_empty(&self) -> bool {
        self.summary.trim().is_empty()
            && self.patterns.is_empty()
            && self.triggers.is_empty()
            && self.recommendations.is_empty()
            && self.questions_for_doctor.is_empty()
    }
}

/// Malformed output, including JSON without any report fields, falls back to the raw text as
/// the summary.
pub fn parse_analysis(raw: &str) -> AnalysisReport {
    let cleaned = strip_code_fences(raw);
    match serde_json::from_str::<AnalysisReport>(cleaned) {
        Ok(report) if !report.is_empty() => report,
        Ok(_) => {
            warn!("analysis response had no report fields");
            raw_summary(raw)
        }
        Err(err) => {
            warn!(error = %err, "analysis response was not valid JSON");
            raw_summary(raw)
        }
    }
}

fn raw_summary(raw: &str) -> AnalysisReport {
    AnalysisReport {
        summary: raw.trim().to_string(),
        ..AnalysisReport::default()
    }
}

pub(crate) fn analysis_prompt(request: &AnalysisRequest) -> Result<String, GatewayError> {
    if request.entries.is_empty() {
        return Err(GatewayError::Invalid(
            "at least one diary entry is required".to_string(),
        ));
    }
    let entries = serde_json::to_string_pretty(&request.entries)
        .map_err(|err| GatewayError::Invalid(err.to_string()))?;
    let medications = serde_json::to_string_pretty(&request.medications)
        .map_err(|err| GatewayError::Invalid(err.to_string()))?;

    let mut prompt = format!(
        "Diary period: {} to {}\n\nEntries ({}):\n{entries}\n\nCurrent medications:\n{medications}\n",
        request.date_from.as_deref().unwrap_or("unspecified"),
        request.date_to.as_deref().unwrap_or("unspecified"),
        request.entries.len(),
    );
    if let Some(notes) = request
        .patient_notes
        .as_deref()
        .map(str::trim)
        .filter(|notes| !notes.is_empty())
    {
        prompt.push_str(&format!("\nPatient notes:\n{notes}\n"));
    }
    Ok(prompt)
}

pub(crate) fn appeal_prompt(request: &AppealLetterRequest) -> Result<String, GatewayError> {
    let drug = request.drug_name.trim();
    let summary = request.patient_summary.trim();
    if drug.is_empty() || summary.is_empty() {
        return Err(GatewayError::Invalid(
            "drugName and patientSummary are required".to_string(),
        ));
    }
    let denial = request
        .denial_reason
        .as_deref()
        .map(str::trim)
        .filter(|reason| !reason.is_empty())
        .unwrap_or("not stated");
    Ok(format!(
        "Medication: {drug}\nPlan type: {}\nDenial reason: {denial}\n\nPatient summary:\n{summary}\n",
        request.insurance_plan_type.trim(),
    ))
}

/// Prompting and response handling on top of a chat gateway.
#[derive(Clone)]
pub struct AiAssistant {
    gateway: Arc<dyn ChatGateway>,
}

impl AiAssistant {
    pub fn new(gateway: Arc<dyn ChatGateway>) -> Self {
        Self { gateway }
    }

    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport, GatewayError> {
        let prompt = analysis_prompt(request)?;
        let raw = self.gateway.complete(ANALYSIS_SYSTEM_PROMPT, &prompt).await?;
        Ok(parse_analysis(&raw))
    }

    pub async fn appeal_letter(&self, request: &AppealLetterRequest) -> Result<String, GatewayError> {
        let prompt = appeal_prompt(request)?;
        let letter = self.gateway.complete(APPEAL_SYSTEM_PROMPT, &prompt).await?;
        Ok(strip_code_fences(&letter).to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct ScriptedGateway {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChatGateway for ScriptedGateway {
        async fn complete(&self, _system: &str, user: &str) -> Result<String, GatewayError> {
            self.prompts
                .lock()
                .expect("prompt log")
                .push(user.to_string());
            Ok(self.reply.clone())
        }
    }

    fn assistant(reply: &str) -> (AiAssistant, Arc<ScriptedGateway>) {
        let gateway = Arc::new(ScriptedGateway {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        });
        (AiAssistant::new(gateway.clone()), gateway)
    }

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            entries: vec![json!({ "startedAt": "2025-06-02T07:30:00", "severity": 7 })],
            medications: vec![json!("Topiramate 50 mg")],
            date_from: Some("2025-06-01".to_string()),
            date_to: Some("2025-06-30".to_string()),
            patient_notes: Some("Worse around my period.".to_string()),
        }
    }

    #[test]
    fn code_fences_are_stripped() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\nplain\n```  "), "plain");
        assert_eq!(strip_code_fences("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn completion_text_reads_first_choice() {
        let payload = json!({ "choices": [{ "message": { "role": "assistant", "content": "hi" } }] });
        assert_eq!(completion_text(&payload).expect("content"), "hi");
        assert!(matches!(
            completion_text(&json!({ "choices": [] })),
            Err(GatewayError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn analysis_parses_fenced_json() {
        let reply = "```json\n{\"summary\":\"Mostly morning attacks\",\"patterns\":[\"Mornings\"],\"triggers\":[\"Sleep loss\"],\"recommendations\":[],\"questionsForDoctor\":[\"Is a preventive right for me?\"]}\n```";
        let (assistant, gateway) = assistant(reply);
        let report = assistant.analyze(&request()).await.expect("analysis");
        assert_eq!(report.summary, "Mostly morning attacks");
        assert_eq!(report.questions_for_doctor.len(), 1);

        let prompts = gateway.prompts.lock().expect("prompt log");
        assert!(prompts[0].contains("2025-06-01 to 2025-06-30"));
        assert!(prompts[0].contains("Worse around my period."));
    }

    #[tokio::test]
    async fn malformed_analysis_falls_back_to_raw_text() {
        let (assistant, _) = assistant("  I could not produce JSON today. ");
        let report = assistant.analyze(&request()).await.expect("analysis");
        assert_eq!(report.summary, "I could not produce JSON today.");
        assert!(report.patterns.is_empty());
        assert!(report.questions_for_doctor.is_empty());
    }

    #[test]
    fn json_without_report_fields_falls_back_to_raw_text() {
        let raw = "{\"analysis\": \"Attacks cluster on Mondays.\"}";
        let report = parse_analysis(raw);
        assert_eq!(report.summary, raw);
        assert!(report.patterns.is_empty());

        assert_eq!(parse_analysis("```json\n{}\n```").summary, "```json\n{}\n```");

        let partial = parse_analysis("{\"patterns\": [\"Weekend lie-ins\"]}");
        assert_eq!(partial.summary, "");
        assert_eq!(partial.patterns, vec!["Weekend lie-ins".to_string()]);
    }

    #[tokio::test]
    async fn analysis_needs_entries() {
        let (assistant, _) = assistant("{}");
        let empty = AnalysisRequest::default();
        assert!(matches!(
            assistant.analyze(&empty).await,
            Err(GatewayError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn appeal_letter_includes_denial_context() {
        let (assistant, gateway) = assistant("Dear Appeals Department,\n...");
        let letter = assistant
            .appeal_letter(&AppealLetterRequest {
                drug_name: "Aimovig".to_string(),
                insurance_plan_type: "commercial".to_string(),
                denial_reason: None,
                patient_summary: "Failed topiramate and propranolol.".to_string(),
            })
            .await
            .expect("letter");
        assert!(letter.starts_with("Dear Appeals Department"));
        let prompts = gateway.prompts.lock().expect("prompt log");
        assert!(prompts[0].contains("Denial reason: not stated"));
    }
}
