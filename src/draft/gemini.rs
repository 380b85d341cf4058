use crate::data::app_settings::DraftSettings;
use crate::draft::{Draft, DraftError, DraftGenerator, DraftInput};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Asks a Gemini model for the draft and expects a JSON object with
/// `subject` and `body` back.
pub struct GeminiDraftGenerator {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiDraftGenerator {
    pub fn new(
        endpoint: &str,
        model: &str,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, DraftError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DraftError::Transport(e.to_string()))?;
        Ok(GeminiDraftGenerator {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        })
    }

    /// Reads the key from the environment variable named in the settings.
    pub fn from_settings(settings: &DraftSettings) -> Result<Self, DraftError> {
        let api_key = std::env::var(&settings.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| DraftError::MissingApiKey(settings.api_key_env.clone()))?;
        Self::new(
            &settings.endpoint,
            &settings.model,
            api_key,
            Duration::from_secs(settings.timeout_secs),
        )
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

impl DraftGenerator for GeminiDraftGenerator {
    fn generate(&self, input: &DraftInput) -> Result<Draft, DraftError> {
        input.require_complete()?;

        let body = json!({
            "contents": [{ "parts": [{ "text": build_prompt(input) }] }],
            "generationConfig": { "responseMimeType": "application/json" },
        });

        tracing::debug!(model = %self.model, "requesting draft");
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let text = response.text().map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(DraftError::Status {
                status: status.as_u16(),
                message: text.chars().take(200).collect(),
            });
        }
        parse_response(&text)
    }
}

fn map_reqwest_error(e: reqwest::Error) -> DraftError {
    if e.is_timeout() {
        DraftError::Timeout
    } else {
        DraftError::Transport(e.to_string())
    }
}

/// Short bullet-point email in Traditional Chinese, returned as JSON.
pub(crate) fn build_prompt(input: &DraftInput) -> String {
    format!(
        "You are writing a leave request email for {user} to their manager.\n\
         \n\
         Format requirements:\n\
         1. Language: Traditional Chinese (繁體中文) mixed with English for specific terms if needed.\n\
         2. Tone: casual but polite, direct, bullet points (條列式). Not too formal.\n\
         3. Content must include:\n\
         \x20  - Leave Type (假別)\n\
         \x20  - Dates (日期) - list all dates: {dates}\n\
         \x20  - Duration/Time (時間)\n\
         \n\
         Data:\n\
         - Type: {kind}\n\
         - Dates: {dates}\n\
         - Time: {time}\n\
         - Remaining annual leave: {remaining} days\n\
         \n\
         Output strictly in JSON format with two keys: \"subject\" and \"body\".\n\
         \n\
         Example body format:\n\
         Hi [Manager Name],\n\
         \n\
         {user} 請假申請：\n\
         - 項目：...\n\
         - 日期：...\n\
         - 時間：...\n\
         \n\
         Thanks,\n\
         {user}\n",
        user = input.user_name,
        dates = input.dates_display(),
        kind = input.leave_type_label(),
        time = input.time_description(),
        remaining = crate::data::labels::format_days(input.remaining_annual_days),
    )
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

/// Pulls the first candidate's text out of a `generateContent` response and
/// parses it as a draft.
pub(crate) fn parse_response(raw: &str) -> Result<Draft, DraftError> {
    let response: GenerateResponse =
        serde_json::from_str(raw).map_err(|e| DraftError::Unparsable(e.to_string()))?;
    let text = response
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .find_map(|p| p.text)
        .filter(|t| !t.trim().is_empty())
        .ok_or(DraftError::EmptyResponse)?;
    parse_draft_text(&text)
}

/// Accepts bare JSON or JSON wrapped in a ``` fence.
pub(crate) fn parse_draft_text(text: &str) -> Result<Draft, DraftError> {
    let trimmed = text.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();
    serde_json::from_str::<Draft>(unfenced).map_err(|e| DraftError::Unparsable(e.to_string()))
}
