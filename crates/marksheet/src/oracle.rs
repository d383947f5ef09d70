//! Field extraction by a language model ("oracle").
//!
//! The oracle is a fallible structured-extraction call: a prompt goes in, a
//! [`FieldSet`] or an [`OracleError`] comes out. The HTTP call
//! ([`OllamaOracle::generate`]) and the scan for a JSON object in the
//! model's free text ([`parse_field_set`]) are separate steps with separate
//! failure modes.

use std::time::Duration;

use marksheet_core::{FieldSet, MarksValue};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default Ollama generate endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/generate";
/// Default model name.
pub const DEFAULT_MODEL: &str = "llama3";
/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const FIELD_LIST: &str = "You are an assistant that extracts student result details from text.
Extract the following fields only:
- Name
- Registration No
- Total Marks Obtained
- SGPA
- Grade
";

const NAME_RULES: &str = "Important:
- If a \"Student Name\" (or similar student name label) is present in the page, that must be used for the Name.
- If it is NOT present, do NOT use \"Father Name\" or \"Mother Name\" as the student Name.
- ";

const JSON_FORMAT: &str = "Return output as JSON ONLY in this format:
{
    \"Name\": \"\",
    \"Registration\": \"\",
    \"TotalMarks\": \"\",
    \"SGPA\": \"\",
    \"Grade\": \"\"
}
";

/// Sample text sent by [`probe`].
pub const PROBE_SAMPLE: &str =
    "Student Name: John Doe, Registration: 12345, Total Marks: 85, SGPA: 8.5, Grade: A";

/// Why an oracle call produced no fields.
#[derive(Debug, Error)]
pub enum OracleError {
    /// Connection failure, timeout, or an unreadable body.
    #[error("oracle request failed: {0}")]
    Transport(String),

    #[error("oracle returned status {code}: {body}")]
    Status { code: u16, body: String },

    /// The envelope had no `response` text.
    #[error("oracle reply has no response text")]
    MissingResponse,

    #[error("no JSON object in oracle response")]
    NoJsonObject,

    #[error("malformed JSON in oracle response: {0}")]
    MalformedJson(String),

    /// Rule-based-only run.
    #[error("oracle disabled")]
    Disabled,
}

impl From<reqwest::Error> for OracleError {
    fn from(err: reqwest::Error) -> Self {
        OracleError::Transport(err.to_string())
    }
}

/// Proposes the five record fields for a prompt.
///
/// Implementations must be shareable across concurrently running tasks.
pub trait FieldOracle: Send + Sync {
    /// # Errors
    ///
    /// Any [`OracleError`]; callers treat every failure as "no fields".
    fn extract_fields(&self, prompt: &str) -> Result<FieldSet, OracleError>;
}

/// Where and how to reach the model service.
#[derive(Debug, Clone, PartialEq)]
pub struct OracleConfig {
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

/// Blocking client for Ollama's `/api/generate`.
#[derive(Debug, Clone)]
pub struct OllamaOracle {
    client: reqwest::blocking::Client,
    config: OracleConfig,
}

impl OllamaOracle {
    /// # Errors
    ///
    /// [`OracleError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: OracleConfig) -> Result<Self, OracleError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    /// Send `prompt` and return the model's raw response text.
    ///
    /// # Errors
    ///
    /// [`OracleError::Transport`], [`OracleError::Status`],
    /// [`OracleError::MalformedJson`] for an unreadable envelope, or
    /// [`OracleError::MissingResponse`].
    pub fn generate(&self, prompt: &str) -> Result<String, OracleError> {
        let body = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
        };
        let resp = self
            .client
            .post(&self.config.endpoint)
            .json(&body)
            .send()?;

        let status = resp.status();
        let text = resp.text()?;
        if !status.is_success() {
            return Err(OracleError::Status {
                code: status.as_u16(),
                body: text,
            });
        }

        let envelope: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| OracleError::MalformedJson(e.to_string()))?;
        envelope.response.ok_or(OracleError::MissingResponse)
    }
}

impl FieldOracle for OllamaOracle {
    fn extract_fields(&self, prompt: &str) -> Result<FieldSet, OracleError> {
        let raw = self.generate(prompt)?;
        parse_field_set(&raw)
    }
}

/// Oracle that never answers; every page uses the rule-based fields only.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledOracle;

impl FieldOracle for DisabledOracle {
    fn extract_fields(&self, _prompt: &str) -> Result<FieldSet, OracleError> {
        Err(OracleError::Disabled)
    }
}

/// Prompt for one page (`page_number` is 1-based).
pub fn page_prompt(page_number: usize, page_text: &str) -> String {
    format!("\n{FIELD_LIST}\n{NAME_RULES}{JSON_FORMAT}\nText (page {page_number}):\n{page_text}\n")
}

/// Prompt used by [`probe`].
pub fn probe_prompt() -> String {
    format!("\n{FIELD_LIST}\n{JSON_FORMAT}\nText: {PROBE_SAMPLE}\n")
}

/// Send the fixed sample through `oracle`.
///
/// # Errors
///
/// Whatever the oracle reports.
pub fn probe(oracle: &dyn FieldOracle) -> Result<FieldSet, OracleError> {
    oracle.extract_fields(&probe_prompt())
}

/// Parse the JSON object embedded in free text.
///
/// The object spans from the first `{` to the last `}`. Keys are `Name`,
/// `Registration`, `TotalMarks`, `SGPA` and `Grade`; strings are kept as-is,
/// numbers become their decimal text, other values count as absent.
///
/// # Errors
///
/// [`OracleError::NoJsonObject`] when there is no brace pair,
/// [`OracleError::MalformedJson`] when the span is not a JSON object.
pub fn parse_field_set(text: &str) -> Result<FieldSet, OracleError> {
    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return Err(OracleError::NoJsonObject);
    };
    if end < start {
        return Err(OracleError::NoJsonObject);
    }

    let value: serde_json::Value = serde_json::from_str(&text[start..=end])
        .map_err(|e| OracleError::MalformedJson(e.to_string()))?;
    let serde_json::Value::Object(map) = value else {
        return Err(OracleError::MalformedJson("expected an object".to_string()));
    };

    Ok(FieldSet {
        name: map.get("Name").and_then(scalar_text),
        registration: map.get("Registration").and_then(scalar_text),
        total_marks: map.get("TotalMarks").and_then(marks_value),
        sgpa: map.get("SGPA").and_then(scalar_text),
        grade: map.get("Grade").and_then(scalar_text),
    })
}

fn scalar_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn marks_value(value: &serde_json::Value) -> Option<MarksValue> {
    match value {
        serde_json::Value::String(s) => Some(MarksValue::Text(s.clone())),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(MarksValue::Integer)
            .or_else(|| n.as_f64().map(MarksValue::Float)),
        _ => None,
    }
}
