use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("invalid oracle endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("oracle request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("oracle returned an unusable response: {0}")]
    Malformed(String),
}

/// External advisory capability consulted for fuzzy column mapping and
/// per-row value anomalies. Advisory only: callers validate every suggestion
/// before use, and failures degrade to skipped augmentations, never aborts.
pub trait AdvisoryOracle: Send + Sync {
    /// Best-guess mapping from logical field names to actual column names.
    /// Called once per reconciliation with the full field and column sets.
    fn suggest_mapping(
        &self,
        expected_fields: &[String],
        column_names: &[String],
    ) -> Result<BTreeMap<String, String>, OracleError>;

    /// Free-text anomaly findings for one row's field→value subset.
    /// `Ok(None)` means no finding.
    fn find_anomalies(
        &self,
        row_values: &BTreeMap<String, String>,
    ) -> Result<Option<String>, OracleError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Language-model-backed oracle speaking the Ollama chat protocol. Every call
/// carries the client-level timeout; a timed-out or failed call surfaces as
/// `OracleError` and the caller skips that augmentation.
pub struct HttpOracle {
    client: reqwest::blocking::Client,
    chat_url: Url,
    model: String,
}

impl HttpOracle {
    pub fn new(endpoint: &str, model: &str, timeout: Duration) -> Result<Self, OracleError> {
        let base = Url::parse(endpoint)?;
        let chat_url = base.join("api/chat")?;
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            chat_url,
            model: model.to_string(),
        })
    }

    fn chat(&self, prompt: &str) -> Result<String, OracleError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };
        let response: ChatResponse = self
            .client
            .post(self.chat_url.clone())
            .json(&request)
            .send()?
            .error_for_status()?
            .json()?;
        Ok(response.message.content.trim().to_string())
    }
}

impl AdvisoryOracle for HttpOracle {
    fn suggest_mapping(
        &self,
        expected_fields: &[String],
        column_names: &[String],
    ) -> Result<BTreeMap<String, String>, OracleError> {
        let prompt = format!(
            "You are a data schema assistant. Map each expected address field to the \
             closest matching column name, or null when no column fits.\n\
             Expected fields: {expected}\nActual columns: {columns}\n\
             Respond with a single JSON object mapping field name to column name. \
             No prose, no code fences.",
            expected = expected_fields.join(", "),
            columns = column_names.join(", "),
        );
        let content = self.chat(&prompt)?;
        let stripped = strip_code_fences(&content);
        let parsed: BTreeMap<String, Option<String>> = serde_json::from_str(stripped)
            .map_err(|err| OracleError::Malformed(format!("{err}: {content}")))?;
        debug!(suggestions = parsed.len(), "oracle mapping response parsed");
        Ok(parsed
            .into_iter()
            .filter_map(|(field, column)| column.map(|column| (field, column)))
            .collect())
    }

    fn find_anomalies(
        &self,
        row_values: &BTreeMap<String, String>,
    ) -> Result<Option<String>, OracleError> {
        let row_text = serde_json::to_string(row_values)
            .map_err(|err| OracleError::Malformed(err.to_string()))?;
        let prompt = format!(
            "You are a data quality assistant. Given address data values, identify \
             spelling errors or strange entries. Only report anomalies. Do NOT suggest \
             corrections. Format response as: 'ColumnName: issue' (multiple issues \
             separated by '|'). Respond with 'none' when the row is clean.\n\n\
             Example row:\n{row_text}\n\nAnomalies:"
        );
        let content = self.chat(&prompt)?;
        Ok(normalize_anomaly_response(&content))
    }
}

/// Deterministic string-similarity oracle used when no language-model
/// endpoint is configured. Mapping suggestions come from the best
/// Jaro-Winkler match above a fixed threshold; it has no opinion on values.
#[derive(Debug, Default)]
pub struct SimilarityOracle;

impl SimilarityOracle {
    pub const THRESHOLD: f64 = 0.85;
}

impl AdvisoryOracle for SimilarityOracle {
    fn suggest_mapping(
        &self,
        expected_fields: &[String],
        column_names: &[String],
    ) -> Result<BTreeMap<String, String>, OracleError> {
        let mut mapping = BTreeMap::new();
        for field in expected_fields {
            let field_lower = field.to_lowercase();
            let best = column_names
                .iter()
                .map(|column| {
                    let score = strsim::jaro_winkler(&field_lower, &column.to_lowercase());
                    (column, score)
                })
                .max_by(|a, b| a.1.total_cmp(&b.1));
            if let Some((column, score)) = best {
                if score >= Self::THRESHOLD {
                    mapping.insert(field.clone(), column.clone());
                }
            }
        }
        Ok(mapping)
    }

    fn find_anomalies(
        &self,
        _row_values: &BTreeMap<String, String>,
    ) -> Result<Option<String>, OracleError> {
        Ok(None)
    }
}

/// Empty/`"none"` responses mean no finding.
fn normalize_anomaly_response(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Models often wrap JSON in markdown fences despite instructions.
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}
