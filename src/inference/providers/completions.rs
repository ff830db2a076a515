//! Wire format for the `/completions` endpoint.
//!
//! OpenAI and LM Studio both speak this format. The only difference between
//! the two providers is the base URL and whether a bearer credential is sent.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::inference::{Completion, CompletionRequest, ProviderError, Usage};

// ============================================================================
// Completions API Types
// ============================================================================

/// The request body for the completions endpoint
#[derive(Serialize, Debug)]
pub(super) struct CompletionsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<&'a [String]>,
}

/// Response body for a non-streaming completion
#[derive(Deserialize, Debug)]
pub(super) struct CompletionsResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    text: String,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// Error envelope: `{"error": {"message": "..."}}`
#[derive(Deserialize, Debug)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    message: String,
}

// ============================================================================
// Translation Layer
// ============================================================================

/// Converts a domain request into the wire body. Omits `stop` when empty.
pub(super) fn to_wire<'a>(request: &'a CompletionRequest<'a>) -> CompletionsRequest<'a> {
    let params = request.parameters;
    CompletionsRequest {
        model: &params.model,
        prompt: request.prompt,
        max_tokens: params.max_tokens,
        temperature: params.temperature,
        top_p: params.top_p,
        frequency_penalty: params.frequency_penalty,
        presence_penalty: params.presence_penalty,
        stop: (!request.stop.is_empty()).then_some(request.stop),
    }
}

/// Pulls the first choice out of a response body.
pub(super) fn from_wire(response: CompletionsResponse) -> Result<Completion, ProviderError> {
    let usage = response.usage;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Parse("response contained no choices".to_string()))?;
    Ok(Completion {
        text: choice.text,
        finish_reason: choice.finish_reason,
        usage,
    })
}

/// Extracts the human-readable message from an error body, falling back to the raw text.
pub(super) fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|env| env.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

// ============================================================================
// Transport
// ============================================================================

/// POSTs the request to `{base_url}/completions` and decodes the reply.
pub(super) async fn post_completion(
    client: &reqwest::Client,
    base_url: &str,
    bearer: Option<&str>,
    provider_name: &str,
    request: CompletionRequest<'_>,
) -> Result<Completion, ProviderError> {
    let body = to_wire(&request);

    info!(
        "{} completion request: model={}, prompt_len={}, max_tokens={}, stop_count={}",
        provider_name,
        body.model,
        body.prompt.len(),
        body.max_tokens,
        request.stop.len()
    );

    let url = format!("{}/completions", base_url.trim_end_matches('/'));
    let mut builder = client.post(url).json(&body);
    if let Some(key) = bearer {
        builder = builder.header("Authorization", format!("Bearer {}", key));
    }

    let response = builder
        .send()
        .await
        .map_err(|e| ProviderError::Network(e.to_string()))?;

    debug!("{} response status: {}", provider_name, response.status());

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let err_body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        warn!("{} API error: {} - {}", provider_name, status, err_body);
        return Err(ProviderError::Api {
            status,
            message: error_message(&err_body),
        });
    }

    let text = response
        .text()
        .await
        .map_err(|e| ProviderError::Network(e.to_string()))?;
    let decoded: CompletionsResponse =
        serde_json::from_str(&text).map_err(|e| ProviderError::Parse(e.to_string()))?;
    let completion = from_wire(decoded)?;

    info!(
        "{} completion received: {} chars, finish_reason={:?}",
        provider_name,
        completion.text.len(),
        completion.finish_reason
    );

    Ok(completion)
}
