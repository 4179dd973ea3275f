//! JSON API handlers for the chat page.
//!
//! Each handler corresponds to an API endpoint and returns a
//! `Response<Cursor<Vec<u8>>>` with JSON content. State-changing handlers
//! answer with the full [`SessionView`] so the page can redraw in one step.

use std::io::Cursor;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tiny_http::{Response, StatusCode};

use crate::catalog::{self, Subject};
use crate::config;
use crate::session::{SendOutcome, Session};

use super::{content_type_json, error_response};

// ---------------------------------------------------------------------------
// JSON response types
// ---------------------------------------------------------------------------

/// Everything the page draws.
#[derive(Debug, Serialize)]
struct SessionView {
    subject: Subject,
    subject_label: &'static str,
    subjects: Vec<SubjectOption>,
    topics: &'static [&'static str],
    hints: &'static [&'static str],
    api_key_configured: bool,
    turns: usize,
    /// Rendered panel markup.
    html: String,
}

#[derive(Debug, Serialize)]
struct SubjectOption {
    id: Subject,
    label: &'static str,
}

impl SessionView {
    fn of(session: &Session) -> Self {
        Self {
            subject: session.subject(),
            subject_label: session.subject().label(),
            subjects: Subject::ALL
                .iter()
                .map(|&id| SubjectOption {
                    id,
                    label: id.label(),
                })
                .collect(),
            topics: session.topics(),
            hints: catalog::HINT_CHIPS,
            api_key_configured: session.api_key_status(),
            turns: session.conversation().len(),
            html: session.panel().to_html(),
        }
    }
}

/// Response to anything that sends a message.
#[derive(Debug, Serialize)]
struct SendResponse {
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    session: SessionView,
}

/// Health API response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    version: &'static str,
    subject: Subject,
    model: String,
    api_key_configured: bool,
    persist_history: bool,
    data_dir: String,
    config_exists: bool,
    log_path: Option<String>,
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SendRequest {
    text: String,
}

#[derive(Debug, Deserialize)]
struct TopicRequest {
    topic: String,
}

#[derive(Debug, Deserialize)]
struct HintRequest {
    hint: String,
}

#[derive(Debug, Deserialize)]
struct SubjectRequest {
    subject: String,
}

#[derive(Debug, Deserialize)]
struct KeyRequest {
    key: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a JSON success response.
fn json_response<T: Serialize>(data: &T) -> Result<Response<Cursor<Vec<u8>>>> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(200)))
}

/// Parse a request body, or a 400 describing why it didn't parse.
fn parse_body<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T, Response<Cursor<Vec<u8>>>> {
    serde_json::from_str(body).map_err(|e| error_response(400, &format!("invalid request body: {e}")))
}

fn send_response(session: &Session, outcome: SendOutcome) -> Result<Response<Cursor<Vec<u8>>>> {
    let (label, error) = match outcome {
        SendOutcome::Ignored => ("ignored", None),
        SendOutcome::Replied(_) => ("replied", None),
        SendOutcome::Failed { error, .. } => ("failed", Some(error.to_string())),
    };
    json_response(&SendResponse {
        outcome: label,
        error,
        session: SessionView::of(session),
    })
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `GET /api/session`: current view.
pub fn get_session(session: &Session) -> Result<Response<Cursor<Vec<u8>>>> {
    json_response(&SessionView::of(session))
}

/// `POST /api/send`: `{"text": "..."}`.
pub fn post_send(session: &mut Session, body: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let req: SendRequest = match parse_body(body) {
        Ok(req) => req,
        Err(resp) => return Ok(resp),
    };
    session.set_composer(req.text);
    let outcome = session.submit();
    send_response(session, outcome)
}

/// `POST /api/topic`: `{"topic": "Recursion"}`.
pub fn post_topic(session: &mut Session, body: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let req: TopicRequest = match parse_body(body) {
        Ok(req) => req,
        Err(resp) => return Ok(resp),
    };
    let outcome = session.ask_about_topic(&req.topic);
    send_response(session, outcome)
}

/// `POST /api/hint`: `{"hint": "..."}`.
pub fn post_hint(session: &mut Session, body: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let req: HintRequest = match parse_body(body) {
        Ok(req) => req,
        Err(resp) => return Ok(resp),
    };
    let outcome = session.use_hint(&req.hint);
    send_response(session, outcome)
}

/// `POST /api/subject`: `{"subject": "java"}`.
pub fn post_subject(session: &mut Session, body: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let req: SubjectRequest = match parse_body(body) {
        Ok(req) => req,
        Err(resp) => return Ok(resp),
    };
    let Some(subject) = Subject::parse(&req.subject) else {
        return Ok(error_response(
            400,
            &format!("unknown subject '{}' (expected python or java)", req.subject),
        ));
    };
    session.switch_subject(subject);
    json_response(&SessionView::of(session))
}

/// `POST /api/history/clear`: drop the conversation.
pub fn post_history_clear(session: &mut Session) -> Result<Response<Cursor<Vec<u8>>>> {
    session.clear_history();
    json_response(&SessionView::of(session))
}

/// `POST /api/key`: `{"key": "..."}`.
pub fn post_key(session: &mut Session, body: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let req: KeyRequest = match parse_body(body) {
        Ok(req) => req,
        Err(resp) => return Ok(resp),
    };
    if req.key.trim().is_empty() {
        return Ok(error_response(400, "API key must not be empty"));
    }
    session
        .save_api_key(&req.key)
        .context("failed to store API key")?;
    json_response(&SessionView::of(session))
}

/// `POST /api/key/reset`: forget the stored key.
pub fn post_key_reset(session: &mut Session) -> Result<Response<Cursor<Vec<u8>>>> {
    session.reset_api_key();
    json_response(&SessionView::of(session))
}

/// `GET /api/health`: configuration and storage summary.
pub fn get_health(session: &Session) -> Result<Response<Cursor<Vec<u8>>>> {
    let cfg = config::load();
    let config_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);

    let resp = HealthResponse {
        version: env!("CARGO_PKG_VERSION"),
        subject: session.subject(),
        model: cfg.model.model.clone(),
        api_key_configured: session.api_key_status(),
        persist_history: cfg.general.persist_history,
        data_dir: config::schema::expand_home(&cfg.general.data_dir)
            .display()
            .to_string(),
        config_exists,
        log_path: cfg
            .logging
            .enabled
            .then(|| config::schema::expand_home(&cfg.logging.path).display().to_string()),
    };

    json_response(&resp)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_request_deserializes() {
        let req: SendRequest = serde_json::from_str(r#"{"text": "hi"}"#).unwrap();
        assert_eq!(req.text, "hi");
    }

    #[test]
    fn parse_body_rejects_wrong_shape() {
        let resp = parse_body::<TopicRequest>(r#"{"name": "x"}"#).unwrap_err();
        assert_eq!(resp.status_code().0, 400);
    }

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            version: "0.1.0",
            subject: Subject::Java,
            model: "gemini-2.0-flash-exp".to_string(),
            api_key_configured: false,
            persist_history: true,
            data_dir: "/home/a/.codementor".to_string(),
            config_exists: false,
            log_path: None,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"subject\":\"java\""));
        assert!(json.contains("\"api_key_configured\":false"));
    }
}
