/// Gemini transport tests against a loopback `tiny_http` server.
///
/// Each test serves one canned response on an ephemeral port and points a
/// real `GeminiClient` at it, so the ureq request, headers and status
/// mapping are exercised end to end without leaving the machine.
use std::io::Read;
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;

use codementor::catalog::Subject;
use codementor::config::schema::ModelConfig;
use codementor::conversation::Turn;
use codementor::llm::gemini::GenerationConfig;
use codementor::llm::{GeminiClient, GenerateRequest, Transport, TransportError, prompts};
use tiny_http::{Header, Response, Server, StatusCode};

// ---------------------------------------------------------------------------
// Loopback server
// ---------------------------------------------------------------------------

/// What the server saw.
#[derive(Debug)]
struct Received {
    method: String,
    url: String,
    api_key: Option<String>,
    body: String,
}

/// Serve a single request with `status`/`body` and report what arrived.
fn serve_once(status: u16, body: &'static str) -> (String, mpsc::Receiver<Received>) {
    let server = Server::http("127.0.0.1:0").expect("bind loopback server");
    let addr = server
        .server_addr()
        .to_ip()
        .expect("loopback server has an IP address");
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let Ok(mut request) = server.recv() else {
            return;
        };
        let api_key = request
            .headers()
            .iter()
            .find(|h| h.field.equiv("x-goog-api-key"))
            .map(|h| h.value.as_str().to_string());
        let mut received_body = String::new();
        let _ = request.as_reader().read_to_string(&mut received_body);

        let _ = tx.send(Received {
            method: request.method().to_string(),
            url: request.url().to_string(),
            api_key,
            body: received_body,
        });

        let header = Header::from_bytes("Content-Type", "application/json")
            .expect("static header");
        let _ = request.respond(
            Response::from_string(body)
                .with_header(header)
                .with_status_code(StatusCode(status)),
        );
    });

    (format!("http://{addr}/v1beta"), rx)
}

fn client_for(endpoint: String) -> GeminiClient {
    GeminiClient::from_config(&ModelConfig {
        endpoint,
        model: "test-model".to_string(),
        timeout_ms: 5_000,
        ..ModelConfig::default()
    })
}

fn sample_request() -> GenerateRequest {
    prompts::build_request(
        Subject::Java,
        &[Turn::user("What is a class?"), Turn::assistant("What do you think?")],
        "A blueprint?",
        &GenerationConfig::from_config(&ModelConfig::default()),
    )
}

// ---------------------------------------------------------------------------
// Success
// ---------------------------------------------------------------------------

#[test]
fn reply_text_comes_from_first_candidate() {
    let (endpoint, rx) = serve_once(
        200,
        r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Close! What does it describe?"}]}}]}"#,
    );

    let reply = client_for(endpoint).complete("secret-key", &sample_request());
    assert_eq!(reply.unwrap(), "Close! What does it describe?");

    let received = rx.recv().unwrap();
    assert_eq!(received.method, "POST");
    assert_eq!(received.url, "/v1beta/models/test-model:generateContent");
    assert_eq!(received.api_key.as_deref(), Some("secret-key"));

    let sent: serde_json::Value = serde_json::from_str(&received.body).unwrap();
    assert!(
        sent["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Java (AP CSA)")
    );
    assert_eq!(sent["contents"].as_array().unwrap().len(), 3);
    assert_eq!(sent["contents"][1]["role"], "model");
    assert_eq!(sent["contents"][2]["parts"][0]["text"], "A blueprint?");
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn non_success_status_carries_code_and_api_message() {
    let (endpoint, _rx) = serve_once(
        503,
        r#"{"error":{"code":503,"message":"The model is overloaded.","status":"UNAVAILABLE"}}"#,
    );

    let err = client_for(endpoint)
        .complete("k", &sample_request())
        .unwrap_err();
    match &err {
        TransportError::Status { status, message } => {
            assert_eq!(*status, 503);
            assert_eq!(message.as_deref(), Some("The model is overloaded."));
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert_eq!(err.to_string(), "API request failed: 503");
}

#[test]
fn non_success_status_without_envelope_still_maps() {
    let (endpoint, _rx) = serve_once(400, "bad request");

    let err = client_for(endpoint)
        .complete("k", &sample_request())
        .unwrap_err();
    assert!(matches!(
        err,
        TransportError::Status {
            status: 400,
            message: None
        }
    ));
}

#[test]
fn success_with_non_json_body_is_malformed() {
    let (endpoint, _rx) = serve_once(200, "<html>captive portal</html>");

    let err = client_for(endpoint)
        .complete("k", &sample_request())
        .unwrap_err();
    assert!(matches!(
        err,
        TransportError::MalformedResponse { status: 200, .. }
    ));
}

#[test]
fn unreachable_host_is_a_network_error() {
    // Grab a free port, then release it so nothing is listening.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let err = client_for(format!("http://127.0.0.1:{port}/v1beta"))
        .complete("k", &sample_request())
        .unwrap_err();
    assert!(matches!(err, TransportError::Network(_)), "got {err:?}");
    assert_eq!(err.status(), None);
}
