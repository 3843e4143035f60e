use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;

use super::client::ApiClient;
use super::multipart::{MultipartForm, image_content_type};
use super::responses::{parse_sign_in, parse_sign_up, parse_upload};
use crate::catalog::Language;
use crate::config::ServerSettings;
use crate::error::Error;

/// Serve exactly one canned HTTP response and hand back the raw request.
fn serve_once(status_line: &'static str, body: &'static str) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut request = String::new();
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap() == 0 {
                break;
            }
            if let Some(v) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                content_length = v.trim().parse().unwrap_or(0);
            }
            request.push_str(&line);
            if line == "\r\n" {
                break;
            }
        }
        let mut payload = vec![0u8; content_length];
        reader.read_exact(&mut payload).unwrap();
        request.push_str(&String::from_utf8_lossy(&payload));

        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
        .unwrap();
        let _ = tx.send(request);
    });
    (format!("http://{addr}"), rx)
}

fn client_for(url: &str) -> ApiClient {
    ApiClient::new(&ServerSettings {
        url: url.to_string(),
        connect_timeout_ms: 2_000,
        request_timeout_ms: 2_000,
    })
}

#[test]
fn catalog_url_encodes_language_and_trims_slash() {
    let client = client_for("http://chants.local:3000/");
    assert_eq!(
        client.catalog_url(Language::En),
        "http://chants.local:3000/music?language=en"
    );
    assert_eq!(
        client.catalog_url(Language::Unset),
        "http://chants.local:3000/music?language="
    );
}

#[test]
fn fetch_catalog_reads_track_array() {
    let (url, requests) = serve_once(
        "200 OK",
        r#"[{"name":"Om Chant","url":"https://x/om.mp3"}]"#,
    );
    let tracks = client_for(&url).fetch_catalog(Language::En).unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].name, "Om Chant");
    assert_eq!(tracks[0].url, "https://x/om.mp3");

    let request = requests.recv().unwrap();
    assert!(request.starts_with("GET /music?language=en HTTP/1.1"));
}

#[test]
fn fetch_catalog_maps_error_status_to_network_error() {
    let (url, _requests) = serve_once("500 Internal Server Error", r#"{"error":"db down"}"#);
    let err = client_for(&url).fetch_catalog(Language::Hi).unwrap_err();
    match err {
        Error::Network(msg) => assert_eq!(msg, "Error fetching music. Please try again."),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn fetch_catalog_rejects_malformed_body() {
    let (url, _requests) = serve_once("200 OK", r#"{"not":"an array"}"#);
    assert!(matches!(
        client_for(&url).fetch_catalog(Language::En),
        Err(Error::Network(_))
    ));
}

#[test]
fn sign_in_posts_credentials_and_returns_token() {
    let (url, requests) = serve_once("200 OK", r#"{"token":"tok-123"}"#);
    let token = client_for(&url).sign_in("a@b.c", "secret").unwrap();
    assert_eq!(token, "tok-123");

    let request = requests.recv().unwrap();
    assert!(request.starts_with("POST /api/auth/signin HTTP/1.1"));
    assert!(request.contains(r#""email":"a@b.c""#));
    assert!(request.contains(r#""password":"secret""#));
}

#[test]
fn sign_in_surfaces_server_message_on_rejection() {
    let (url, _requests) = serve_once("401 Unauthorized", r#"{"message":"Invalid credentials"}"#);
    let err = client_for(&url).sign_in("a@b.c", "bad").unwrap_err();
    assert_eq!(err.to_string(), "Invalid credentials");
}

#[test]
fn sign_in_transport_failure_has_retry_message() {
    // Bind then drop to get a port nobody listens on.
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let err = client_for(&format!("http://127.0.0.1:{port}"))
        .sign_in("a@b.c", "x")
        .unwrap_err();
    assert_eq!(err.to_string(), "Error during sign-in. Please try again.");
}

#[test]
fn upload_sends_multipart_form() {
    let dir = tempfile::tempdir().unwrap();
    let shot = dir.path().join("receipt.png");
    std::fs::write(&shot, b"PNGDATA").unwrap();

    let (url, requests) = serve_once("200 OK", r#"{"message":"Thank you for your donation"}"#);
    let message = client_for(&url).upload_payment("a@b.c", &shot).unwrap();
    assert_eq!(message, "Thank you for your donation");

    let request = requests.recv().unwrap();
    assert!(request.starts_with("POST /music HTTP/1.1"));
    assert!(request.contains("multipart/form-data; boundary="));
    assert!(request.contains("name=\"paymentScreenshot\"; filename=\"receipt.png\""));
    assert!(request.contains("Content-Type: image/png"));
    assert!(request.contains("PNGDATA"));
}

#[test]
fn parse_sign_in_variants() {
    assert_eq!(parse_sign_in(200, r#"{"token":"t"}"#).unwrap(), "t");
    assert_eq!(
        parse_sign_in(200, r#"{"message":"Account locked"}"#)
            .unwrap_err()
            .to_string(),
        "Account locked"
    );
    assert_eq!(
        parse_sign_in(200, r#"{"token":""}"#).unwrap_err().to_string(),
        "Sign-in failed"
    );
    // A token on an error status does not count.
    assert!(parse_sign_in(500, r#"{"token":"t"}"#).is_err());
    assert_eq!(
        parse_sign_in(200, "<html>").unwrap_err().to_string(),
        "Unexpected response from server"
    );
}

#[test]
fn parse_sign_up_requires_success_marker() {
    assert_eq!(
        parse_sign_up(201, r#"{"message":"Sign-up successful"}"#).unwrap(),
        "Sign-up successful"
    );
    assert_eq!(
        parse_sign_up(200, r#"{"message":"ok"}"#).unwrap_err().to_string(),
        "Sign-up failed"
    );
    assert_eq!(
        parse_sign_up(409, r#"{"error":"Email already registered"}"#)
            .unwrap_err()
            .to_string(),
        "Email already registered"
    );
}

#[test]
fn parse_upload_variants() {
    assert_eq!(parse_upload(200, r#"{"message":"Received"}"#).unwrap(), "Received");
    assert_eq!(
        parse_upload(400, r#"{"message":"Bad image"}"#)
            .unwrap_err()
            .to_string(),
        "Bad image"
    );
    assert_eq!(
        parse_upload(200, "oops").unwrap_err().to_string(),
        "Failed to upload payment screenshot"
    );
}

#[test]
fn multipart_body_layout() {
    let form = MultipartForm::with_boundary("B".into())
        .text("email", "a@b.c")
        .file("paymentScreenshot", "p.jpg", "image/jpeg", b"xyz");
    assert_eq!(form.content_type(), "multipart/form-data; boundary=B");
    let body = String::from_utf8(form.finish()).unwrap();
    assert_eq!(
        body,
        "--B\r\nContent-Disposition: form-data; name=\"email\"\r\n\r\na@b.c\r\n\
         --B\r\nContent-Disposition: form-data; name=\"paymentScreenshot\"; filename=\"p.jpg\"\r\n\
         Content-Type: image/jpeg\r\n\r\nxyz\r\n--B--\r\n"
    );
}

#[test]
fn image_content_type_by_extension() {
    assert_eq!(image_content_type("a.JPG"), "image/jpeg");
    assert_eq!(image_content_type("a.png"), "image/png");
    assert_eq!(image_content_type("noext"), "application/octet-stream");
}
