use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::catalog::{Language, Track};
use crate::config::ServerSettings;
use crate::error::{Error, Result};

use super::multipart::{MultipartForm, image_content_type};
use super::responses::{
    self, FETCH_FAILED, SIGN_IN_TRANSPORT, SIGN_UP_TRANSPORT, SignInRequest, SignUpRequest,
    UPLOAD_FAILED,
};

/// Blocking client for the chant server, backed by a `ureq` agent.
///
/// Cheap to clone; the runtime hands a clone to each request thread.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http_client: ureq::Agent,
}

impl ApiClient {
    pub fn new(settings: &ServerSettings) -> Self {
        let http_client = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_millis(settings.connect_timeout_ms))
            .timeout_read(Duration::from_millis(settings.request_timeout_ms))
            .timeout_write(Duration::from_millis(settings.request_timeout_ms))
            .build();
        Self {
            base_url: settings.url.trim().trim_end_matches('/').to_string(),
            http_client,
        }
    }

    pub(crate) fn catalog_url(&self, language: Language) -> String {
        format!(
            "{}/music?language={}",
            self.base_url,
            urlencoding::encode(language.code())
        )
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /music?language=..`: the full chant list for one language.
    pub fn fetch_catalog(&self, language: Language) -> Result<Vec<Track>> {
        let url = self.catalog_url(language);
        let response = self.http_client.get(&url).call().map_err(|err| {
            log::error!("catalog request failed ({url}): {err}");
            Error::Network(FETCH_FAILED.to_string())
        })?;
        let tracks: Vec<Track> = response.into_json().map_err(|err| {
            log::error!("catalog response parse failed ({url}): {err}");
            Error::Network(FETCH_FAILED.to_string())
        })?;
        log::info!("fetched {} chants for language {:?}", tracks.len(), language.code());
        Ok(tracks)
    }

    /// `POST /api/auth/signin`. Returns the token to persist.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<String> {
        let url = self.endpoint("/api/auth/signin");
        let request = self
            .http_client
            .post(&url)
            .set("Content-Type", "application/json");
        let (status, body) = read_reply(
            request.send_json(SignInRequest { email, password }),
            SIGN_IN_TRANSPORT,
        )?;
        log::debug!("sign-in response ({status}): {body}");
        responses::parse_sign_in(status, &body)
    }

    /// `POST /api/auth/signup`. Returns the server's success message.
    pub fn sign_up(&self, request: &SignUpRequest) -> Result<String> {
        let url = self.endpoint("/api/auth/signup");
        let call = self
            .http_client
            .post(&url)
            .set("Content-Type", "application/json");
        let (status, body) = read_reply(call.send_json(request), SIGN_UP_TRANSPORT)?;
        log::debug!("sign-up response ({status}): {body}");
        responses::parse_sign_up(status, &body)
    }

    /// `POST /music` as multipart form with the payer's email and screenshot.
    pub fn upload_payment(&self, email: &str, screenshot: &Path) -> Result<String> {
        let data = fs::read(screenshot)?;
        let filename = screenshot
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("payment.jpg");
        let form = MultipartForm::new()
            .text("email", email)
            .file(
                "paymentScreenshot",
                filename,
                image_content_type(filename),
                &data,
            );
        let content_type = form.content_type();
        let body = form.finish();

        let url = self.endpoint("/music");
        let call = self
            .http_client
            .post(&url)
            .set("Content-Type", &content_type);
        let (status, reply) = read_reply(call.send_bytes(&body), UPLOAD_FAILED)?;
        log::info!("payment screenshot upload ({status}): {reply}");
        responses::parse_upload(status, &reply)
    }
}

/// Status and body of a reply, treating HTTP error statuses as replies.
/// Only transport failures become `transport_message`.
fn read_reply(
    result: std::result::Result<ureq::Response, ureq::Error>,
    transport_message: &str,
) -> Result<(u16, String)> {
    let response = match result {
        Ok(response) => response,
        Err(ureq::Error::Status(_, response)) => response,
        Err(ureq::Error::Transport(transport)) => {
            log::error!("request failed: {transport}");
            return Err(Error::Network(transport_message.to_string()));
        }
    };
    let status = response.status();
    let body = response.into_string().map_err(|err| {
        log::error!("reading response body failed: {err}");
        Error::Network(transport_message.to_string())
    })?;
    Ok((status, body))
}
