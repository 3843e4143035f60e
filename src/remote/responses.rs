use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

pub(crate) const FETCH_FAILED: &str = "Error fetching music. Please try again.";
pub(crate) const UNEXPECTED_RESPONSE: &str = "Unexpected response from server";
pub(crate) const SIGN_IN_FAILED: &str = "Sign-in failed";
pub(crate) const SIGN_IN_TRANSPORT: &str = "Error during sign-in. Please try again.";
pub(crate) const SIGN_UP_FAILED: &str = "Sign-up failed";
pub(crate) const SIGN_UP_TRANSPORT: &str = "Error during sign-up. Please try again.";
pub(crate) const SIGN_UP_SUCCESS: &str = "Sign-up successful";
pub(crate) const UPLOAD_FAILED: &str = "Failed to upload payment screenshot";

#[derive(Debug, Serialize)]
pub(crate) struct SignInRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SignUpRequest {
    pub email: String,
    pub name: String,
    pub contact: String,
    pub password: String,
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn string_field<'a>(data: &'a Value, key: &str) -> Option<&'a str> {
    data.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn parse_json(body: &str, what: &str) -> Result<Value> {
    serde_json::from_str(body).map_err(|e| {
        log::error!("{what}: unparseable response {body:?}: {e}");
        Error::Network(UNEXPECTED_RESPONSE.to_string())
    })
}

/// Sign-in succeeds only on a 2xx carrying a non-empty `token`.
pub(crate) fn parse_sign_in(status: u16, body: &str) -> Result<String> {
    let data = parse_json(body, "sign-in")?;
    match string_field(&data, "token") {
        Some(token) if is_success(status) => Ok(token.to_string()),
        _ => {
            let message = string_field(&data, "message").unwrap_or(SIGN_IN_FAILED);
            Err(Error::Network(message.to_string()))
        }
    }
}

/// Sign-up succeeds on a 2xx whose `message` is the success marker.
pub(crate) fn parse_sign_up(status: u16, body: &str) -> Result<String> {
    let data = parse_json(body, "sign-up")?;
    match string_field(&data, "message") {
        Some(SIGN_UP_SUCCESS) if is_success(status) => Ok(SIGN_UP_SUCCESS.to_string()),
        _ => {
            let message = string_field(&data, "error").unwrap_or(SIGN_UP_FAILED);
            Err(Error::Network(message.to_string()))
        }
    }
}

/// The upload's `message` is shown verbatim.
pub(crate) fn parse_upload(status: u16, body: &str) -> Result<String> {
    let data = serde_json::from_str::<Value>(body).map_err(|e| {
        log::error!("upload: unparseable response {body:?}: {e}");
        Error::Network(UPLOAD_FAILED.to_string())
    })?;
    let message = string_field(&data, "message");
    if is_success(status) {
        Ok(message.unwrap_or_default().to_string())
    } else {
        Err(Error::Network(message.unwrap_or(UPLOAD_FAILED).to_string()))
    }
}
