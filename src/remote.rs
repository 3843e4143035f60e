//! Client for the chant server's REST endpoints.
//!
//! Four calls exist: list chants, sign in, sign up and upload a payment
//! screenshot. Every failure is reported as an [`Error`](crate::error::Error)
//! whose message is ready to be shown to the user; the details go to the log.

mod client;
mod multipart;
mod responses;

pub use client::ApiClient;
pub use responses::SignUpRequest;

#[cfg(test)]
mod tests;
