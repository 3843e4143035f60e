//! Short-lived request threads. Each request reports back exactly one
//! [`NetEvent`]; the event loop drains them every frame.

use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::thread;

use crate::catalog::{Language, Track};
use crate::error::{Error, Result};
use crate::remote::{ApiClient, SignUpRequest};

#[derive(Debug)]
pub enum NetEvent {
    Catalog {
        language: Language,
        result: Result<Vec<Track>>,
    },
    SignIn(Result<String>),
    SignUp(Result<String>),
    Upload(Result<String>),
}

pub struct Network {
    client: ApiClient,
    tx: Sender<NetEvent>,
}

impl Network {
    pub fn new(client: ApiClient, tx: Sender<NetEvent>) -> Self {
        Self { client, tx }
    }

    pub fn fetch_catalog(&self, language: Language) {
        self.spawn(
            "catalog",
            move |client| NetEvent::Catalog {
                language,
                result: client.fetch_catalog(language),
            },
            move |err| NetEvent::Catalog {
                language,
                result: Err(err),
            },
        );
    }

    pub fn sign_in(&self, email: String, password: String) {
        self.spawn(
            "sign-in",
            move |client| NetEvent::SignIn(client.sign_in(&email, &password)),
            |err| NetEvent::SignIn(Err(err)),
        );
    }

    pub fn sign_up(&self, request: SignUpRequest) {
        self.spawn(
            "sign-up",
            move |client| NetEvent::SignUp(client.sign_up(&request)),
            |err| NetEvent::SignUp(Err(err)),
        );
    }

    pub fn upload_payment(&self, email: String, screenshot: PathBuf) {
        self.spawn(
            "upload",
            move |client| NetEvent::Upload(client.upload_payment(&email, &screenshot)),
            |err| NetEvent::Upload(Err(err)),
        );
    }

    /// Run `job` on its own thread. If the thread cannot start, `fallback`
    /// still delivers a failure so the UI never waits forever.
    fn spawn<J, F>(&self, what: &str, job: J, fallback: F)
    where
        J: FnOnce(&ApiClient) -> NetEvent + Send + 'static,
        F: FnOnce(Error) -> NetEvent,
    {
        let client = self.client.clone();
        let tx = self.tx.clone();
        let spawned = thread::Builder::new()
            .name(format!("nidra-{what}"))
            .spawn(move || {
                let _ = tx.send(job(&client));
            });
        if let Err(e) = spawned {
            log::error!("cannot start {what} request: {e}");
            let _ = self
                .tx
                .send(fallback(Error::Network(format!("Could not start the {what} request."))));
        }
    }
}
