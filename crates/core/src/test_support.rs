//! In-memory transport for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::time::Instant;

use crate::fetch::{HttpResponse, Transport};
use crate::{LoctextError, Result};

#[derive(Debug, Clone)]
enum Reply {
    Response(HttpResponse),
    Timeout,
    InvalidUrl,
}

/// Deterministic transport. Each URL answers with its scripted replies in
/// order, repeating the last one; unknown URLs answer 404.
#[derive(Debug, Default)]
pub(crate) struct StubTransport {
    routes: HashMap<String, Vec<Reply>>,
    log: Mutex<Vec<(String, Instant)>>,
}

impl StubTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(mut self, url: &str, status: u16, body: &str) -> Self {
        self.routes
            .entry(url.to_string())
            .or_default()
            .push(Reply::Response(HttpResponse::new(status, body)));
        self
    }

    pub(crate) fn fail(mut self, url: &str) -> Self {
        self.routes.entry(url.to_string()).or_default().push(Reply::Timeout);
        self
    }

    pub(crate) fn reject(mut self, url: &str) -> Self {
        self.routes.entry(url.to_string()).or_default().push(Reply::InvalidUrl);
        self
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.log.lock().unwrap().iter().map(|(url, _)| url.clone()).collect()
    }

    pub(crate) fn request_times(&self) -> Vec<Instant> {
        self.log.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }

    fn reply(&self, url: &str) -> Reply {
        let mut log = self.log.lock().unwrap();
        let seen = log.iter().filter(|(logged, _)| logged == url).count();
        log.push((url.to_string(), Instant::now()));

        match self.routes.get(url) {
            Some(replies) => replies[seen.min(replies.len() - 1)].clone(),
            None => Reply::Response(HttpResponse::new(404, "")),
        }
    }
}

impl Transport for StubTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        match self.reply(url) {
            Reply::Response(response) => Ok(response),
            Reply::Timeout => Err(LoctextError::Timeout { timeout: 30 }),
            Reply::InvalidUrl => Err(LoctextError::InvalidUrl(url.to_string())),
        }
    }
}
