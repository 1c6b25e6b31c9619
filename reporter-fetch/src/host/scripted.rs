//! In-memory transport that replays queued responses.
//!
//! Used by tests and for offline replay of captured service answers. Every
//! request is recorded so callers can assert on what was sent.

use async_trait::async_trait;
use reporter_core::TransportError;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::transport::{HttpRequest, HttpResponse, Transport};

/// Transport answering from a queue of scripted outcomes.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    /// Creates a transport with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response.
    pub fn push_response(&self, response: HttpResponse) -> &Self {
        lock(&self.outcomes).push_back(Ok(response));
        self
    }

    /// Queues a transport failure.
    pub fn push_error(&self, error: TransportError) -> &Self {
        lock(&self.outcomes).push_back(Err(error));
        self
    }

    /// Returns a copy of every request sent so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    /// Returns the number of requests sent so far.
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Returns the number of queued outcomes not yet consumed.
    pub fn remaining(&self) -> usize {
        lock(&self.outcomes).len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        debug!(url = %request.url, "Scripted request");
        lock(&self.requests).push(request);

        lock(&self.outcomes)
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Request("no scripted response left".to_string()))
            })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
