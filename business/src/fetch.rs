//! HTTP fetch abstraction.
//!
//! Production code goes through [`EhttpFetcher`] (callback-based, works on
//! both native and wasm targets). Tests register a [`MockFetcher`] with
//! scripted responses; it also records every request so tests can assert
//! what was (or was not) sent.

use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

use agrilink_states::State;
use ehttp::{Request, Response, Result};

pub trait FetchService: Send + Sync + Debug {
    fn fetch(&self, request: Request, on_done: Box<dyn FnOnce(Result<Response>) + Send + 'static>);
}

#[derive(Debug, Default)]
pub struct EhttpFetcher;

impl FetchService for EhttpFetcher {
    fn fetch(&self, request: Request, on_done: Box<dyn FnOnce(Result<Response>) + Send + 'static>) {
        ehttp::fetch(request, on_done);
    }
}

impl<T: FetchService + ?Sized> FetchService for Arc<T> {
    fn fetch(&self, request: Request, on_done: Box<dyn FnOnce(Result<Response>) + Send + 'static>) {
        (**self).fetch(request, on_done);
    }
}

/// State wrapper so computes and commands reach the fetcher through `Dep`.
#[derive(Debug, Clone)]
pub struct FetchState {
    inner: Arc<dyn FetchService>,
}

impl FetchState {
    pub fn new(service: impl FetchService + 'static) -> Self {
        Self {
            inner: Arc::new(service),
        }
    }

    pub fn fetch(
        &self,
        request: Request,
        on_done: Box<dyn FnOnce(Result<Response>) + Send + 'static>,
    ) {
        self.inner.fetch(request, on_done);
    }
}

impl Default for FetchState {
    fn default() -> Self {
        Self::new(EhttpFetcher)
    }
}

impl State for FetchState {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        agrilink_states::assign_impl(self, new_self);
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use mock::{MockFetcher, RecordedRequest, json_response, status_response};

#[cfg(any(test, feature = "test-utils"))]
mod mock {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::{FetchService, Request, Response, Result};

    /// What a [`MockFetcher`] saw go over the wire.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RecordedRequest {
        pub method: String,
        pub url: String,
        pub body: Vec<u8>,
    }

    impl RecordedRequest {
        pub fn body_text(&self) -> String {
            String::from_utf8_lossy(&self.body).into_owned()
        }
    }

    /// Scripted fetcher: responses are consumed in FIFO order and callbacks
    /// run synchronously, so tests stay deterministic without a live server.
    #[derive(Debug, Default)]
    pub struct MockFetcher {
        responses: Mutex<VecDeque<Result<Response>>>,
        requests: Mutex<Vec<RecordedRequest>>,
    }

    impl MockFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_response(&self, response: Result<Response>) {
            if let Ok(mut responses) = self.responses.lock() {
                responses.push_back(response);
            }
        }

        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.requests
                .lock()
                .map(|requests| requests.clone())
                .unwrap_or_default()
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().map(|requests| requests.len()).unwrap_or(0)
        }
    }

    impl FetchService for MockFetcher {
        fn fetch(
            &self,
            request: Request,
            on_done: Box<dyn FnOnce(Result<Response>) + Send + 'static>,
        ) {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(RecordedRequest {
                    method: request.method.clone(),
                    url: request.url.clone(),
                    body: request.body.clone(),
                });
            }
            let response = self
                .responses
                .lock()
                .ok()
                .and_then(|mut responses| responses.pop_front())
                .unwrap_or_else(|| Err("MockFetcher: no response scripted".to_owned()));
            on_done(response);
        }
    }

    /// A JSON response with the given status, for scripting mocks.
    pub fn json_response(status: u16, body: &str) -> Result<Response> {
        Ok(Response {
            url: "mock://".to_owned(),
            ok: (200..300).contains(&status),
            status,
            status_text: String::new(),
            headers: ehttp::Headers::default(),
            bytes: body.as_bytes().to_vec(),
        })
    }

    /// An empty-bodied response with the given status.
    pub fn status_response(status: u16) -> Result<Response> {
        json_response(status, "")
    }
}
