//! Fetch controller — URL → debounce → request → decode → published state.
//!
//! The controller never touches the network itself.  [`FetchController::poll`]
//! hands out a [`FetchRequest`]; whoever performs it reports back through
//! [`FetchController::complete`] with the request's generation.  Only the
//! latest generation is applied, so a superseded response is simply dropped.

use std::time::{Duration, Instant};

use thiserror::Error;

use super::debounce::Debouncer;
use super::observable::{Published, SubscriptionId};
use super::schema::{self, ViewDocument};
use super::status::Status;

/// Document location used when nothing else is configured.
pub const DEFAULT_URL: &str = "https://pryaniky.com/static/json/sample.json";

/// Quiet period after the last URL edit before a fetch is issued.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);

/// No usable response body.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },
    #[error("empty response body from {url}")]
    EmptyBody { url: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPhase {
    #[default]
    Idle,
    Fetching {
        generation: u64,
    },
}

/// A document request for the transport to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    pub url: String,
}

/// How a fetch cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Decoded,
    DecodeFailed,
    TransportFailed,
    EmptyInput,
}

impl FetchOutcome {
    pub fn status(self) -> Status {
        match self {
            FetchOutcome::Decoded => Status::Success,
            FetchOutcome::DecodeFailed | FetchOutcome::TransportFailed => Status::Fail,
            FetchOutcome::EmptyInput => Status::Empty,
        }
    }
}

pub struct FetchController {
    url: String,
    debouncer: Debouncer<String>,
    phase: FetchPhase,
    generation: u64,
    document: Published<ViewDocument>,
    status: Published<Status>,
}

impl FetchController {
    pub fn new(window: Duration) -> Self {
        Self {
            url: String::new(),
            debouncer: Debouncer::new(window),
            phase: FetchPhase::Idle,
            generation: 0,
            document: Published::new(ViewDocument::empty()),
            status: Published::new(Status::Empty),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn phase(&self) -> FetchPhase {
        self.phase
    }

    pub fn document(&self) -> &ViewDocument {
        self.document.get()
    }

    pub fn status(&self) -> Status {
        *self.status.get()
    }

    pub fn subscribe_document<F>(&mut self, f: F) -> SubscriptionId
    where
        F: FnMut(&ViewDocument) + Send + 'static,
    {
        self.document.subscribe(f)
    }

    pub fn subscribe_status<F>(&mut self, f: F) -> SubscriptionId
    where
        F: FnMut(&Status) + Send + 'static,
    {
        self.status.subscribe(f)
    }

    pub fn unsubscribe_document(&mut self, id: SubscriptionId) {
        self.document.unsubscribe(id);
    }

    pub fn unsubscribe_status(&mut self, id: SubscriptionId) {
        self.status.unsubscribe(id);
    }

    /// The URL changed.  Restarts the debounce window.
    pub fn set_url(&mut self, url: impl Into<String>, now: Instant) {
        self.url = url.into();
        self.debouncer.touch(self.url.clone(), now);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Fire the debounced URL if its window has elapsed.
    ///
    /// An empty URL settles immediately as [`FetchOutcome::EmptyInput`] and
    /// produces no request.
    pub fn poll(&mut self, now: Instant) -> Option<FetchRequest> {
        let url = self.debouncer.poll(now)?;
        self.generation = self.generation.wrapping_add(1);

        if url.is_empty() {
            self.finish(FetchOutcome::EmptyInput, ViewDocument::empty());
            return None;
        }

        self.phase = FetchPhase::Fetching {
            generation: self.generation,
        };
        tracing::debug!(generation = self.generation, %url, "fetch: requesting document");
        Some(FetchRequest {
            generation: self.generation,
            url,
        })
    }

    /// Apply a transport result.  Returns `None` for a superseded request.
    pub fn complete(
        &mut self,
        generation: u64,
        body: Result<Vec<u8>, TransportError>,
    ) -> Option<FetchOutcome> {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "fetch: dropping stale response");
            return None;
        }

        let outcome = match body {
            Err(e) => {
                tracing::warn!("fetch: {e}");
                self.finish(FetchOutcome::TransportFailed, ViewDocument::empty());
                FetchOutcome::TransportFailed
            }
            Ok(bytes) => match schema::decode(&bytes) {
                Ok(doc) => {
                    tracing::info!(
                        widgets = doc.view.len(),
                        entries = doc.data.len(),
                        "fetch: document decoded"
                    );
                    self.finish(FetchOutcome::Decoded, doc);
                    FetchOutcome::Decoded
                }
                Err(e) => {
                    tracing::warn!("fetch: {e}");
                    self.finish(FetchOutcome::DecodeFailed, ViewDocument::empty());
                    FetchOutcome::DecodeFailed
                }
            },
        };
        Some(outcome)
    }

    fn finish(&mut self, outcome: FetchOutcome, document: ViewDocument) {
        self.phase = FetchPhase::Idle;
        self.document.set(document);
        self.status.set(outcome.status());
    }
}

impl Default for FetchController {
    fn default() -> Self {
        Self::new(DEBOUNCE_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const DOC: &[u8] = br#"{"data":[{"name":"a","data":{"text":"hi"}}],"view":["a"]}"#;

    fn settle(c: &mut FetchController, url: &str) -> Option<FetchRequest> {
        let t0 = Instant::now();
        c.set_url(url, t0);
        c.poll(t0 + DEBOUNCE_WINDOW)
    }

    #[test]
    fn nothing_happens_inside_the_window() {
        let mut c = FetchController::default();
        let t0 = Instant::now();
        c.set_url("http://x", t0);
        assert_eq!(c.poll(t0 + Duration::from_millis(100)), None);
        assert_eq!(c.phase(), FetchPhase::Idle);
        assert_eq!(c.next_deadline(), Some(t0 + DEBOUNCE_WINDOW));
    }

    #[test]
    fn successful_fetch_publishes_document_and_success() {
        let mut c = FetchController::default();
        let req = settle(&mut c, "http://x/doc.json").expect("request");
        assert_eq!(req.url, "http://x/doc.json");
        assert!(matches!(c.phase(), FetchPhase::Fetching { .. }));

        let outcome = c.complete(req.generation, Ok(DOC.to_vec()));
        assert_eq!(outcome, Some(FetchOutcome::Decoded));
        assert_eq!(c.status(), Status::Success);
        assert_eq!(c.document().view, vec!["a"]);
        assert_eq!(c.phase(), FetchPhase::Idle);
    }

    #[test]
    fn empty_url_settles_without_a_request() {
        let mut c = FetchController::default();
        let req = settle(&mut c, "http://x").expect("request");
        c.complete(req.generation, Ok(DOC.to_vec()));

        assert_eq!(settle(&mut c, ""), None);
        assert_eq!(c.status(), Status::Empty);
        assert_eq!(*c.document(), ViewDocument::empty());
        assert_eq!(c.phase(), FetchPhase::Idle);
    }

    #[test]
    fn malformed_body_fails_and_resets_document() {
        let mut c = FetchController::default();
        let req = settle(&mut c, "http://x").expect("request");
        c.complete(req.generation, Ok(DOC.to_vec()));
        assert_eq!(c.document().data.len(), 1);

        let req = settle(&mut c, "http://x/broken").expect("request");
        let outcome = c.complete(req.generation, Ok(b"<html>404</html>".to_vec()));
        assert_eq!(outcome, Some(FetchOutcome::DecodeFailed));
        assert_eq!(c.status(), Status::Fail);
        assert_eq!(*c.document(), ViewDocument::empty());
    }

    #[test]
    fn transport_error_is_indistinguishable_from_decode_error() {
        let mut c = FetchController::default();
        let req = settle(&mut c, "http://unreachable").expect("request");
        let outcome = c.complete(
            req.generation,
            Err(TransportError::Request {
                url: req.url.clone(),
                reason: "connection refused".into(),
            }),
        );
        assert_eq!(outcome, Some(FetchOutcome::TransportFailed));
        assert_eq!(c.status(), Status::Fail);
        assert_eq!(*c.document(), ViewDocument::empty());
    }

    #[test]
    fn stale_response_is_dropped() {
        let mut c = FetchController::default();
        let first = settle(&mut c, "http://slow").expect("first");
        let second = settle(&mut c, "http://fast").expect("second");

        assert_eq!(c.complete(second.generation, Ok(DOC.to_vec())), Some(FetchOutcome::Decoded));
        assert_eq!(c.complete(first.generation, Ok(b"garbage".to_vec())), None);
        assert_eq!(c.status(), Status::Success);
        assert_eq!(c.document().view, vec!["a"]);
    }

    #[test]
    fn empty_input_supersedes_in_flight_request() {
        let mut c = FetchController::default();
        let req = settle(&mut c, "http://slow").expect("request");
        assert_eq!(settle(&mut c, ""), None);

        assert_eq!(c.complete(req.generation, Ok(DOC.to_vec())), None);
        assert_eq!(c.status(), Status::Empty);
    }

    #[test]
    fn observers_see_every_transition() {
        let statuses = Arc::new(Mutex::new(Vec::new()));
        let mut c = FetchController::default();
        let sink = Arc::clone(&statuses);
        c.subscribe_status(move |s| sink.lock().unwrap().push(*s));

        let req = settle(&mut c, "http://x").expect("request");
        c.complete(req.generation, Ok(DOC.to_vec()));
        let req = settle(&mut c, "http://x").expect("request");
        c.complete(req.generation, Ok(b"{}".to_vec()));
        settle(&mut c, "");

        assert_eq!(
            *statuses.lock().unwrap(),
            vec![Status::Empty, Status::Success, Status::Fail, Status::Empty]
        );
    }
}
