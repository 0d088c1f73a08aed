//! Shared test utilities for the marquee test suite.
//!
//! [`StubFetcher`] stands in for the network: responses are registered per
//! URL, every request is recorded, and a URL can be "gated" so its response
//! only arrives when the test says so. Gating is how the "last request wins"
//! tests force a slow load to finish after a fast one.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let (fetcher, release) = StubFetcher::new()
//!     .with_text("/shows/a/photos.json", "[]")
//!     .with_status("/shows/b/photos.json", 404)
//!     .gated("/shows/a/photos.json");
//! // ... start a load of "a", then of "b" ...
//! release.send(()).unwrap();
//! assert_eq!(fetcher.requests(), vec!["/shows/a/photos.json", "/shows/b/photos.json"]);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;

use tokio::sync::oneshot;

use crate::fetch::{Fetch, FetchError};
use crate::table::Record;

// =========================================================================
// Stub transport
// =========================================================================

#[derive(Default)]
pub struct StubFetcher {
    responses: HashMap<String, Result<String, FetchError>>,
    gates: RefCell<HashMap<String, oneshot::Receiver<()>>>,
    requests: RefCell<Vec<String>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to `url` with `body`.
    pub fn with_text(mut self, url: &str, body: &str) -> Self {
        self.responses.insert(url.to_string(), Ok(body.to_string()));
        self
    }

    /// Respond to `url` with a non-success HTTP status.
    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.responses.insert(
            url.to_string(),
            Err(FetchError::Status {
                url: url.to_string(),
                status,
            }),
        );
        self
    }

    /// Fail `url` at the transport level (timeout, refused, ...).
    pub fn with_error(mut self, url: &str, message: &str) -> Self {
        self.responses.insert(
            url.to_string(),
            Err(FetchError::Transport {
                url: url.to_string(),
                message: message.to_string(),
            }),
        );
        self
    }

    /// Hold the next response for `url` until the returned sender fires.
    pub fn gated(self, url: &str) -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().insert(url.to_string(), rx);
        (self, tx)
    }

    /// Every URL requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Fetch for StubFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        self.requests.borrow_mut().push(url.to_string());
        let gate = self.gates.borrow_mut().remove(url);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.responses.get(url).cloned().unwrap_or_else(|| {
            Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
        })
    }
}

// =========================================================================
// Row builders
// =========================================================================

/// Build a spreadsheet row from `(header, value)` pairs.
pub fn row(pairs: &[(&str, &str)]) -> Record {
    pairs.iter().copied().collect()
}
