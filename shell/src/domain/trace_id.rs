//! Correlation id shared by the log lines and error payloads of one request.
//!
//! Held in a Tokio task-local, so anything running inside the request future
//! (handlers, the session store) can read it. Spawned tasks do not inherit
//! it.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Header that carries the id in both directions.
pub const TRACE_ID_HEADER: &str = "trace-id";

tokio::task_local! {
    static CURRENT: TraceId;
}

/// Correlation id for one inbound request.
///
/// # Examples
/// ```
/// use marketplace_shell::TraceId;
///
/// let inherited = TraceId::inherit_or_new(Some("6f1c0b55-1f7e-4a3e-9a47-3c0f2d1e9b10"));
/// assert_eq!(inherited.to_string(), "6f1c0b55-1f7e-4a3e-9a47-3c0f2d1e9b10");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Reuse a caller supplied id when it is a well-formed UUID, otherwise
    /// mint a new one.
    #[must_use]
    pub fn inherit_or_new(supplied: Option<&str>) -> Self {
        supplied
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or_default()
    }

    /// Id of the request currently being served, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Run `fut` with `self` as the current id.
    pub async fn scope<F: Future>(self, fut: F) -> F::Output {
        CURRENT.scope(self, fut).await
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
