//! Events delivered to the proxy and what handling them produced

use super::{ProxyRequest, ProxyResponse};

/// An event delivered by the host platform.
#[derive(Debug, Clone)]
pub enum ProxyEvent {
    /// A new version is being installed.
    Install,
    /// The installed version is taking over.
    Activate,
    /// An outgoing application request.
    Fetch(ProxyRequest),
    /// A message posted by the application.
    Message(serde_json::Value),
}

/// Why a request was left to default network handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassthroughReason {
    /// Not a `GET`.
    Method,
    /// Not `http` or `https`.
    Scheme,
}

impl PassthroughReason {
    /// Metric/log label.
    pub fn as_str(&self) -> &'static str {
        match self {
            PassthroughReason::Method => "method",
            PassthroughReason::Scheme => "scheme",
        }
    }
}

/// Result of handling a [`ProxyEvent`].
#[derive(Debug, Clone)]
pub enum EventOutcome {
    /// Install finished; the shell cache is populated.
    Installed,
    /// Activation finished; lists the generations that were deleted.
    Activated { deleted: Vec<String> },
    /// The proxy answered the request.
    Respond(ProxyResponse),
    /// The request was not intercepted.
    Passthrough(PassthroughReason),
    /// A control message was acted upon.
    MessageHandled,
    /// The message was not recognised.
    Ignored,
}

impl EventOutcome {
    /// The response, if the proxy answered a request.
    pub fn into_response(self) -> Option<ProxyResponse> {
        match self {
            EventOutcome::Respond(response) => Some(response),
            _ => None,
        }
    }
}
