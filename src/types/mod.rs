//! Public types for the offline proxy API.

mod event;
mod message;
mod request;
mod response;

pub use event::{EventOutcome, PassthroughReason, ProxyEvent};
pub use message::ControlMessage;
pub use request::{ProxyRequest, RequestKey};
pub use response::{OFFLINE_API_MESSAGE, OFFLINE_HTML, ProxyResponse, ResponseSource};
