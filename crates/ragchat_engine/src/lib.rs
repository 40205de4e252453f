//! Ragchat engine: HTTP dispatch, envelope decoding and effect execution.
mod codec;
mod dispatch;
mod session;
mod sink;
mod types;

pub use codec::{decode_progress, decode_recommend, decode_send};
pub use dispatch::{
    DispatchSettings, Dispatcher, ReqwestDispatcher, AJAX_HEADER, AJAX_MARKER, CSRF_HEADER,
};
pub use session::ChatSession;
pub use sink::UiSink;
pub use types::{TransportError, TransportErrorKind};
