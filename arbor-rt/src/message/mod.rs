//! Message trait and type-erased envelopes.

mod any;
mod traits;

pub use any::AnyMessage;
pub use traits::Message;
