// Layer 1: Standard library imports
use std::fmt::Debug;

// Layer 2: Third-party crate imports
// (none for this module)

// Layer 3: Internal module imports
// (none)

/// Marker trait for values that can travel through actor mailboxes.
///
/// Implemented automatically for every type satisfying the bounds, so plain
/// values (`i64`, `String`, user enums) are messages without ceremony:
///
/// ```rust
/// use arbor_rt::message::Message;
///
/// fn assert_message<M: Message>() {}
///
/// assert_message::<i64>();
/// assert_message::<String>();
/// ```
///
/// `Clone` keeps a copy of the offending message available to supervision
/// when a behavior faults; `Debug` feeds structured logging.
pub trait Message: Clone + Debug + Send + Sync + 'static {}

impl<T> Message for T where T: Clone + Debug + Send + Sync + 'static {}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct CustomMessage {
        #[allow(dead_code)]
        payload: String,
    }

    fn assert_message<M: Message>() {}

    #[test]
    fn test_blanket_impl_covers_plain_types() {
        assert_message::<i64>();
        assert_message::<&'static str>();
        assert_message::<Vec<u8>>();
        assert_message::<CustomMessage>();
    }
}
