//! FIFO mailbox for pending actor messages.

mod fifo;

pub use fifo::Mailbox;
