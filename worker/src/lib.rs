//! Background boundary between the synchronous game engine and the remote
//! narrative/chat collaborators.
//!
//! Everything long-latency runs on a dedicated worker thread and lands in
//! single-slot, epoch-stamped inboxes. The engine never waits on any of it:
//! results are display-only, and results belonging to an abandoned match are
//! discarded at the mailbox instead of leaking into the next one.

pub use inbox::*;
pub use service::*;
pub use worker::*;

mod inbox;
mod service;
mod worker;
