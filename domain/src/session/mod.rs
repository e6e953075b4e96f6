//! Backend session primitives.
//!
//! - [`entities::Message`]: a single chat message sent to a vendor
//! - [`stream::StreamEvent`]: one event of a streamed answer

pub mod entities;
pub mod stream;
