//! Application-level configuration.
//!
//! - [`GameParams`]: system prompt, batch schedule length, call deadline

pub mod game_params;

pub use game_params::GameParams;
