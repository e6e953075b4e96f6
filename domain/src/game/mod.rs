//! The ogiri game model.
//!
//! - [`response::Response`]: one generated answer and its points
//! - [`history::ConversationHistory`]: prior answers shown to later speakers
//! - [`ledger::ScoreLedger`]: per-backend point totals and standings
//! - [`schedule::SelectionPolicy`]: who speaks next
//! - [`state::SessionState`]: the round/verdict state machine

pub mod history;
pub mod ledger;
pub mod response;
pub mod schedule;
pub mod state;
