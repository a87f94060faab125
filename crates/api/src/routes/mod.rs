//! API Routes

pub mod metrics;
pub mod tracker;
pub mod words;
