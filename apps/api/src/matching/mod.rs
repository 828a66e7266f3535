//! Deterministic matching engine: skill extraction, job scoring, batch
//! filtering, and API-free keyword analysis. Nothing in this module calls
//! the model — callers get the same ranking for the same inputs, every time.

pub mod filters;
pub mod keywords;
pub mod scoring;
pub mod skills;
