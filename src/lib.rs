//! Deterministic True Health Age (THA) engine.
//!
//! Classifies raw questionnaire answers into discrete risk bins, sums
//! hazard ratios per domain in ln space under per-domain caps, and
//! converts the clamped total into an age shift through the Gompertz
//! mortality slope. Evaluation is a pure function of the configuration
//! and the answers: no fitting, no I/O, no clock.

pub mod answer;
pub mod config;
pub mod engine;
pub mod error;
pub mod output;

pub use answer::{Answer, AnswerMap};
pub use config::{load_config, Config};
pub use engine::{gompertz_b, ThaEngine, ThaResult, WhatIfOutcome};
pub use error::{Result, ThaError};
