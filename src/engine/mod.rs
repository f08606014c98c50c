pub(crate) mod classify;
pub mod compute;
pub(crate) mod derived;
pub mod scenario;
pub mod validation;

pub use compute::{gompertz_b, ThaEngine, ThaResult};
pub use scenario::WhatIfOutcome;
pub use validation::validate_config;
