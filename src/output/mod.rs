pub mod formatter;

pub use formatter::{summarize, to_pretty_json, Summary};
