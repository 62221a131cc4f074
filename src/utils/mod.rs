//! Cross-cutting helpers.
//!
//! - `logging`: Tracing subscriber initialization with json/pretty formats.

pub mod logging;
