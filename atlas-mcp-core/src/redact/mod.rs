//! Redaction engine for tool responses
//!
//! Pure functions over text and over structured values. Recognized sensitive
//! substrings (emails, card numbers, phone numbers, street addresses, SSNs)
//! are replaced with fixed `[<CATEGORY> REDACTED]` tokens before any tool
//! result leaves the process.
//!
//! The category passes run in a fixed order because the patterns overlap;
//! the order is part of the observable contract and is exercised by tests.

mod text;
mod value;

pub use text::redact_text;
pub use value::redact_value;
