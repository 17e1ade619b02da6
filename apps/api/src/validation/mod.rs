// Validation: declarative rule tables plus the engine that evaluates them.
// Pure functions only; errors are return values, never panics or I/O.

pub mod engine;
pub mod rules;

pub use engine::{validate_field, validate_form, ErrorMap};
