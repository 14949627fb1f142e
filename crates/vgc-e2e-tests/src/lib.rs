//! End-to-end tests live in `tests/`; this crate intentionally exports
//! nothing.
