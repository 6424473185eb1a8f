//! Unit tests for the task module.
//!
//! Domain tests cover wire decoding and value coercion; service tests run
//! against the in-memory engine, with a mocked engine where a response shape
//! cannot be produced otherwise.

mod domain_tests;
