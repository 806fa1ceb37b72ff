//! Unit test suites for the analysis engine.

mod extractor_tests;
mod index_tests;
