//! Shared test and benchmark utilities for the input sanitizer workspace.

pub mod bench_support;
