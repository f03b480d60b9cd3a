//! Benchmark suites run by `run-benchmarks`

pub mod export;
pub mod fixtures;
pub mod parsing;
pub mod serialization;
