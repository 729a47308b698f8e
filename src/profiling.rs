//! Performance profiling utilities
//!
//! Only active with the `perf_stats` feature; zero overhead otherwise.

pub use waymark_macros::profile;
