pub mod collections;
pub mod demo;
pub mod nav;
pub mod profiling;
pub mod terrain;

// ============================================================================
// Profiling Macros
// ============================================================================

/// Log a message every 100 navigation ticks when `perf_stats` is enabled.
///
/// `$tick` is anything with a `u64` in field `.0`, normally `Res<NavTick>`.
/// Without the feature this expands to nothing and the arguments are not
/// evaluated.
///
/// # Example
/// ```ignore
/// profile_log!(tick, "{} nodes reached", reached);
/// ```
#[macro_export]
#[cfg(feature = "perf_stats")]
macro_rules! profile_log {
    ($tick:expr, $($arg:tt)*) => {
        if $tick.0 % 100 == 0 {
            bevy::prelude::info!($($arg)*);
        }
    };
}

#[macro_export]
#[cfg(not(feature = "perf_stats"))]
macro_rules! profile_log {
    ($tick:expr, $($arg:tt)*) => {};
}
