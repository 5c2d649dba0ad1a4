//! Collector tuning, mirroring the shape of a production GC's config: a
//! plain struct with sane defaults, validated once at startup, and
//! overridable from the environment for CI/benchmark runs.

use crate::error::{GcError, GcResult};

/// Tuning knobs for the mark-and-sweep collector.
///
/// The real-world analogue this is simplified from runs concurrent,
/// generational, region-based collection; this collector is a single
/// generation, stop-the-world, whole-heap mark-sweep, so there is no
/// region size, no NUMA affinity, and no relocation policy to configure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GcConfig {
    /// Heap size (bytes) below which a collection is never triggered.
    pub initial_threshold: usize,
    /// After a collection, the next threshold is
    /// `max(initial_threshold, bytes_allocated * growth_factor)`.
    pub growth_factor: usize,
    /// Emit a `tracing` event summarizing each collection.
    pub verbose: bool,
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            initial_threshold: 1 << 20,
            growth_factor: 2,
            verbose: false,
        }
    }
}

impl GcConfig {
    pub fn validate(&self) -> GcResult<()> {
        if self.initial_threshold == 0 {
            return Err(GcError::HeapExhausted {
                requested: 0,
                limit: 0,
            });
        }
        if self.growth_factor == 0 {
            return Err(GcError::HeapExhausted {
                requested: 0,
                limit: 0,
            });
        }
        Ok(())
    }

    /// Reads `MSC_GC_INITIAL_THRESHOLD`, `MSC_GC_GROWTH_FACTOR`, and
    /// `MSC_GC_VERBOSE`, falling back to [`GcConfig::default`] for any
    /// variable that is unset or fails to parse.
    pub fn from_env() -> Self {
        let default = Self::default();
        let initial_threshold = std::env::var("MSC_GC_INITIAL_THRESHOLD")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default.initial_threshold);
        let growth_factor = std::env::var("MSC_GC_GROWTH_FACTOR")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default.growth_factor);
        let verbose = std::env::var("MSC_GC_VERBOSE")
            .ok()
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(default.verbose);
        Self {
            initial_threshold,
            growth_factor,
            verbose,
        }
    }
}
