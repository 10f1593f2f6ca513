//! Configuration for refs tables.

/// When a refs table verifies its indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ConsistencyCheck {
    /// Never check.
    #[cfg_attr(not(debug_assertions), default)]
    Off,
    /// Check every written relation family when freezing into a snapshot.
    #[cfg_attr(debug_assertions, default)]
    OnFreeze,
}

/// Configuration for [`ImmutableRefsTable`](crate::ImmutableRefsTable) and
/// the mutable tables derived from it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefsConfig {
    /// When to verify that forward and reverse indices agree.
    pub consistency: ConsistencyCheck,

    /// Emit a `debug` event for every first-write copy.
    pub trace_copies: bool,
}

impl Default for RefsConfig {
    fn default() -> Self {
        Self {
            consistency: ConsistencyCheck::default(),
            trace_copies: true,
        }
    }
}

impl RefsConfig {
    /// Creates a configuration that checks consistency on every freeze,
    /// in release builds too.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            consistency: ConsistencyCheck::OnFreeze,
            trace_copies: true,
        }
    }

    /// Creates a configuration with no checks and no copy events.
    #[must_use]
    pub fn fast() -> Self {
        Self {
            consistency: ConsistencyCheck::Off,
            trace_copies: false,
        }
    }

    /// Builder method to set the consistency check.
    #[must_use]
    pub fn with_consistency(mut self, consistency: ConsistencyCheck) -> Self {
        self.consistency = consistency;
        self
    }

    /// Builder method to enable or disable copy events.
    #[must_use]
    pub fn with_copy_tracing(mut self, enabled: bool) -> Self {
        self.trace_copies = enabled;
        self
    }
}
