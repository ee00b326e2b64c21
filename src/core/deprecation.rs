//! core::deprecation
//!
//! Deprecation notices for legacy metadata access.
//!
//! # Design
//!
//! Legacy accessors and the compatibility adapters report through a
//! [`DeprecationSink`] owned by the host. The sink receives a subject (what
//! was used) and an optional replacement hint. A silent sink is valid.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// A single deprecation notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecationNotice {
    /// What was used.
    pub subject: String,
    /// What to use instead.
    pub replacement: Option<String>,
}

impl fmt::Display for DeprecationNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.replacement {
            Some(replacement) => write!(
                f,
                "{} is deprecated. Use {} instead.",
                self.subject, replacement
            ),
            None => write!(f, "{} is deprecated.", self.subject),
        }
    }
}

/// Receiver of deprecation notices.
pub trait DeprecationSink: Send + Sync {
    fn deprecate(&self, subject: &str, replacement: Option<&str>);
}

/// Drops every notice.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSink;

impl DeprecationSink for SilentSink {
    fn deprecate(&self, _subject: &str, _replacement: Option<&str>) {}
}

/// Emits each notice as a `tracing` warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DeprecationSink for TracingSink {
    fn deprecate(&self, subject: &str, replacement: Option<&str>) {
        tracing::warn!(
            target: "specmeta::deprecation",
            subject,
            replacement = replacement.unwrap_or("-"),
            "deprecated metadata access"
        );
    }
}

/// Keeps every notice in memory, in arrival order.
///
/// Useful for hosts that batch notices into a summary, and for tests.
#[derive(Debug, Default)]
pub struct CollectingSink {
    notices: Mutex<Vec<DeprecationNotice>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the notices received so far.
    pub fn notices(&self) -> Vec<DeprecationNotice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Subjects of the notices received so far.
    pub fn subjects(&self) -> Vec<String> {
        self.notices().into_iter().map(|n| n.subject).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl DeprecationSink for CollectingSink {
    fn deprecate(&self, subject: &str, replacement: Option<&str>) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(DeprecationNotice {
                subject: subject.to_string(),
                replacement: replacement.map(str::to_string),
            });
    }
}

/// Shared handle to the host's sink.
pub type SharedSink = Arc<dyn DeprecationSink>;

/// A sink that drops every notice.
pub fn silent() -> SharedSink {
    Arc::new(SilentSink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_sink_keeps_order() {
        let sink = CollectingSink::new();
        sink.deprecate("first", None);
        sink.deprecate("second", Some("third"));
        assert_eq!(sink.subjects(), vec!["first", "second"]);
        assert_eq!(
            sink.notices()[1].to_string(),
            "second is deprecated. Use third instead."
        );
    }

    #[test]
    fn silent_sink_is_a_no_op() {
        let sink = silent();
        sink.deprecate("anything", None);
    }

    #[test]
    fn notice_without_replacement() {
        let notice = DeprecationNotice {
            subject: "the `describes` key".into(),
            replacement: None,
        };
        assert_eq!(notice.to_string(), "the `describes` key is deprecated.");
    }
}
