//! Warning collection for degraded conversions.

/// One recorded warning. `object` names the scene object whose material was
/// being converted and may be empty when no object context exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub message: String,
    pub object: String,
}

/// Append-only warning log, handed through a conversion by the caller.
///
/// Conversion never fails outright; this log is the only user-visible trace
/// that a graph degraded (unknown node types, fallback substitutions).
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and mirror it through the `log` facade.
    pub fn warn(&mut self, message: impl Into<String>, object: &str) {
        let message = message.into();
        if object.is_empty() {
            log::warn!("{message}");
        } else {
            log::warn!("{object}: {message}");
        }
        self.warnings.push(Warning {
            message,
            object: object.to_owned(),
        });
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}
