use thiserror::Error;

/// Terminal failures of the resolution pipeline. Introspection gaps (no
/// source line, no parseable file) are absent values, never errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No import path, exact or fuzzy-guessed, resolves to anything.
    #[error("Could not find module in current environment: \"{input}\"")]
    NotFound { input: String },

    /// The parent module imported but its last segment did not.
    #[error("Cannot import \"{attr}\" from \"{module}\"")]
    AttributeNotFound { module: String, attr: String },
}
