//! File lifecycle configuration.

use serde::{Deserialize, Serialize};

/// Behaviour of `dispose` on a revision that is already disposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisposePolicy {
    /// Succeed without touching storage.
    #[default]
    Idempotent,
    /// Fail with a `Disposed` business error.
    Strict,
}

/// File lifecycle configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Policy for repeated disposal.
    #[serde(default)]
    pub dispose_policy: DisposePolicy,
}
