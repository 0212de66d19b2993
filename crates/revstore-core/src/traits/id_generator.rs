//! Identifier generation contract.

/// Produces globally unique identifiers for new files.
pub trait IdGenerator: Send + Sync + std::fmt::Debug + 'static {
    /// Return the next identifier. Never returns the same value twice.
    fn next_value(&self) -> String;
}
