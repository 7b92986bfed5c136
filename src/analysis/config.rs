//! Configuration for the irreducible graph converter.

/// Configuration for [`IrreducibleGraphConverter`](crate::analysis::IrreducibleGraphConverter).
///
/// The depth limit only guards against inputs outside of the converter's contract. A
/// single-entry control-flow graph never comes close to it.
///
/// # Examples
///
/// ```rust
/// use cfgreduce::analysis::ConverterConfig;
///
/// let config = ConverterConfig::new().with_max_depth(16);
/// assert_eq!(config.max_depth, 16);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterConfig {
    /// Maximum nesting of split regions inside each other (default: 64).
    pub max_depth: usize,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

impl ConverterConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum nesting depth of split regions.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConverterConfig::default();
        assert_eq!(config.max_depth, 64);
        assert_eq!(ConverterConfig::new(), config);
    }
}
