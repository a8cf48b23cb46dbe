// ─────────────────────────────────────────────────────────────────────
// SK Spin-Glass Kernel — Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for the kernel.
///
/// The numerical core never fails: out-of-range inputs are clamped and
/// reported as corrections. These variants cover the surrounding layers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkError {
    /// Configuration could not be parsed or failed validation.
    #[error("config error: {0}")]
    Config(String),

    /// Invalid input handed to an operation (length mismatch, bad index).
    #[error("validation error: {0}")]
    Validation(String),

    /// A lattice node index or (m, n) pair outside the current lattice.
    #[error("lattice error: node {index} out of range for {node_count} nodes")]
    Lattice { index: usize, node_count: usize },

    /// Numerical error (NaN/Inf in computation).
    #[error("numerical error: {0}")]
    Numerical(String),
}

pub type SkResult<T> = Result<T, SkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_config() {
        let err = SkError::Config("n must be >= 3".into());
        assert_eq!(err.to_string(), "config error: n must be >= 3");
    }

    #[test]
    fn test_display_lattice() {
        let err = SkError::Lattice {
            index: 30,
            node_count: 25,
        };
        assert_eq!(
            err.to_string(),
            "lattice error: node 30 out of range for 25 nodes"
        );
    }

    #[test]
    fn test_error_trait_object() {
        let err = SkError::Numerical("potential is NaN".into());
        let dyn_err: &dyn std::error::Error = &err;
        assert!(dyn_err.to_string().contains("NaN"));
    }
}
