//! Error types for model construction and the super-k-mer codec.

use thiserror::Error;

/// Errors raised by model constructors and the super-k-mer encoder.
///
/// Invalid nucleotides in input data are not errors: they are data
/// conditions, carried by the `valid` flag of the produced k-mer values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The requested k-mer size does not fit in the chosen integer width.
    #[error("integer width of {width} bits has too low precision for k-mer size {k}")]
    PrecisionTooLow { k: usize, width: usize },

    /// The minimizer size is incompatible with the k-mer size, or too
    /// large for the m-mer lookup table to be materialized.
    #[error("bad sizes for k-mer {k} and minimizer {m}")]
    BadMinimizerSize { k: usize, m: usize },

    /// A run longer than the codec can represent was submitted to the
    /// super-k-mer encoder. Recoverable: split the run and retry.
    #[error("super-k-mer run of {len} k-mers exceeds the encodable maximum of {max}")]
    SuperKmerTooLong { len: usize, max: usize },
}
