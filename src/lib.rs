//! K-mer modeling core for genome assembly.
//!
//! This crate interprets DNA sequences as streams of fixed-length words
//! packed into compact integers, and slides windowed computations over
//! them. It provides three interlocking models:
//!
//! - [`ModelDirect`]: forward-strand k-mers;
//! - [`ModelCanonical`]: both strands, resolved to the smaller reading;
//! - [`ModelMinimizer`]: either of the above, augmented with the smallest
//!   m-mer of each window.
//!
//! plus a [`SuperKmer`] codec that packs runs of consecutive canonical
//! k-mers sharing a minimizer into two integers.
//!
//! K-mer integers are monomorphized over a closed set of widths
//! ([`Kmer32`] through [`Kmer128`], i.e. one to four 64-bit limbs);
//! dispatch over the width once at your own boundary and everything below
//! is branch-free.
//!
//! Models are immutable after construction and safe to share across
//! threads; each iteration carries its own k-mer state. Invalid input
//! nucleotides are not errors: they surface as a `valid` flag on the
//! produced values and poison exactly the windows that contain them.
//!
//! ```
//! use kmercore::{KmerModel, KmerValue, ModelCanonical, SeqData};
//!
//! let model = ModelCanonical::<1>::new(5).unwrap();
//! let mut kmers = Vec::new();
//! model.build(&SeqData::ascii(b"CATTGATAGTGG"), &mut kmers);
//! assert_eq!(kmers.len(), 8);
//! assert_eq!(model.to_string(kmers[0].value()), "CAATG");
//! ```

pub mod encoding;
pub mod error;
pub mod kmer_int;
pub mod minimizer;
pub mod model;
pub mod superkmer;

pub use encoding::{Encoding, SeqData};
pub use error::ModelError;
pub use kmer_int::{Kmer128, Kmer32, Kmer64, Kmer96, KmerInt};
pub use minimizer::{KmerMinimizer, LexMinimizerOrd, MinimizerOrd, ModelMinimizer};
pub use model::{
    FromKmerSize, KmerCanonical, KmerCount, KmerDirect, KmerModel, KmerValue, ModelCanonical,
    ModelDirect,
};
pub use superkmer::{for_each_super_kmer, SuperKmer};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
