//! Super-k-mer packing: runs of consecutive canonical k-mers sharing a
//! minimizer, squeezed into two integers.
//!
//! A run of L k-mers from one sequence overlaps heavily: after the first
//! k-mer, each one adds a single nucleotide. The codec therefore stores
//! the seed k-mer in full and the L - 1 trailing nucleotides as a packed
//! chain, with the run length in the top 8 bits of the chain word.
//! Decoding replays the chain, rebuilding forward and reverse complement
//! in lockstep.
//!
//! The view itself is non-owning: it borrows a slice of a caller buffer,
//! so grouping a sequence into super-k-mers allocates nothing beyond that
//! buffer.

use crate::encoding::{complement, SeqData};
use crate::error::ModelError;
use crate::kmer_int::KmerInt;
use crate::minimizer::{MinimizerOrd, ModelMinimizer};
use crate::model::{KmerCanonical, KmerModel, KmerValue, ModelCanonical};

/// Sentinel minimizer value of a super-k-mer not yet tied to a real run.
pub const DEFAULT_MINIMIZER: u64 = 1_000_000_000;

/// Hard cap on the number of k-mers per super-k-mer (the run length is
/// stored on 8 bits). Narrow integer widths cap it further; see
/// [`max_run`].
pub const MAX_RUN: usize = 255;

/// Longest encodable run for the width `W`: the packed nucleotide chain
/// and the 8-bit length must share one integer.
pub const fn max_run<const W: usize>() -> usize {
    let by_width = (KmerInt::<W>::BITS - 8) / 2 + 1;
    if by_width < MAX_RUN {
        by_width
    } else {
        MAX_RUN
    }
}

// ---------------------------------------------------------------------------
// SuperKmer
// ---------------------------------------------------------------------------

/// A run of consecutive canonical k-mers sharing one minimizer, borrowed
/// from a caller buffer.
#[derive(Debug)]
pub struct SuperKmer<'a, const W: usize> {
    kmer_size: usize,
    /// Minimizer value shared by every k-mer of the run.
    pub minimizer: u64,
    kmers: &'a [KmerCanonical<W>],
}

impl<'a, const W: usize> SuperKmer<'a, W> {
    /// Wrap a run of k-mers. The caller guarantees they are consecutive
    /// k-mers of one sequence sharing `minimizer`.
    pub fn new(kmer_size: usize, minimizer: u64, kmers: &'a [KmerCanonical<W>]) -> Self {
        Self {
            kmer_size,
            minimizer,
            kmers,
        }
    }

    /// Number of k-mers in the run.
    pub fn len(&self) -> usize {
        self.kmers.len()
    }

    /// Whether the run holds no k-mers.
    pub fn is_empty(&self) -> bool {
        self.kmers.is_empty()
    }

    /// Whether the run is tied to an elected minimizer.
    pub fn is_valid(&self) -> bool {
        self.minimizer != DEFAULT_MINIMIZER
    }

    /// The k-mers of the run.
    pub fn kmers(&self) -> &'a [KmerCanonical<W>] {
        self.kmers
    }

    /// K-mer size of the run.
    pub fn kmer_size(&self) -> usize {
        self.kmer_size
    }

    /// Pack the run into two integers appended to `sink`: first the
    /// nucleotide chain word (trailing nucleotide of each k-mer after the
    /// seed, most recent in the low bits, run length in the top 8 bits),
    /// then the seed k-mer's forward value.
    ///
    /// Fails with [`ModelError::SuperKmerTooLong`] when the run does not
    /// fit the chain word; the caller splits the run and retries.
    pub fn encode(&self, sink: &mut Vec<KmerInt<W>>) -> Result<(), ModelError> {
        assert!(!self.kmers.is_empty(), "cannot encode an empty run");
        let len = self.kmers.len();
        if len > max_run::<W>() {
            return Err(ModelError::SuperKmerTooLong {
                len,
                max: max_run::<W>(),
            });
        }

        let mut compacted = KmerInt::<W>::ZERO;
        for kmer in &self.kmers[1..] {
            compacted = (compacted << 2) | (kmer.forward().to_u64() & 3);
        }
        compacted = compacted | (KmerInt::from_u64(len as u64) << (KmerInt::<W>::BITS - 8));

        sink.push(compacted);
        sink.push(self.kmers[0].forward());
        Ok(())
    }

    /// Read one encoded run (two integers) from `source` and rebuild its
    /// k-mers into `out`, replacing the previous contents.
    ///
    /// Returns the number of k-mers decoded, or `None` when the source is
    /// exhausted. The input is trusted to come from
    /// [`encode`](SuperKmer::encode) at the same k.
    pub fn decode<I>(
        kmer_size: usize,
        source: &mut I,
        out: &mut Vec<KmerCanonical<W>>,
    ) -> Option<usize>
    where
        I: Iterator<Item = KmerInt<W>>,
    {
        let compacted = source.next()?;
        let seed = source.next()?;

        let count = ((compacted >> (KmerInt::<W>::BITS - 8)).to_u64() & 0xFF) as usize;
        let kmer_mask = KmerInt::<W>::low_mask(2 * kmer_size);
        let shift = 2 * (kmer_size - 1);

        let mut fwd = seed;
        let mut rev = seed.reverse_complement(kmer_size);

        out.clear();
        out.reserve(count);
        for i in 0..count {
            out.push(KmerCanonical::from_strands(fwd, rev));
            let rem = count - i;
            if rem < 2 {
                break;
            }
            let nt = (compacted >> (2 * (rem - 2))).to_u64() as u8 & 3;
            fwd = ((fwd << 2) | nt as u64) & kmer_mask;
            rev = ((rev >> 2) | (KmerInt::from_u64(complement(nt) as u64) << shift)) & kmer_mask;
        }
        Some(out.len())
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Split a sequence into maximal runs of consecutive canonical k-mers
/// sharing a minimizer, and hand each run to `callback` as a non-owning
/// [`SuperKmer`] over `kmers`.
///
/// Invalid k-mers break runs and belong to none. Runs longer than the
/// width allows are split so that every emitted run is encodable.
/// Returns false when `data` holds fewer than k nucleotides.
pub fn for_each_super_kmer<const W: usize, C, F>(
    model: &ModelMinimizer<W, ModelCanonical<W>, C>,
    data: &SeqData<'_>,
    kmers: &mut Vec<KmerCanonical<W>>,
    mut callback: F,
) -> bool
where
    C: MinimizerOrd,
    F: FnMut(&SuperKmer<'_, W>),
{
    let k = model.kmer_size();
    kmers.clear();
    let mut minis: Vec<(u64, bool)> = Vec::new();
    let ok = model.iterate(data, |v, _| {
        kmers.push(*v.kmer());
        minis.push((v.minimizer().value().to_u64(), v.is_valid()));
    });
    if !ok {
        return false;
    }

    let mut start: Option<usize> = None;
    for i in 0..kmers.len() {
        let (mini, valid) = minis[i];
        match start {
            Some(s) if valid && mini == minis[s].0 && i - s < max_run::<W>() => {}
            _ => {
                if let Some(s) = start {
                    callback(&SuperKmer::new(k, minis[s].0, &kmers[s..i]));
                }
                start = if valid { Some(i) } else { None };
            }
        }
    }
    if let Some(s) = start {
        callback(&SuperKmer::new(k, minis[s].0, &kmers[s..]));
    }
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
