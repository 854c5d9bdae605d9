//! Minimizer-augmented k-mer model.
//!
//! [`ModelMinimizer`] wraps a base model (direct or canonical) and an
//! m-mer sub-model of the same shape, and augments every produced k-mer
//! with its minimizer: the smallest of the `k - m + 1` m-mers inside the
//! window, under a pluggable comparator and an "allowed" filter that bans
//! low-complexity m-mers.
//!
//! M-mer folding is precomputed once into a lookup table of `4^m` entries:
//! each raw m-mer bit pattern maps to its canonical (strand-folded) form,
//! or to the all-ones sentinel when banned. The sentinel is the largest
//! possible m-mer, so a banned pattern can never beat a real candidate.
//!
//! Sliding is O(1) amortized: the incumbent minimizer ages by one position
//! per step and is only re-elected when it leaves the window or a strictly
//! smaller m-mer enters on the right.

use tracing::debug;

use crate::encoding::SeqData;
use crate::error::ModelError;
use crate::kmer_int::KmerInt;
use crate::model::{FromKmerSize, KmerModel, KmerValue, ModelBase};

/// Largest supported minimizer size. The lookup table holds `4^m`
/// entries, so this bounds its footprint to a few hundred megabytes in
/// the worst width.
pub const MAX_MINIMIZER_SIZE: usize = 12;

// ---------------------------------------------------------------------------
// Comparator
// ---------------------------------------------------------------------------

/// Ordering used to elect a minimizer among the m-mers of a window.
pub trait MinimizerOrd {
    /// The initial "best" for a fresh window; every real candidate must
    /// beat it. `mmer_max` is the largest representable m-mer.
    fn init<const W: usize>(&self, mmer_max: KmerInt<W>) -> KmerInt<W>;

    /// Whether `candidate` strictly beats `best`.
    fn is_less<const W: usize>(&self, candidate: KmerInt<W>, best: KmerInt<W>) -> bool;
}

/// The default comparator: plain unsigned ordering on m-mer values.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexMinimizerOrd;

impl MinimizerOrd for LexMinimizerOrd {
    #[inline]
    fn init<const W: usize>(&self, mmer_max: KmerInt<W>) -> KmerInt<W> {
        mmer_max
    }

    #[inline]
    fn is_less<const W: usize>(&self, candidate: KmerInt<W>, best: KmerInt<W>) -> bool {
        candidate < best
    }
}

// ---------------------------------------------------------------------------
// Allowed filter
// ---------------------------------------------------------------------------

/// Whether an m-mer may serve as a minimizer.
///
/// The shipped rule bans any m-mer containing two consecutive `A`s outside
/// its top two positions. Such m-mers are over-represented in genomic data
/// and would produce badly skewed partitions.
///
/// The test is branch-free: `t = !(x | x >> 2)` has both bits of digit `i`
/// set exactly when digits `i` and `i + 1` are both `A` (00), and
/// `(t >> 1) & t` condenses that to one bit per offending pair, masked to
/// the positions where a pair is disallowed.
pub fn is_allowed(mmer: u64, m: usize) -> bool {
    if m < 2 {
        return true;
    }
    let mask_low = (1u64 << (2 * (m - 2))) - 1;
    let mask_even = 0x5555_5555_5555_5555u64 & mask_low;
    let t = !(mmer | (mmer >> 2));
    (((t >> 1) & t) & mask_even) == 0
}

// ---------------------------------------------------------------------------
// Value shape
// ---------------------------------------------------------------------------

/// A k-mer value augmented with its minimizer.
///
/// `position` counts the remaining lifetime of the minimizer in window
/// slots: a minimizer that just entered at the right end has position
/// `nb_minimizers - 1`, ages by one per slide, and a negative position
/// means no valid minimizer is known for the window.
#[derive(Debug, Clone, Copy, Default)]
pub struct KmerMinimizer<V, const W: usize> {
    kmer: V,
    minimizer: V,
    position: i16,
    changed: bool,
}

impl<V: KmerValue<W>, const W: usize> KmerMinimizer<V, W> {
    /// The underlying k-mer value.
    #[inline]
    pub fn kmer(&self) -> &V {
        &self.kmer
    }

    /// The minimizer, as a value of the base model's shape.
    #[inline]
    pub fn minimizer(&self) -> &V {
        &self.minimizer
    }

    /// Remaining lifetime of the minimizer; negative when the window has
    /// no valid minimizer.
    #[inline]
    pub fn position(&self) -> i16 {
        self.position
    }

    /// Whether the last slide changed the minimizer (or re-elected it
    /// from scratch).
    #[inline]
    pub fn has_changed(&self) -> bool {
        self.changed
    }
}

impl<V: KmerValue<W>, const W: usize> KmerValue<W> for KmerMinimizer<V, W> {
    #[inline]
    fn value(&self) -> KmerInt<W> {
        self.kmer.value()
    }

    #[inline]
    fn forward(&self) -> KmerInt<W> {
        self.kmer.forward()
    }

    #[inline]
    fn is_valid(&self) -> bool {
        self.kmer.is_valid()
    }

    fn from_value(value: KmerInt<W>) -> Self {
        Self {
            kmer: V::from_value(value),
            minimizer: V::default(),
            position: -1,
            changed: false,
        }
    }
}

// ---------------------------------------------------------------------------
// ModelMinimizer
// ---------------------------------------------------------------------------

/// Model wrapping a base model of width k and an m-mer sub-model, with a
/// precomputed folding table for minimizer election.
#[derive(Debug, Clone)]
pub struct ModelMinimizer<const W: usize, M, C = LexMinimizerOrd> {
    kmer_model: M,
    mmer_model: M,
    cmp: C,
    nb_minimizers: usize,
    mmer_mask: u64,
    /// Maps every raw m-mer bit pattern to its canonical allowed form, or
    /// to `mmer_mask` when banned.
    mmer_lut: Vec<KmerInt<W>>,
    minimizer_default: KmerInt<W>,
}

impl<const W: usize, M, C> ModelMinimizer<W, M, C>
where
    M: KmerModel<W> + FromKmerSize,
    C: MinimizerOrd,
{
    /// Create a minimizer model with the default comparator.
    pub fn new(kmer_size: usize, minimizer_size: usize) -> Result<Self, ModelError>
    where
        C: Default,
    {
        Self::with_comparator(kmer_size, minimizer_size, C::default())
    }

    /// Create a minimizer model with an explicit comparator.
    pub fn with_comparator(
        kmer_size: usize,
        minimizer_size: usize,
        cmp: C,
    ) -> Result<Self, ModelError> {
        if minimizer_size == 0
            || minimizer_size >= kmer_size
            || minimizer_size > MAX_MINIMIZER_SIZE
        {
            return Err(ModelError::BadMinimizerSize {
                k: kmer_size,
                m: minimizer_size,
            });
        }

        let kmer_model = M::from_kmer_size(kmer_size)?;
        let mmer_model = M::from_kmer_size(minimizer_size)?;

        let nb_minimizers = kmer_size - minimizer_size + 1;
        let mmer_mask = (1u64 << (2 * minimizer_size)) - 1;
        let minimizer_default = cmp.init(mmer_model.kmer_max());

        let lut_size = 1usize << (2 * minimizer_size);
        let mut mmer_lut = Vec::with_capacity(lut_size);
        for i in 0..lut_size as u64 {
            let mmer = KmerInt::<W>::from_u64(i);
            let rev = mmer.reverse_complement(minimizer_size);
            let mut canon = mmer.min(rev);
            if !is_allowed(canon.to_u64(), minimizer_size) {
                canon = KmerInt::from_u64(mmer_mask);
            }
            mmer_lut.push(canon);
        }
        debug!(
            k = kmer_size,
            m = minimizer_size,
            entries = lut_size,
            "built m-mer folding table"
        );

        Ok(Self {
            kmer_model,
            mmer_model,
            cmp,
            nb_minimizers,
            mmer_mask,
            mmer_lut,
            minimizer_default,
        })
    }

    /// The sub-model managing m-mers.
    pub fn mmer_model(&self) -> &M {
        &self.mmer_model
    }

    /// Number of m-mers in a k-mer window (`k - m + 1`).
    pub fn nb_minimizers(&self) -> usize {
        self.nb_minimizers
    }

    /// One-shot minimizer of an arbitrary k-mer value, outside any
    /// sliding window.
    pub fn minimizer_value(&self, kmer: KmerInt<W>) -> u64 {
        let mut value = KmerMinimizer::<M::Value, W>::from_value(kmer);
        self.compute_minimizer(&mut value);
        value.minimizer.value().to_u64()
    }

    /// Elect the minimizer of the whole window from scratch.
    ///
    /// Peels m-mers off the low end of a shifting copy of the forward
    /// word, walking positions from newest (`nb_minimizers - 1`) to
    /// oldest (0); under a strict comparator the newest occurrence of the
    /// minimum therefore keeps the election on ties.
    fn compute_minimizer(&self, value: &mut KmerMinimizer<M::Value, W>) {
        value.minimizer = M::Value::from_value(self.minimizer_default);
        value.position = -1;
        value.changed = true;

        let mut forward = value.kmer.forward();
        for idx in (0..self.nb_minimizers).rev() {
            let mmer = self.mmer_lut[(forward.to_u64() & self.mmer_mask) as usize];
            if self.cmp.is_less(mmer, value.minimizer.value()) {
                value.minimizer = M::Value::from_value(mmer);
                value.position = idx as i16;
            }
            forward = forward >> 2;
        }
    }
}

impl<const W: usize, M, C> KmerModel<W> for ModelMinimizer<W, M, C>
where
    M: KmerModel<W> + FromKmerSize,
    C: MinimizerOrd,
{
    type Value = KmerMinimizer<M::Value, W>;

    fn base(&self) -> &ModelBase<W> {
        self.kmer_model.base()
    }

    fn first(&self, data: &SeqData<'_>, value: &mut Self::Value) -> i32 {
        let bad = self.kmer_model.first(data, &mut value.kmer);
        self.compute_minimizer(value);
        bad
    }

    fn next(&self, code: u8, valid: bool, value: &mut Self::Value) {
        self.kmer_model.next(code, valid, &mut value.kmer);

        // The m-mer that just entered at the right end of the window.
        let mmer = self.mmer_lut[(value.kmer.forward().to_u64() & self.mmer_mask) as usize];

        // The incumbent ages one slot.
        value.position -= 1;
        value.changed = false;

        if self.cmp.is_less(mmer, value.minimizer.value()) {
            value.minimizer = M::Value::from_value(mmer);
            value.position = (self.nb_minimizers - 1) as i16;
            value.changed = true;
        } else if value.position < 0 {
            // The incumbent left the window; re-elect over all m-mers.
            self.compute_minimizer(value);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
