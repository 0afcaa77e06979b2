//! Intron gap compression
//!
//! Rewrites exon boundaries and association positions into a coordinate space
//! where every intron has the same small width.
//!
//! The algorithm:
//! 1. Stable-sort exons by start
//! 2. For each consecutive pair compute `gap = start(next) - end(prev)`
//! 3. `shift = gap - new_gap_width`
//! 4. Move every downstream exon, and the associations beyond the gap, by `-shift`
//!
//! Steps run in increasing order and each works on coordinates already moved
//! by the previous ones.

use crate::core::association::AssociationRecord;
use crate::core::error::{CoreError, CoreResult};
use crate::core::exon::ExonInterval;
use log::{debug, warn};

/// Default intron width after compression
pub const DEFAULT_GAP_WIDTH: i64 = 10;

/// How association positions are carried through each compression step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompatMode {
    /// Monotone remapping
    /// - Positions at or after the next exon move with it
    /// - Intronic positions are clamped into the compressed intron
    /// - Order, containment and idempotence hold
    #[default]
    Improved,
    /// Legacy remapping
    /// - A position moves iff it is strictly greater than the next exon's
    ///   already-shifted start
    /// - Intronic positions can land behind earlier exons
    Strict,
}

impl CompatMode {
    /// Parse from string (for CLI argument)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "improved" | "default" => Some(CompatMode::Improved),
            "strict" | "legacy" => Some(CompatMode::Strict),
            _ => None,
        }
    }

    /// Check if strict mode is enabled
    pub fn is_strict(&self) -> bool {
        matches!(self, CompatMode::Strict)
    }
}

/// What to do when consecutive sorted exons overlap (negative gap)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    /// Use the negative gap as is; downstream coordinates move right
    #[default]
    Passthrough,
    /// Treat a negative gap as zero
    Clamp,
    /// Fail with `InvalidInput`
    Reject,
}

/// One gap of the compression, expressed in the frame it was applied in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionStep {
    /// End of the upstream exon
    pub prev_end: i64,
    /// Start of the downstream exon before this step
    pub next_start: i64,
    /// Gap width used to compute the shift (after any clamping)
    pub gap: i64,
    /// Amount subtracted from downstream coordinates
    pub shift: i64,
}

impl CompressionStep {
    /// Start of the downstream exon after this step
    pub fn shifted_start(&self) -> i64 {
        self.next_start - self.shift
    }
}

/// The sequence of shifts produced by one compression
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompressionMap {
    pub new_gap_width: i64,
    pub steps: Vec<CompressionStep>,
}

impl CompressionMap {
    /// Per-gap shifts, in step order
    pub fn shifts(&self) -> Vec<i64> {
        self.steps.iter().map(|s| s.shift).collect()
    }

    /// Total number of bases removed (negative if gaps were widened)
    pub fn total_shift(&self) -> i64 {
        self.steps.iter().map(|s| s.shift).sum()
    }

    /// Carry a position through every step
    pub fn map_position(&self, position: i64, mode: CompatMode) -> i64 {
        self.steps.iter().fold(position, |x, step| match mode {
            CompatMode::Improved => {
                if x >= step.next_start {
                    x - step.shift
                } else if x > step.prev_end {
                    x.min(step.prev_end + self.new_gap_width)
                } else {
                    x
                }
            }
            CompatMode::Strict => {
                if x > step.shifted_start() {
                    x - step.shift
                } else {
                    x
                }
            }
        })
    }
}

/// Output of a compression
#[derive(Debug, Clone, PartialEq)]
pub struct Compressed {
    /// Associations with remapped positions, input order kept
    pub associations: Vec<AssociationRecord>,
    /// Exons sorted by input start, with remapped boundaries
    pub exons: Vec<ExonInterval>,
    pub map: CompressionMap,
}

/// Compresses intron gaps to a fixed width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapCompressor {
    new_gap_width: i64,
    compat_mode: CompatMode,
    overlap_policy: OverlapPolicy,
}

impl Default for GapCompressor {
    fn default() -> Self {
        Self {
            new_gap_width: DEFAULT_GAP_WIDTH,
            compat_mode: CompatMode::default(),
            overlap_policy: OverlapPolicy::default(),
        }
    }
}

impl GapCompressor {
    /// Create a compressor; fails with `InvalidInput` for a negative width
    pub fn new(new_gap_width: i64) -> CoreResult<Self> {
        if new_gap_width < 0 {
            return Err(CoreError::InvalidInput(format!(
                "new gap width must be >= 0, got {}",
                new_gap_width
            )));
        }
        Ok(Self {
            new_gap_width,
            ..Self::default()
        })
    }

    /// Select how associations are remapped
    pub fn with_compat_mode(mut self, compat_mode: CompatMode) -> Self {
        self.compat_mode = compat_mode;
        self
    }

    /// Select how overlapping exons are handled
    pub fn with_overlap_policy(mut self, overlap_policy: OverlapPolicy) -> Self {
        self.overlap_policy = overlap_policy;
        self
    }

    pub fn new_gap_width(&self) -> i64 {
        self.new_gap_width
    }

    pub fn compat_mode(&self) -> CompatMode {
        self.compat_mode
    }

    pub fn overlap_policy(&self) -> OverlapPolicy {
        self.overlap_policy
    }

    /// Compress the gaps between `exons`, remapping `associations` alongside
    ///
    /// Inputs need not be sorted. Fails with `InvalidInput` when `exons` is
    /// empty, or under `OverlapPolicy::Reject` when two exons overlap.
    pub fn compress(
        &self,
        exons: &[ExonInterval],
        associations: &[AssociationRecord],
    ) -> CoreResult<Compressed> {
        if exons.is_empty() {
            return Err(CoreError::InvalidInput("no exons to compress".to_string()));
        }

        let mut exons = exons.to_vec();
        let mut associations = associations.to_vec();

        // Stable: equal starts keep their input order
        exons.sort_by_key(|e| e.start);

        let map = self.plan(&mut exons)?;

        for record in associations.iter_mut() {
            record.position = map.map_position(record.position, self.compat_mode);
        }

        Ok(Compressed {
            associations,
            exons,
            map,
        })
    }

    /// Shift sorted exons in place and record each step
    fn plan(&self, exons: &mut [ExonInterval]) -> CoreResult<CompressionMap> {
        let mut map = CompressionMap {
            new_gap_width: self.new_gap_width,
            steps: Vec::with_capacity(exons.len().saturating_sub(1)),
        };

        for i in 0..exons.len().saturating_sub(1) {
            let prev_end = exons[i].end;
            let next_start = exons[i + 1].start;
            let mut gap = next_start - prev_end;

            if gap < 0 {
                match self.overlap_policy {
                    OverlapPolicy::Reject => {
                        return Err(CoreError::InvalidInput(format!(
                            "exons {} and {} overlap by {} bases",
                            exons[i].exon_id, exons[i + 1].exon_id, -gap
                        )));
                    }
                    OverlapPolicy::Clamp => {
                        warn!(
                            "Exons {} and {} overlap by {} bases; clamping gap to 0",
                            exons[i].exon_id, exons[i + 1].exon_id, -gap
                        );
                        gap = 0;
                    }
                    OverlapPolicy::Passthrough => {
                        warn!(
                            "Exons {} and {} overlap by {} bases",
                            exons[i].exon_id, exons[i + 1].exon_id, -gap
                        );
                    }
                }
            }

            let shift = gap - self.new_gap_width;
            debug!("Gap {}: width {} -> shift {}", i, gap, shift);

            for exon in exons[i + 1..].iter_mut() {
                exon.shift_left(shift);
            }

            map.steps.push(CompressionStep {
                prev_end,
                next_start,
                gap,
                shift,
            });
        }

        Ok(map)
    }
}

/// Compress with default mode and overlap policy
///
/// Returns `(associations, exons)` like the plotting pipeline consumes them.
pub fn compress(
    exons: &[ExonInterval],
    associations: &[AssociationRecord],
    new_gap_width: i64,
) -> CoreResult<(Vec<AssociationRecord>, Vec<ExonInterval>)> {
    let compressed = GapCompressor::new(new_gap_width)?.compress(exons, associations)?;
    Ok((compressed.associations, compressed.exons))
}
