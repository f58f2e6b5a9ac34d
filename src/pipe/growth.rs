/*!
 * Capacity Planner
 * Chooses between no-op, pack and reallocation when writable space is requested
 */

use super::cursor::Cursors;
use crate::core::errors::PipeError;
use crate::core::types::{PipeResult, Size};

/// Outcome of a capacity request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GrowthPlan {
    /// The tail already holds enough space
    Fits,
    /// Reclaiming the consumed prefix is enough
    Pack,
    /// A larger allocation is needed
    Grow { chunks: Size, new_capacity: Size },
}

/// Growth policy fixed at construction
///
/// # Performance
/// The unit is derived from the initial size, so pipes created large grow
/// in proportionally larger steps and reallocate less often.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GrowthPolicy {
    unit: Size,
}

impl GrowthPolicy {
    /// Round `initial` up to a multiple of `base`, never below `base`
    pub(crate) fn for_initial_capacity(initial: Size, base: Size) -> Self {
        debug_assert!(base > 0, "allocation unit must be non-zero");
        let rounded = initial.div_ceil(base).saturating_mul(base);
        Self {
            unit: rounded.max(base),
        }
    }

    #[inline]
    pub(crate) fn unit(&self) -> Size {
        self.unit
    }

    /// Pick the cheapest way to make `needed` bytes writable
    pub(crate) fn plan(
        &self,
        capacity: Size,
        cursors: &Cursors,
        needed: Size,
    ) -> PipeResult<GrowthPlan> {
        let tail_space = cursors.tail_space(capacity);
        if tail_space >= needed {
            return Ok(GrowthPlan::Fits);
        }

        let reclaimable = tail_space + cursors.head_space();
        if needed <= reclaimable {
            return Ok(GrowthPlan::Pack);
        }

        // Smallest k >= 1 with k * unit + reclaimable >= needed
        let chunks = (needed - reclaimable).div_ceil(self.unit);
        let overflow = || PipeError::CapacityOverflow {
            capacity,
            additional: needed - reclaimable,
        };
        let additional = chunks.checked_mul(self.unit).ok_or_else(overflow)?;
        let new_capacity = capacity.checked_add(additional).ok_or_else(overflow)?;

        Ok(GrowthPlan::Grow {
            chunks,
            new_capacity,
        })
    }
}
