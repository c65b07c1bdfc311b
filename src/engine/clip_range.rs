//! Unpainted screen columns.
//!
//! A [`RangeSet`] starts each frame as one interval covering the screen and
//! shrinks as walls are painted front to back. Intervals are inclusive,
//! sorted ascending and never overlap.

/// Inclusive column interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClipRange {
    pub first: i32,
    pub last: i32,
}

#[derive(Clone, Debug, Default)]
pub struct RangeSet {
    ranges: Vec<ClipRange>,
}

impl RangeSet {
    pub fn new(first: i32, last: i32) -> Self {
        let mut set = Self::default();
        set.reset(first, last);
        set
    }

    /// Back to a single interval `[first, last]`.
    pub fn reset(&mut self, first: i32, last: i32) {
        self.ranges.clear();
        self.ranges.push(ClipRange { first, last });
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn ranges(&self) -> &[ClipRange] {
        &self.ranges
    }

    /// Subtract `[from, to]`; the bounds may come in either order.
    pub fn remove(&mut self, from: i32, to: i32) {
        let (fx, tx) = if to < from { (to, from) } else { (from, to) };
        let mut i = 0;
        while i < self.ranges.len() {
            let r = self.ranges[i];
            if r.last < fx {
                i += 1;
                continue;
            }
            if r.first > tx {
                return;
            }
            if fx <= r.first {
                if r.last <= tx {
                    // swallowed whole
                    self.ranges.remove(i);
                    continue;
                }
                self.ranges[i].first = tx + 1;
                return;
            }
            if tx >= r.last {
                // fx inside, tx past the end
                self.ranges[i].last = fx - 1;
                i += 1;
                continue;
            }
            // strictly inside: split
            self.ranges[i].first = tx + 1;
            self.ranges.insert(i, ClipRange { first: r.first, last: fx - 1 });
            return;
        }
    }

    /// First unpainted stretch overlapping `[first, last]`, clipped to it.
    pub fn intersect(&self, first: i32, last: i32) -> Option<(i32, i32)> {
        for r in &self.ranges {
            if r.last < first {
                continue;
            }
            if r.first > last {
                return None;
            }
            return Some((r.first.max(first), r.last.min(last)));
        }
        None
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
