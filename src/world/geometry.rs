use glam::IVec2;

use crate::world::segments::{WallSegment, dir_code};

/// Integer bounding box in world units, both corners inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Aabb {
    pub min: IVec2,
    pub max: IVec2,
}

impl Aabb {
    /// Inverted box; the first `add` snaps it to a point.
    pub const EMPTY: Aabb = Aabb {
        min: IVec2::MAX,
        max: IVec2::MIN,
    };

    #[inline]
    pub fn add(&mut self, p: IVec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn of_segments(segs: &[WallSegment]) -> Aabb {
        let mut bb = Aabb::EMPTY;
        for s in segs {
            bb.add(s.start);
            bb.add(s.end());
        }
        bb
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn contains(&self, p: IVec2) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

/// Where a segment falls relative to a [`SplitLine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    Right,
    Left,
    /// On the line, running the same way as the splitter.
    AlongRight,
    /// On the line, running against the splitter.
    AlongLeft,
    /// Endpoints on opposite sides. `at` is the crossing point; the piece
    /// from the segment's start to `at` lies on the right when `start_right`.
    Straddles { at: IVec2, start_right: bool },
    /// On the line but neither parallel nor anti-parallel (zero length).
    Degenerate,
}

/// Infinite line through `origin` along `delta`.
///
/// With `y` growing downwards, "right" is the side the normal
/// `(delta.y, -delta.x)` points to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitLine {
    pub origin: IVec2,
    pub delta: IVec2,
}

impl SplitLine {
    pub fn through(seg: &WallSegment) -> Self {
        Self {
            origin: seg.start,
            delta: seg.delta,
        }
    }

    /// Signed distance of `p` scaled by the line length; `>= 0` is the right side.
    #[inline]
    pub fn side(&self, p: IVec2) -> i64 {
        let d = p - self.origin;
        d.x as i64 * self.delta.y as i64 - d.y as i64 * self.delta.x as i64
    }

    /// Orientation code of the line, see [`WallSegment::dir`].
    #[inline]
    fn dir(&self) -> i32 {
        dir_code(self.delta)
    }

    pub fn classify(&self, seg: &WallSegment) -> Placement {
        let mut d1 = self.side(seg.start);
        let d2 = self.side(seg.end());
        if d1.signum() != d2.signum() {
            if d1 == 0 {
                d1 = d2;
            } else if d2 != 0 {
                let mut at = seg.start;
                if self.delta.x == 0 {
                    at.x = self.origin.x;
                } else {
                    at.y = self.origin.y;
                }
                return Placement::Straddles { at, start_right: d1 > 0 };
            }
        }
        match d1.signum() {
            1 => Placement::Right,
            -1 => Placement::Left,
            _ if seg.dir() == self.dir() => Placement::AlongRight,
            _ if seg.dir() == -self.dir() => Placement::AlongLeft,
            _ => Placement::Degenerate,
        }
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
