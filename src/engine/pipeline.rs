//! Front-to-back BSP walk that turns visible wall spans into [`PaintQuad`]s.
//!
//! Every screen column is painted at most once per frame: a [`RangeSet`]
//! tracks the columns still open, each painted span is removed from it and
//! the walk stops as soon as it is empty.

use log::trace;

use crate::{
    engine::{
        clip_range::RangeSet,
        explored::Explored,
        projection::{clip3d, screen_x, screen_y},
        types::{FrameStats, Screen, WALL_HEIGHT},
    },
    renderer::PaintQuad,
    world::{
        bsp::{BspNode, BspTree, NodeId},
        camera::{Camera, VIEW_Z},
        geometry::Aabb,
        segments::WallSegment,
    },
};

/// Per-frame traversal state.
struct Frame<'a> {
    tree: &'a BspTree,
    cam: &'a Camera,
    screen: &'a Screen,
    open: RangeSet,
    explored: &'a mut Explored,
    out: &'a mut Vec<PaintQuad>,
    stats: FrameStats,
}

/// Top-level entry: fills `out` with this frame's quads, nearest first, and
/// records newly seen walls in `explored`.
pub fn build_quads(
    tree: &BspTree,
    cam: &Camera,
    screen: &Screen,
    explored: &mut Explored,
    out: &mut Vec<PaintQuad>,
) -> FrameStats {
    out.clear();
    let mut frame = Frame {
        tree,
        cam,
        screen,
        open: RangeSet::new(0, screen.w - 1),
        explored,
        out,
        stats: FrameStats::default(),
    };
    frame.walk(tree.root());
    trace!("frame: {:?}", frame.stats);
    frame.stats
}

#[inline]
fn to_col(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

impl Frame<'_> {
    fn walk(&mut self, id: NodeId) {
        if self.open.is_empty() {
            return;
        }
        self.stats.nodes += 1;

        match *self.tree.node(id) {
            BspNode::Leaf { first_seg, seg_count, .. } => self.draw_leaf(first_seg, seg_count),
            BspNode::Branch { line, left, right, .. } => {
                // viewer's side first
                let (near, far) = if line.side(self.cam.pos()) >= 0 {
                    (right, left)
                } else {
                    (left, right)
                };
                if self.bbox_visible(self.tree.node(near).bbox()) {
                    self.walk(near);
                }
                if self.bbox_visible(self.tree.node(far).bbox()) {
                    self.walk(far);
                }
            }
        }
    }

    /// Could anything inside `bb` still land on an open column?
    fn bbox_visible(&self, bb: &Aabb) -> bool {
        if self.open.is_empty() {
            return false;
        }

        /*----- 1. whole box behind the viewer's heading quadrant -----*/
        let ang = self.cam.angle();
        let v = self.cam.pos();
        if (45..=135).contains(&ang) && v.y > bb.max.y {
            return false;
        }
        if (225..=315).contains(&ang) && v.y < bb.min.y {
            return false;
        }
        if (135..=225).contains(&ang) && v.x < bb.min.x {
            return false;
        }
        if (ang >= 315 || ang <= 45) && v.x > bb.max.x {
            return false;
        }

        /*----- 2. the two corners spanning the box's silhouette -----*/
        let min = (bb.min - v).as_i64vec2();
        let max = (bb.max - v).as_i64vec2();
        let (mut p1, mut p2) = (min, max);
        if min.y < 0 && max.y > 0 {
            if min.x < 0 {
                if max.x > 0 {
                    // viewer inside the box
                    return true;
                }
                p1.x = max.x;
                p2.x = max.x;
            } else {
                p1.x = min.x;
                p2.x = min.x;
            }
        } else if min.x < 0 && max.x > 0 {
            let y = if min.y < 0 { max.y } else { min.y };
            p1.y = y;
            p2.y = y;
        } else if (min.x > 0 && min.y > 0) || (min.x < 0 && min.y < 0) {
            p1.x = max.x;
            p2.x = min.x;
        }

        /*----- 3. project and test against the open columns -----*/
        let Some((a, b)) = clip3d(self.cam.rel_to_view(p1), self.cam.rel_to_view(p2)) else {
            return false;
        };
        let (Some(x1), Some(x2)) = (screen_x(a, self.screen), screen_x(b, self.screen)) else {
            return false;
        };
        let (x1, x2) = (to_col(x1.min(x2)), to_col(x1.max(x2)));
        self.open.intersect(x1, x2).is_some()
    }

    fn draw_leaf(&mut self, first_seg: u32, seg_count: u32) {
        self.stats.leaves += 1;
        for id in first_seg..first_seg + seg_count {
            if self.open.is_empty() {
                break;
            }
            let seg = self.tree.segs()[id as usize];
            self.draw_seg(id as usize, &seg);
        }
    }

    /// Paint the still-open parts of one wall.
    fn draw_seg(&mut self, id: usize, seg: &WallSegment) {
        self.stats.segs_tested += 1;

        let a = self.cam.to_view(seg.start);
        let b = self.cam.to_view(seg.end());
        let Some((a, b)) = clip3d(a, b) else {
            return;
        };

        // wall bottom and top relative to the eye, sign flipped for screen rows
        let lo = VIEW_Z as i64;
        let hi = (VIEW_Z - WALL_HEIGHT) as i64;
        let s = self.screen;
        let (Some(y11), Some(y12), Some(y21), Some(y22), Some(x1), Some(x2)) = (
            screen_y(lo, a.y, s),
            screen_y(hi, a.y, s),
            screen_y(lo, b.y, s),
            screen_y(hi, b.y, s),
            screen_x(a, s),
            screen_x(b, s),
        ) else {
            return;
        };
        if x1 >= x2 {
            // back face
            return;
        }
        self.stats.segs_projected += 1;

        let xd = x2 - x1;
        let mut next = x1;
        let mut drawn = false;
        while next <= x2 {
            let Some((lo_x, hi_x)) = self.open.intersect(to_col(next), to_col(x2)) else {
                break;
            };
            let (l, r) = (lo_x as i64, hi_x as i64);
            let ys = [
                y11 + (l - x1) * (y21 - y11) / xd,
                y12 + (l - x1) * (y22 - y12) / xd + 1,
                y22 + (r - x2) * (y22 - y12) / xd + 1,
                y21 + (r - x2) * (y21 - y11) / xd,
            ];
            self.out.push(PaintQuad {
                xs: [lo_x, lo_x, hi_x + 1, hi_x + 1],
                ys: ys.map(to_col),
                color: seg.color,
            });
            self.stats.quads += 1;
            drawn = true;
            self.open.remove(lo_x, hi_x);
            next = r + 1;
        }

        if drawn {
            self.explored.mark_segment(id, seg);
        }
    }
}

/// Column spans of `quads`, sorted.
pub fn painted_spans(quads: &[PaintQuad]) -> Vec<(i32, i32)> {
    let mut spans: Vec<_> = quads.iter().map(PaintQuad::columns).collect();
    spans.sort_unstable();
    spans
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
