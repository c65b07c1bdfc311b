use glam::IVec2;
use log::{debug, warn};
use thiserror::Error;

use crate::world::geometry::{Aabb, Placement, SplitLine};
use crate::world::segments::WallSegment;

pub type NodeId = u32;

/// Candidate sampling: roughly this many candidates are graded per node.
const CANDIDATE_SAMPLES: usize = 50;
/// Segment lists longer than this are graded on a subsample.
const FULL_GRADE_LIMIT: usize = 100;
/// Progress is reported every this many graded candidates.
const PROGRESS_INTERVAL: u32 = 32;
const SPLIT_PENALTY: i32 = 3;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BspError {
    #[error("no partition candidate among {remaining} unpartitioned segments")]
    NoPartitionCandidate { remaining: usize },

    #[error("partitioning cancelled")]
    Cancelled,
}

#[derive(Clone, Debug)]
pub enum BspNode {
    Branch {
        line: SplitLine,
        bbox: Aabb,
        left: NodeId,
        right: NodeId,
    },
    /// Convex region; its walls are `segs[first_seg .. first_seg + seg_count]`.
    Leaf {
        bbox: Aabb,
        first_seg: u32,
        seg_count: u32,
    },
}

impl BspNode {
    #[inline]
    pub fn bbox(&self) -> &Aabb {
        match self {
            BspNode::Branch { bbox, .. } | BspNode::Leaf { bbox, .. } => bbox,
        }
    }
}

/// Immutable BSP over the wall segments of one maze.
///
/// Nodes live in a flat arena, children before parents, so the root is the
/// last node. Leaf segments are stored contiguously and a segment's index
/// in [`BspTree::segs`] is its stable id.
#[derive(Clone, Debug)]
pub struct BspTree {
    nodes: Vec<BspNode>,
    segs: Vec<WallSegment>,
}

impl BspTree {
    #[inline(always)]
    pub fn root(&self) -> NodeId {
        (self.nodes.len() - 1) as NodeId
    }

    #[inline(always)]
    pub fn node(&self, id: NodeId) -> &BspNode {
        &self.nodes[id as usize]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn segs(&self) -> &[WallSegment] {
        &self.segs
    }

    #[inline]
    pub fn leaf_segs(&self, first_seg: u32, seg_count: u32) -> &[WallSegment] {
        &self.segs[first_seg as usize..(first_seg + seg_count) as usize]
    }

    /// Every leaf as `(id, bbox, first segment id, segments)`.
    pub fn leaves(&self) -> impl Iterator<Item = (NodeId, &Aabb, u32, &[WallSegment])> + '_ {
        self.nodes.iter().enumerate().filter_map(|(id, n)| match *n {
            BspNode::Leaf { ref bbox, first_seg, seg_count } => {
                Some((id as NodeId, bbox, first_seg, self.leaf_segs(first_seg, seg_count)))
            }
            BspNode::Branch { .. } => None,
        })
    }

    /// Walk down to the leaf containing `p`; points on a splitting line go right.
    pub fn locate_leaf(&self, p: IVec2) -> NodeId {
        let mut id = self.root();
        loop {
            match self.node(id) {
                BspNode::Leaf { .. } => return id,
                BspNode::Branch { line, left, right, .. } => {
                    id = if line.side(p) >= 0 { *right } else { *left };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        fn go(t: &BspTree, id: NodeId) -> usize {
            match t.node(id) {
                BspNode::Leaf { .. } => 1,
                BspNode::Branch { left, right, .. } => 1 + go(t, *left).max(go(t, *right)),
            }
        }
        go(self, self.root())
    }
}

/// Recursive partitioner.
///
/// `progress` receives the share of `expected_iterations` graded so far and
/// returns `false` to abandon the build.
pub struct BspBuilder<'p> {
    expected_iterations: u32,
    iterations: u32,
    progress: &'p mut dyn FnMut(u8) -> bool,
    nodes: Vec<BspNode>,
    segs: Vec<WallSegment>,
}

impl<'p> BspBuilder<'p> {
    pub fn new(expected_iterations: u32, progress: &'p mut dyn FnMut(u8) -> bool) -> Self {
        Self {
            expected_iterations: expected_iterations.max(1),
            iterations: 0,
            progress,
            nodes: Vec::new(),
            segs: Vec::new(),
        }
    }

    /// Candidates graded so far.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn build(mut self, segs: Vec<WallSegment>) -> Result<BspTree, BspError> {
        let input = segs.len();
        self.partition(segs)?;
        debug!(
            "bsp: {} segments in, {} after splits, {} nodes, {} partition iterations",
            input,
            self.segs.len(),
            self.nodes.len(),
            self.iterations
        );
        Ok(BspTree {
            nodes: self.nodes,
            segs: self.segs,
        })
    }

    fn push(&mut self, node: BspNode) -> NodeId {
        self.nodes.push(node);
        (self.nodes.len() - 1) as NodeId
    }

    fn leaf(&mut self, segs: Vec<WallSegment>) -> NodeId {
        let bbox = Aabb::of_segments(&segs);
        let first_seg = self.segs.len() as u32;
        let seg_count = segs.len() as u32;
        self.segs.extend(segs);
        self.push(BspNode::Leaf { bbox, first_seg, seg_count })
    }

    fn partition(&mut self, mut segs: Vec<WallSegment>) -> Result<NodeId, BspError> {
        if segs.iter().all(|s| s.partitioned) {
            return Ok(self.leaf(segs));
        }

        let pick = self.find_candidate(&segs)?;
        segs[pick].partitioned = true;
        let line = SplitLine::through(&segs[pick]);

        let mut left = Vec::new();
        let mut right = Vec::new();
        for mut seg in segs {
            match line.classify(&seg) {
                Placement::Right => right.push(seg),
                Placement::Left => left.push(seg),
                Placement::AlongRight => {
                    seg.partitioned = true;
                    right.push(seg);
                }
                Placement::AlongLeft => {
                    seg.partitioned = true;
                    left.push(seg);
                }
                Placement::Straddles { at, start_right } => {
                    let head = seg.piece(seg.start, at);
                    let tail = seg.piece(at, seg.end());
                    if start_right {
                        right.push(head);
                        left.push(tail);
                    } else {
                        right.push(tail);
                        left.push(head);
                    }
                }
                Placement::Degenerate => {
                    warn!("dropping degenerate segment {seg:?} on splitter {line:?}");
                }
            }
        }

        if left.is_empty() {
            return Ok(self.leaf(right));
        }
        if right.is_empty() {
            return Ok(self.leaf(left));
        }

        /*----- children first, then the branch that joins them -----*/
        let left = self.partition(left)?;
        let right = self.partition(right)?;
        let bbox = self.nodes[left as usize].bbox().union(self.nodes[right as usize].bbox());
        Ok(self.push(BspNode::Branch { line, bbox, left, right }))
    }

    /// Index of the unpartitioned segment with the lowest [`grade`].
    ///
    /// Long lists are sampled; should the sample miss every unpartitioned
    /// segment the whole list is scanned.
    fn find_candidate(&mut self, segs: &[WallSegment]) -> Result<usize, BspError> {
        let skip = (segs.len() / CANDIDATE_SAMPLES).max(1);
        if let Some(i) = self.best_of(segs, skip)? {
            return Ok(i);
        }
        if skip > 1 {
            if let Some(i) = self.best_of(segs, 1)? {
                return Ok(i);
            }
        }
        Err(BspError::NoPartitionCandidate {
            remaining: segs.iter().filter(|s| !s.partitioned).count(),
        })
    }

    fn best_of(&mut self, segs: &[WallSegment], skip: usize) -> Result<Option<usize>, BspError> {
        let mut best = None;
        let mut best_grade = i32::MAX;
        for (i, cand) in segs.iter().enumerate().step_by(skip) {
            if cand.partitioned {
                continue;
            }
            self.iterations += 1;
            if self.iterations % PROGRESS_INTERVAL == 0 {
                let pct = (self.iterations as u64 * 100 / self.expected_iterations as u64).min(100);
                if !(self.progress)(pct as u8) {
                    return Err(BspError::Cancelled);
                }
            }
            let g = grade(segs, cand);
            if g < best_grade {
                best_grade = g;
                best = Some(i);
            }
        }
        Ok(best)
    }
}

/// Cost of splitting `segs` along `cand`: imbalance plus a penalty per split.
///
/// Lists longer than [`FULL_GRADE_LIMIT`] are graded on every
/// `len / 50`-th segment.
pub fn grade(segs: &[WallSegment], cand: &WallSegment) -> i32 {
    let line = SplitLine::through(cand);
    let step = if segs.len() > FULL_GRADE_LIMIT {
        segs.len() / CANDIDATE_SAMPLES
    } else {
        1
    };
    let (mut left, mut right, mut splits) = (0i32, 0i32, 0i32);
    for seg in segs.iter().step_by(step) {
        match line.classify(seg) {
            Placement::Right | Placement::AlongRight => right += 1,
            Placement::Left | Placement::AlongLeft => left += 1,
            Placement::Straddles { .. } => splits += 1,
            Placement::Degenerate => warn!("grade: degenerate segment {seg:?}"),
        }
    }
    (left - right).abs() + SPLIT_PENALTY * splits
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{Algorithm, GenerationRequest, build};
    use crate::world::segments::{MAP_UNIT, wall_color};

    fn seg(x: i32, y: i32, dx: i32, dy: i32) -> WallSegment {
        WallSegment::new(x, y, dx, dy, 1, 0)
    }

    fn build_tree(segs: Vec<WallSegment>) -> BspTree {
        let mut keep_going = |_: u8| true;
        BspBuilder::new(100, &mut keep_going).build(segs).unwrap()
    }

    /// Check every leaf segment against every splitter on its path.
    fn assert_convex(tree: &BspTree, id: NodeId, path: &mut Vec<(SplitLine, bool)>) {
        match tree.node(id) {
            BspNode::Leaf { first_seg, seg_count, .. } => {
                for s in tree.leaf_segs(*first_seg, *seg_count) {
                    for (line, went_right) in path.iter() {
                        for p in [s.start, s.end()] {
                            let side = line.side(p);
                            if *went_right {
                                assert!(side >= 0, "{s:?} left of {line:?}");
                            } else {
                                assert!(side <= 0, "{s:?} right of {line:?}");
                            }
                        }
                    }
                }
            }
            BspNode::Branch { line, left, right, .. } => {
                path.push((*line, false));
                assert_convex(tree, *left, path);
                path.pop();
                path.push((*line, true));
                assert_convex(tree, *right, path);
                path.pop();
            }
        }
    }

    #[test]
    fn closed_box_is_a_single_leaf() {
        let mu = MAP_UNIT;
        let mut segs = vec![
            seg(2 * mu, 0, -2 * mu, 0),
            seg(0, 2 * mu, 2 * mu, 0),
            seg(0, 0, 0, 2 * mu),
            seg(2 * mu, 2 * mu, 0, -2 * mu),
        ];
        segs.iter_mut().for_each(|s| s.partitioned = true);
        let tree = build_tree(segs);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.segs().len(), 4);
        let (_, bbox, _, _) = tree.leaves().next().unwrap();
        assert_eq!(*bbox, Aabb { min: IVec2::ZERO, max: IVec2::splat(2 * mu) });
    }

    #[test]
    fn crossing_wall_gets_split() {
        // vertical splitter at x = 10 and a horizontal wall across it
        let segs = vec![seg(10, 0, 0, 20), seg(0, 5, 20, 0)];
        let tree = build_tree(segs);
        assert!(tree.segs().len() >= 3);
        let total: i32 = tree.segs().iter().map(|s| s.length()).sum();
        assert_eq!(total, 40);
        assert!(
            tree.segs()
                .iter()
                .all(|s| s.dist == 1 && s.color == wall_color(1, s.is_horizontal(), 0))
        );
        assert_convex(&tree, tree.root(), &mut Vec::new());
    }

    #[test]
    fn grade_counts_splits_three_times() {
        let splitter = seg(10, 0, 0, 20);
        let segs = vec![splitter, seg(0, 5, 20, 0), seg(15, 0, 0, 5), seg(12, 0, 0, 5)];
        // splitter itself runs along, two on the right, one split
        assert_eq!(grade(&segs, &splitter), 3 + 3);
    }

    #[test]
    fn cancel_stops_partitioning() {
        let segs: Vec<_> = (0..200).map(|i| seg(i * 10, 0, 0, 5)).collect();
        let mut stop = |_: u8| false;
        let res = BspBuilder::new(10, &mut stop).build(segs);
        assert_eq!(res.unwrap_err(), BspError::Cancelled);
    }

    #[test]
    fn generated_trees_are_convex_and_complete() {
        for (seed, algorithm) in [(11, Algorithm::Backtrack), (12, Algorithm::Prim)] {
            let req = GenerationRequest {
                width: 15,
                height: 15,
                rooms: 3,
                algorithm,
                seed: Some(seed),
                ..GenerationRequest::default()
            };
            let maze = build(&req, |_| true).unwrap();
            let tree = &maze.bsp;
            assert_convex(tree, tree.root(), &mut Vec::new());

            // splits keep total wall length
            let before: i32 = maze.segments.iter().map(|s| s.length()).sum();
            let after: i32 = tree.segs().iter().map(|s| s.length()).sum();
            assert_eq!(before, after);

            let centre = IVec2::new(7 * MAP_UNIT + 64, 7 * MAP_UNIT + 64);
            let leaf = tree.locate_leaf(centre);
            assert!(matches!(tree.node(leaf), BspNode::Leaf { .. }));
        }
    }
}
