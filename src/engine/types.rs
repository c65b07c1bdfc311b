/// Constants that depend on the *frame-buffer*, not on the maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Screen {
    pub w: i32,
    pub h: i32,
    /// Projection scale, half the height.
    pub zscale: i32,
}

impl Screen {
    pub fn new(w: i32, h: i32) -> Self {
        Self { w, h, zscale: h / 2 }
    }

    #[inline]
    pub fn half_w(&self) -> i32 {
        self.w / 2
    }

    #[inline]
    pub fn half_h(&self) -> i32 {
        self.h / 2
    }
}

impl Default for Screen {
    fn default() -> Self {
        Screen::new(400, 400)
    }
}

/// Wall top above the floor, world units.
pub const WALL_HEIGHT: i32 = 100;

/// Per-frame counters, logged at trace level.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameStats {
    pub nodes: u32,
    pub leaves: u32,
    pub segs_tested: u32,
    pub segs_projected: u32,
    pub quads: u32,
}
