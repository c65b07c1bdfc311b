//! ---------------------------------------------------------------------------
//! Software (CPU) quad renderer
//!
//! * Fills a `Vec<u32>` frame-buffer in **0x00RRGGBB** format.
//! * Relies on the engine to feed non-overlapping [`PaintQuad`]s, so no
//!   Z-buffer is needed.
//! ---------------------------------------------------------------------------

use crate::renderer::{PaintQuad, Renderer, Rgba};

/// Background above the horizon.
pub const CEILING: Rgba = 0x00_40_40_40;
/// Background below the horizon.
pub const FLOOR: Rgba = 0x00_00_00_00;

/*───────────────────────────────────────────────────────────────────────*/
/*                              Backend                                 */
/*───────────────────────────────────────────────────────────────────────*/

#[derive(Default)]
pub struct Software {
    scratch: Vec<Rgba>,
    width: usize,
    height: usize,
}

impl Software {
    /// Pixel at `(x, y)` of the current frame, for tests and screenshots.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        (x < self.width && y < self.height).then(|| self.scratch[y * self.width + x])
    }
}

/*──────────────────────── Renderer trait impl ────────────────────────*/
impl Renderer for Software {
    fn begin_frame(&mut self, w: usize, h: usize) {
        if w != self.width || h != self.height {
            self.width = w;
            self.height = h;
            self.scratch.resize(w * h, 0);
        }
        let horizon = (h / 2) * w;
        self.scratch[..horizon].fill(CEILING);
        self.scratch[horizon..].fill(FLOOR);
    }

    fn fill_quad(&mut self, q: &PaintQuad) {
        let (x_first, x_last) = q.columns();
        let span_w = (q.xs[2] - q.xs[0]).max(1) as f32;
        let step = EdgeStep {
            da: (q.ys[3] - q.ys[0]) as f32 / span_w,
            db: (q.ys[2] - q.ys[1]) as f32 / span_w,
        };
        let mut cur = EdgeCursor {
            a: q.ys[0] as f32,
            b: q.ys[1] as f32,
        };

        for x in x_first..=x_last {
            if x >= 0 && (x as usize) < self.width {
                self.draw_column(x as usize, cur, q.color);
            }
            cur.advance(&step);
        }
    }

    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize),
    {
        submit(&self.scratch, self.width, self.height);
    }
}

/*──────────────────────── helper structs ─────────────────────────────*/

/// Per-column slope of both quad edges.
#[derive(Clone, Copy)]
struct EdgeStep {
    da: f32,
    db: f32,
}

/// Both edge heights at the current column.
#[derive(Clone, Copy)]
struct EdgeCursor {
    a: f32,
    b: f32,
}

impl EdgeCursor {
    fn advance(&mut self, s: &EdgeStep) {
        self.a += s.da;
        self.b += s.db;
    }
}

/*──────────────────────── column rendering ───────────────────────────*/

impl Software {
    fn draw_column(&mut self, col: usize, cur: EdgeCursor, color: Rgba) {
        let max_y = self.height as f32 - 1.0;
        let y0 = cur.a.min(cur.b).max(0.0) as usize;
        let y1 = cur.a.max(cur.b).min(max_y);
        if y1 < 0.0 {
            return;
        }
        for y in y0..=y1 as usize {
            self.scratch[y * self.width + col] = color;
        }
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::RendererExt;

    fn quad(x0: i32, x1: i32, top: i32, bot: i32, color: Rgba) -> PaintQuad {
        PaintQuad {
            xs: [x0, x0, x1 + 1, x1 + 1],
            ys: [top, bot, bot, top],
            color,
        }
    }

    #[test]
    fn clears_to_ceiling_and_floor() {
        let mut sw = Software::default();
        sw.draw_frame(8, 8, &[], |fb, w, h| {
            assert_eq!((fb.len(), w, h), (64, 8, 8));
        });
        assert_eq!(sw.pixel(0, 0), Some(CEILING));
        assert_eq!(sw.pixel(7, 7), Some(FLOOR));
        assert_eq!(sw.pixel(8, 0), None);
    }

    #[test]
    fn quad_covers_its_columns_only() {
        let mut sw = Software::default();
        sw.draw_frame(8, 8, &[quad(2, 4, 1, 6, 0xFF)], |_, _, _| {});
        for x in 0..8 {
            assert_eq!(sw.pixel(x, 3) == Some(0xFF), (2..=4).contains(&x), "column {x}");
        }
        assert_eq!(sw.pixel(3, 0), Some(CEILING));
        assert_eq!(sw.pixel(3, 7), Some(FLOOR));
    }

    #[test]
    fn offscreen_parts_are_clipped() {
        let mut sw = Software::default();
        // inverted, taller than the screen and partly left of it
        sw.draw_frame(6, 6, &[quad(-3, 2, 50, -50, 0xABC)], |_, _, _| {});
        for y in 0..6 {
            assert_eq!(sw.pixel(0, y), Some(0xABC));
            assert_eq!(sw.pixel(2, y), Some(0xABC));
            assert_eq!(sw.pixel(3, y), Some(if y < 3 { CEILING } else { FLOOR }));
        }
    }
}
