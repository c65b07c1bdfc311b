//! Rendering abstraction layer.
//!
//! *The engine never touches a pixel buffer directly.*
//! It produces a list of [`PaintQuad`]s in front-to-back order, each one a
//! wall slice no other quad of the frame overlaps, and hands them to a type
//! that implements [`Renderer`].
//!
//! * Back-ends can be swapped without touching the maze or the engine.
//! * A blanket-impl [`RendererExt`] adds `draw_frame` so call-sites stay short.

/// Pixel format of the software frame-buffer (0x00RRGGBB).
pub type Rgba = u32;

/// Screen-space quad with two vertical edges.
///
/// Corners run `(xs[0], ys[0])` top-left, `(xs[1], ys[1])` bottom-left,
/// `(xs[2], ys[2])` bottom-right, `(xs[3], ys[3])` top-right, where "top"
/// and "bottom" may swap depending on the projection. Columns
/// `xs[0] .. xs[2]` (exclusive) are covered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaintQuad {
    pub xs: [i32; 4],
    pub ys: [i32; 4],
    pub color: Rgba,
}

impl PaintQuad {
    /// First and last screen column covered.
    #[inline]
    pub fn columns(&self) -> (i32, i32) {
        (self.xs[0], self.xs[2] - 1)
    }
}

/// A renderer that owns an internal scratch buffer for the whole frame.
///
/// `end_frame` hands the finished buffer to a user-supplied closure.
pub trait Renderer {
    /// (Re)allocate internal scratch for the requested resolution and clear it.
    fn begin_frame(&mut self, width: usize, height: usize);

    /// Rasterise one wall quad into the internal buffer.
    fn fill_quad(&mut self, quad: &PaintQuad);

    /// Finish the frame and **loan** the finished buffer to `submit`.
    ///
    /// * `submit(&[Rgba], w, h)` is run exactly once per frame.
    /// * Software caller passes `|fb, w, h| window.update_with_buffer(fb, w, h)`.
    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize);
}

/// Convenience blanket-impl with a one-liner `draw_frame` adaptor.
pub trait RendererExt: Renderer {
    fn draw_frame<F>(&mut self, width: usize, height: usize, quads: &[PaintQuad], submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize),
    {
        self.begin_frame(width, height);
        for q in quads {
            self.fill_quad(q);
        }
        self.end_frame(submit);
    }
}
impl<T: Renderer + ?Sized> RendererExt for T {}

pub mod software;

pub use software::Software;
