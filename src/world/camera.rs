use glam::{I64Vec2, IVec2};

/// Fixed-point scale of view directions (16.16).
pub const FRACBITS: u32 = 16;
pub const FRACUNIT: i32 = 1 << FRACBITS;

/// Eye height above the floor, world units.
pub const VIEW_Z: i32 = 50;

/// Viewer in world space.
///
/// * Heading is kept twice: as an angle in whole degrees (0 = +x, 90 = +y)
///   for the coarse culling tests, and as a 16.16 direction vector for the
///   view transform.
/// * `pos` is in world units, not grid cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Camera {
    pos: IVec2,
    angle: i32,
    dir: IVec2,
}

impl Camera {
    /// Camera at `pos` facing `angle` degrees; the direction is derived.
    pub fn new(pos: IVec2, angle: i32) -> Self {
        Self::with_dir(pos, angle, fixed_dir(angle))
    }

    /// Camera with an explicit 16.16 direction, as produced by a walk animation.
    pub fn with_dir(pos: IVec2, angle: i32, dir: IVec2) -> Self {
        Self {
            pos,
            angle: angle.rem_euclid(360),
            dir,
        }
    }

    #[inline]
    pub fn pos(&self) -> IVec2 {
        self.pos
    }

    /// Heading in degrees, `0..360`.
    #[inline]
    pub fn angle(&self) -> i32 {
        self.angle
    }

    /// Heading as a 16.16 unit vector.
    #[inline]
    pub fn dir(&self) -> IVec2 {
        self.dir
    }

    /// Map a world point into view space: `.x` lateral, `.y` depth.
    ///
    /// Depth is negative in front of the viewer.
    #[inline]
    pub fn to_view(&self, p: IVec2) -> I64Vec2 {
        self.rel_to_view((p - self.pos).as_i64vec2())
    }

    /// Same as [`Camera::to_view`] for an offset already relative to the eye.
    #[inline]
    pub fn rel_to_view(&self, o: I64Vec2) -> I64Vec2 {
        let (vdx, vdy) = (self.dir.x as i64, self.dir.y as i64);
        let x = -((vdy * o.x - vdx * o.y) >> FRACBITS);
        let z = -((vdx * o.x + vdy * o.y) >> FRACBITS);
        I64Vec2::new(x, z)
    }
}

/// 16.16 direction for a heading in degrees.
pub fn fixed_dir(angle: i32) -> IVec2 {
    let (s, c) = (angle as f64).to_radians().sin_cos();
    IVec2::new((c * FRACUNIT as f64) as i32, (s * FRACUNIT as f64) as i32)
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn fixed_dir_is_unit_length() {
        for angle in (0..360).step_by(15) {
            let d = fixed_dir(angle).as_dvec2() / FRACUNIT as f64;
            assert_approx_eq!(d.length(), 1.0, 1e-4);
        }
        assert_eq!(fixed_dir(0), IVec2::new(FRACUNIT, 0));
        assert_eq!(fixed_dir(90).y, FRACUNIT);
    }

    #[test]
    fn angle_wraps() {
        let cam = Camera::new(IVec2::ZERO, -90);
        assert_eq!(cam.angle(), 270);
        assert_eq!(Camera::new(IVec2::ZERO, 450).angle(), 90);
    }

    #[test]
    fn to_view_axes_align() {
        let cam = Camera::new(IVec2::new(100, 100), 0);
        // straight ahead: no lateral offset, negative depth
        assert_eq!(cam.to_view(IVec2::new(110, 100)), I64Vec2::new(0, -10));
        // +y is lateral
        assert_eq!(cam.to_view(IVec2::new(100, 105)), I64Vec2::new(5, 0));
    }

    #[test]
    fn to_view_rotated() {
        let cam = Camera::with_dir(IVec2::ZERO, 90, IVec2::new(0, FRACUNIT));
        assert_eq!(cam.to_view(IVec2::new(0, 10)), I64Vec2::new(0, -10));
        assert_eq!(cam.to_view(IVec2::new(10, 0)), I64Vec2::new(-10, 0));
    }
}
