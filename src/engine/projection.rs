//! View-space clipping and projection.
//!
//! View space is `(x, z)`: `x` lateral, `z` depth, negative in front of the
//! eye. The frustum is the near plane `z = -NEAR` plus the two 45° planes
//! `x = ±z`.

use glam::I64Vec2;

use crate::engine::types::Screen;

/// Near plane depth.
pub const NEAR: i64 = 4;

/// Frustum plane that cut an endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Plane {
    /// `x = -z`, the left screen edge.
    Left,
    /// `x = z`, the right screen edge.
    Right,
    /// `z = -NEAR`.
    Near,
}

/// Parameter window of the clipped segment and the planes bounding it.
struct Window {
    lo: (f64, Option<Plane>),
    hi: (f64, Option<Plane>),
}

impl Window {
    /// Liang–Barsky step: keep the part of the window where
    /// `denom * t >= num`.
    ///
    /// Returns `false` once the window is empty.
    fn clip(&mut self, denom: i64, num: i64, plane: Plane) -> bool {
        if denom > 0 {
            let r = num as f64 / denom as f64;
            if r > self.hi.0 {
                return false;
            }
            if r > self.lo.0 {
                self.lo = (r, Some(plane));
            }
        } else if denom < 0 {
            let r = num as f64 / denom as f64;
            if r < self.lo.0 {
                return false;
            }
            if r < self.hi.0 {
                self.hi = (r, Some(plane));
            }
        } else if num > 0 {
            return false;
        }
        true
    }
}

/// Point at parameter `t` of `a + t * d`, rounded and placed exactly on
/// `plane` so clipped walls reach the screen edge.
fn point_on(a: I64Vec2, d: I64Vec2, t: f64, plane: Plane) -> I64Vec2 {
    let x = (a.x as f64 + t * d.x as f64).round() as i64;
    let z = (a.y as f64 + t * d.y as f64).round() as i64;
    match plane {
        Plane::Left => I64Vec2::new(-z, z),
        Plane::Right => I64Vec2::new(z, z),
        Plane::Near => I64Vec2::new(x, -NEAR),
    }
}

/// Clip the view-space segment `a → b` to the frustum.
///
/// `None` when nothing is left. An endpoint cut by a plane lies exactly on it.
pub fn clip3d(a: I64Vec2, b: I64Vec2) -> Option<(I64Vec2, I64Vec2)> {
    let (x1, z1, x2, z2) = (a.x, a.y, b.x, b.y);

    /*----- trivial rejects -----*/
    if z1 > -NEAR && z2 > -NEAR {
        return None;
    }
    if x1 > -z1 && x2 > -z2 {
        return None;
    }
    if -x1 > -z1 && -x2 > -z2 {
        return None;
    }

    let d = b - a;
    let mut w = Window {
        lo: (0.0, None),
        hi: (1.0, None),
    };
    if !w.clip(-d.x - d.y, x1 + z1, Plane::Left) {
        return None;
    }
    if !w.clip(d.x - d.y, -x1 + z1, Plane::Right) {
        return None;
    }
    if !w.clip(-d.y, z1 + NEAR, Plane::Near) {
        return None;
    }

    let out_a = match w.lo {
        (t, Some(plane)) => point_on(a, d, t, plane),
        _ => a,
    };
    let out_b = match w.hi {
        (t, Some(plane)) => point_on(a, d, t, plane),
        _ => b,
    };
    Some((out_a, out_b))
}

/// Perspective divide of a view-space value at depth `z`, centred on `centre`.
#[inline]
pub fn project(v: i64, z: i64, zscale: i32, centre: i32) -> Option<i64> {
    v.checked_mul(zscale as i64)?
        .checked_div(z)
        .map(|p| p + centre as i64)
}

/// Screen column of a clipped view-space point.
#[inline]
pub fn screen_x(p: I64Vec2, screen: &Screen) -> Option<i64> {
    project(p.x, p.y, screen.zscale, screen.half_w())
}

/// Screen row of height `v` (already relative to the eye) at depth `z`.
#[inline]
pub fn screen_y(v: i64, z: i64, screen: &Screen) -> Option<i64> {
    project(v, z, screen.zscale, screen.half_h())
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
