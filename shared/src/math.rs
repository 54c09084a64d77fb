use glam::Vec2;

/// Unit vector for an angle measured from straight down (the +y axis),
/// positive angles leaning towards +x.
#[inline]
pub fn from_vertical(angle: f32) -> Vec2 {
    Vec2::new(angle.sin(), angle.cos())
}

/// Inverse of [`from_vertical`]: `atan2(x, y)`.
#[inline]
pub fn angle_from_vertical(offset: Vec2) -> f32 {
    offset.x.atan2(offset.y)
}

/// Distance from `p` to the segment `a..b`, with the projection clamped to the segment.
pub fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Quadratic ease-in-out over `t` in [0, 1].
pub fn ease_in_out_quad(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Horizontal wrap-around used by both games: leaving one side re-enters on the other.
pub fn wrap_x(x: f32, width: f32) -> f32 {
    if x > width {
        0.0
    } else if x < 0.0 {
        width
    } else {
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_angle_round_trip() {
        let v = from_vertical(0.3) * 50.0;
        assert!((angle_from_vertical(v) - 0.3).abs() < 1e-6);
        assert_eq!(from_vertical(0.0), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let a = Vec2::ZERO;
        let b = Vec2::new(0.0, 100.0);
        assert_eq!(point_segment_distance(Vec2::new(10.0, 50.0), a, b), 10.0);
        assert_eq!(point_segment_distance(Vec2::new(0.0, -20.0), a, b), 20.0);
        assert_eq!(point_segment_distance(Vec2::new(0.0, 130.0), a, b), 30.0);
    }

    #[test]
    fn degenerate_segment_is_a_point() {
        let a = Vec2::new(5.0, 5.0);
        assert_eq!(point_segment_distance(Vec2::new(8.0, 9.0), a, a), 5.0);
    }

    #[test]
    fn easing_hits_endpoints() {
        assert_eq!(ease_in_out_quad(0.0), 0.0);
        assert_eq!(ease_in_out_quad(0.5), 0.5);
        assert_eq!(ease_in_out_quad(1.0), 1.0);
    }

    #[test]
    fn wrap_moves_to_opposite_edge() {
        assert_eq!(wrap_x(401.0, 400.0), 0.0);
        assert_eq!(wrap_x(-1.0, 400.0), 400.0);
        assert_eq!(wrap_x(200.0, 400.0), 200.0);
    }
}
