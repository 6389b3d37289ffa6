use crate::{Ray, Vec3};

/// Axis-aligned bounding box used to build and traverse the BVH.
///
/// A box always contains at least one point: it is created around a single
/// point (or the origin) and only ever grows through [`BoundingBox::expand`]
/// and [`BoundingBox::expand_box`], so `min <= max` holds componentwise.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// Create a box around a single point.
    pub fn new(point: Vec3) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Create a box around all of `points`, or `None` if there are none.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bounds = Self::new(first);
        for p in points {
            bounds.expand(p);
        }
        Some(bounds)
    }

    /// Grow the box to contain `point`.
    pub fn expand(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Grow the box to contain `other`.
    pub fn expand_box(&mut self, other: &BoundingBox) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Returns the center point of the bounding box.
    pub fn center(&self) -> Vec3 {
        self.min + (self.max - self.min) * 0.5
    }

    /// Size of the box along each axis.
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the widest axis.
    ///
    /// Ties go to the earlier axis.
    pub fn widest_axis(&self) -> usize {
        let extent = self.extent();
        let mut axis = 0;
        let mut widest = extent.x;
        if extent.y > widest {
            axis = 1;
            widest = extent.y;
        }
        if extent.z > widest {
            axis = 2;
        }
        axis
    }

    /// True if `point` lies inside the box (boundary included).
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Test if the line carrying `ray` passes through the box.
    ///
    /// Slab method: the per-axis entry/exit parameters are computed from the
    /// inverse direction and the box is hit iff the three intervals overlap.
    /// Only hit/no-hit is reported; callers get distances from primitives.
    pub fn intersects(&self, ray: &Ray) -> bool {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let Some((t0, t1)) = slab(
                self.min[axis],
                self.max[axis],
                ray.origin[axis],
                ray.direction[axis],
            ) else {
                return false;
            };

            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return false;
            }
        }

        true
    }
}

impl Default for BoundingBox {
    /// A box around the origin.
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

/// Parametric interval in which a ray is inside the slab `[min, max]` of one
/// axis, or `None` if it never is.
///
/// A zero direction component gives an unbounded interval when the origin
/// lies within the slab, instead of the `0 * inf = NaN` a plain division
/// would produce on the boundary.
#[inline]
fn slab(min: f32, max: f32, origin: f32, direction: f32) -> Option<(f32, f32)> {
    if direction == 0.0 {
        return (origin >= min && origin <= max).then_some((f32::NEG_INFINITY, f32::INFINITY));
    }

    let inv = 1.0 / direction;
    let mut t0 = (min - origin) * inv;
    let mut t1 = (max - origin) * inv;
    if inv < 0.0 {
        std::mem::swap(&mut t0, &mut t1);
    }
    Some((t0, t1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    fn unit_box() -> BoundingBox {
        let mut b = BoundingBox::new(Vec3::ZERO);
        b.expand(Vec3::ONE);
        b
    }

    /// Independent slab computation over the closed box in f64, returning
    /// the overlap of the three per-axis intervals (empty when lo > hi).
    fn brute_force(b: &BoundingBox, ray: &Ray) -> Option<(f64, f64)> {
        let mut lo = f64::NEG_INFINITY;
        let mut hi = f64::INFINITY;
        for axis in 0..3 {
            let o = ray.origin[axis] as f64;
            let d = ray.direction[axis] as f64;
            let (mn, mx) = (b.min[axis] as f64, b.max[axis] as f64);
            if d == 0.0 {
                if o < mn || o > mx {
                    return None;
                }
                continue;
            }
            let a = (mn - o) / d;
            let c = (mx - o) / d;
            lo = lo.max(a.min(c));
            hi = hi.min(a.max(c));
        }
        Some((lo, hi))
    }

    #[test]
    fn test_new_and_default() {
        let b = BoundingBox::new(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(b.min, b.max);
        assert_eq!(BoundingBox::default().min, Vec3::ZERO);
        assert_eq!(BoundingBox::default().max, Vec3::ZERO);
    }

    #[test]
    fn test_from_points() {
        assert!(BoundingBox::from_points(std::iter::empty()).is_none());

        let b = BoundingBox::from_points([
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(-2.0, 3.0, 0.5),
        ])
        .unwrap();
        assert_eq!(b.min, Vec3::new(-2.0, -1.0, 0.0));
        assert_eq!(b.max, Vec3::new(1.0, 3.0, 0.5));
    }

    #[test]
    fn test_expand_interior_point_is_idempotent() {
        let mut rng = StdRng::seed_from_u64(7);
        let original = unit_box();
        for _ in 0..100 {
            let p = Vec3::new(rng.gen(), rng.gen(), rng.gen());
            let mut b = original;
            b.expand(p);
            assert_eq!(b, original);
        }
    }

    #[test]
    fn test_expand_exterior_point_strictly_contains() {
        let mut rng = StdRng::seed_from_u64(8);
        let original = unit_box();
        for _ in 0..100 {
            let p = Vec3::new(
                rng.gen_range(-3.0..4.0),
                rng.gen_range(-3.0..4.0),
                rng.gen_range(-3.0..4.0),
            );
            if original.contains(p) {
                continue;
            }
            let mut b = original;
            b.expand(p);
            assert_ne!(b, original);
            assert!(b.contains(p));
            assert!(b.contains(original.min));
            assert!(b.contains(original.max));
        }
    }

    #[test]
    fn test_expand_box() {
        let mut a = BoundingBox::new(Vec3::ZERO);
        a.expand(Vec3::splat(5.0));
        let mut b = BoundingBox::new(Vec3::splat(3.0));
        b.expand(Vec3::splat(10.0));
        a.expand_box(&b);

        assert_eq!(a.min, Vec3::ZERO);
        assert_eq!(a.max, Vec3::splat(10.0));
    }

    #[test]
    fn test_center() {
        let mut b = BoundingBox::new(Vec3::ZERO);
        b.expand(Vec3::new(10.0, 4.0, -2.0));
        assert_eq!(b.center(), Vec3::new(5.0, 2.0, -1.0));
    }

    #[test]
    fn test_widest_axis() {
        let x = BoundingBox::from_points([Vec3::ZERO, Vec3::new(10.0, 1.0, 1.0)]).unwrap();
        let y = BoundingBox::from_points([Vec3::ZERO, Vec3::new(1.0, 10.0, 1.0)]).unwrap();
        let z = BoundingBox::from_points([Vec3::ZERO, Vec3::new(1.0, 1.0, 10.0)]).unwrap();
        let cube = unit_box();

        assert_eq!(x.widest_axis(), 0);
        assert_eq!(y.widest_axis(), 1);
        assert_eq!(z.widest_axis(), 2);
        assert_eq!(cube.widest_axis(), 0);
    }

    #[test]
    fn test_intersects_simple() {
        let b = BoundingBox::from_points([Vec3::splat(-1.0), Vec3::splat(1.0)]).unwrap();

        // Ray pointing at center
        assert!(b.intersects(&Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z)));

        // Ray missing the box
        assert!(!b.intersects(&Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::Z)));

        // Origin inside
        assert!(b.intersects(&Ray::new(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0))));
    }

    #[test]
    fn test_intersects_axis_parallel_rays() {
        let b = unit_box();

        // Two zero components: inverse direction is +-inf on those axes.
        assert!(b.intersects(&Ray::new(Vec3::new(0.5, 0.5, -3.0), Vec3::Z)));
        assert!(b.intersects(&Ray::new(Vec3::new(0.5, 0.5, 3.0), -Vec3::Z)));
        assert!(!b.intersects(&Ray::new(Vec3::new(1.5, 0.5, -3.0), Vec3::Z)));
        assert!(!b.intersects(&Ray::new(Vec3::new(0.5, -0.5, 3.0), -Vec3::Z)));

        // Origin exactly on a slab boundary of a parallel axis.
        assert!(b.intersects(&Ray::new(Vec3::new(0.0, 0.5, -3.0), Vec3::Z)));
        assert!(b.intersects(&Ray::new(Vec3::new(1.0, 1.0, -3.0), Vec3::Z)));

        // One zero component.
        assert!(b.intersects(&Ray::new(Vec3::new(-1.0, 0.5, -1.0), Vec3::new(1.0, 0.0, 1.0))));
        assert!(!b.intersects(&Ray::new(Vec3::new(-1.0, 2.0, -1.0), Vec3::new(1.0, 0.0, 1.0))));
    }

    #[test]
    fn test_intersects_z_slab_before_x_slab() {
        // The z slab is crossed for t in [-0.5, 0.5] and the x slab for
        // t in [1, 2]: no common t, so the box is missed. The old test
        // compared against the x exit only and reported a hit here.
        let b = unit_box();
        let ray = Ray {
            origin: Vec3::new(-1.0, 0.5, 0.5),
            direction: Vec3::new(1.0, 0.0, 1.0),
        };
        assert!(!b.intersects(&ray));
        let (lo, hi) = brute_force(&b, &ray).unwrap();
        assert!(lo > hi);
    }

    #[test]
    fn test_intersects_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(42);
        let axis_directions = [
            Vec3::X,
            -Vec3::X,
            Vec3::Y,
            -Vec3::Y,
            Vec3::Z,
            -Vec3::Z,
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, -1.0, 1.0),
            Vec3::new(1.0, 0.0, -1.0),
        ];

        for i in 0..2000 {
            let a = Vec3::new(
                rng.gen_range(-2.0..2.0),
                rng.gen_range(-2.0..2.0),
                rng.gen_range(-2.0..2.0),
            );
            let c = Vec3::new(
                rng.gen_range(-2.0..2.0),
                rng.gen_range(-2.0..2.0),
                rng.gen_range(-2.0..2.0),
            );
            let b = BoundingBox::from_points([a, c]).unwrap();
            let origin = Vec3::new(
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
            );
            let direction = if i % 3 == 0 {
                axis_directions[rng.gen_range(0..axis_directions.len())]
            } else {
                Vec3::new(
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                )
            };
            if direction.length_squared() < 1e-6 {
                continue;
            }
            let ray = Ray::new(origin, direction);

            let expected = match brute_force(&b, &ray) {
                None => false,
                // Grazing rays are at the mercy of rounding; skip them.
                Some((lo, hi)) if (hi - lo).abs() < 1e-4 => continue,
                Some((lo, hi)) => lo <= hi,
            };
            assert_eq!(b.intersects(&ray), expected, "box {b:?} ray {ray:?}");
        }
    }
}
