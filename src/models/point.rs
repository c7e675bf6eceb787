use std::f64::consts::TAU;
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use approx::{AbsDiffEq, RelativeEq};
use rand::Rng;

/// A 2D point or vector in model space.
///
/// `Point::NULL` (both coordinates NaN) marks a node that has not been placed
/// yet. A point with exactly one NaN coordinate is "exploded": the integrator
/// broke down for it, which is a different condition from never being placed.
///
/// # Examples
///
/// ```
/// use rs_force_layout::models::Point;
///
/// let a = Point::new(3.0, 4.0);
/// assert_eq!(a.magnitude(), 5.0);
/// assert_eq!(a + Point::new(1.0, 1.0), Point::new(4.0, 5.0));
/// assert!(Point::NULL.is_null());
/// assert!(Point::new(f64::NAN, 1.0).is_exploded());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const NULL: Point = Point { x: f64::NAN, y: f64::NAN };
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// A unit vector pointing in a direction drawn from `rng`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rand::SeedableRng;
    /// use rand::rngs::StdRng;
    /// use rs_force_layout::models::Point;
    ///
    /// let mut rng = StdRng::seed_from_u64(1);
    /// let unit = Point::random_unit(&mut rng);
    /// assert!((unit.magnitude() - 1.0).abs() < 1e-12);
    /// ```
    pub fn random_unit<R: Rng>(rng: &mut R) -> Self {
        let angle = rng.random_range(0.0..TAU);
        Point::new(angle.cos(), angle.sin())
    }

    #[inline]
    pub fn subtract(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    #[inline]
    pub fn scale(self, factor: f64) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }

    #[inline]
    pub fn divide(self, divisor: f64) -> Point {
        Point::new(self.x / divisor, self.y / divisor)
    }

    #[inline]
    pub fn magnitude(self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    #[inline]
    pub fn magnitude_squared(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Divides by the magnitude. The zero vector yields NaN components, so
    /// callers must rule it out first.
    #[inline]
    pub fn normalize(self) -> Point {
        self.divide(self.magnitude())
    }

    #[inline]
    pub fn distance_to(self, other: Point) -> f64 {
        self.subtract(other).magnitude()
    }

    /// Both coordinates are NaN: the position was never assigned.
    #[inline]
    pub fn is_null(self) -> bool {
        self.x.is_nan() && self.y.is_nan()
    }

    /// Exactly one coordinate is NaN: numerical failure.
    #[inline]
    pub fn is_exploded(self) -> bool {
        self.x.is_nan() != self.y.is_nan()
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from(coord: (f64, f64)) -> Self {
        Point::new(coord.0, coord.1)
    }
}

impl From<Point> for (f64, f64) {
    fn from(point: Point) -> Self {
        (point.x, point.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        *self = *self + rhs;
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        self.subtract(rhs)
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, rhs: Point) {
        *self = self.subtract(rhs);
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        self.scale(rhs)
    }
}

impl Div<f64> for Point {
    type Output = Point;

    fn div(self, rhs: f64) -> Point {
        self.divide(rhs)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl AbsDiffEq for Point {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.x.abs_diff_eq(&other.x, epsilon) && self.y.abs_diff_eq(&other.y, epsilon)
    }
}

impl RelativeEq for Point {
    fn default_max_relative() -> f64 {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.x.relative_eq(&other.x, epsilon, max_relative)
            && self.y.relative_eq(&other.y, epsilon, max_relative)
    }
}
