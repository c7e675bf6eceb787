use crate::models::Point;

/// Axis-aligned rectangle in model space, `top_left` being the minimum corner.
///
/// # Examples
///
/// ```
/// use rs_force_layout::models::Point;
/// use rs_force_layout::spatial::Bounds;
///
/// let bounds = Bounds::from_points([Point::new(0.0, 0.0), Point::new(10.0, 4.0)]).unwrap();
/// assert_eq!(bounds.width(), 10.0);
/// assert_eq!(bounds.height(), 4.0);
/// assert_eq!(bounds.center(), Point::new(5.0, 2.0));
///
/// let square = bounds.squared();
/// assert_eq!(square.width(), square.height());
/// assert!(square.contains(Point::new(10.0, 4.0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub top_left: Point,
    pub bottom_right: Point,
}

impl Bounds {
    pub const fn new(top_left: Point, bottom_right: Point) -> Self {
        Bounds { top_left, bottom_right }
    }

    /// A box of the given extent centred on `center`.
    pub fn around(center: Point, width: f64, height: f64) -> Self {
        let half = Point::new(width / 2.0, height / 2.0);
        Bounds::new(saturate(center - half), saturate(center + half))
    }

    /// Smallest box covering every finite point, or `None` when there are none.
    pub fn from_points<I: IntoIterator<Item = Point>>(points: I) -> Option<Self> {
        points
            .into_iter()
            .filter(|p| p.is_finite())
            .fold(None, |acc: Option<Bounds>, p| match acc {
                None => Some(Bounds::new(p, p)),
                Some(b) => Some(Bounds::new(
                    Point::new(b.top_left.x.min(p.x), b.top_left.y.min(p.y)),
                    Point::new(b.bottom_right.x.max(p.x), b.bottom_right.y.max(p.y)),
                )),
            })
    }

    /// Saturates at `f64::MAX` for boxes spanning most of the `f64` range.
    #[inline]
    pub fn width(&self) -> f64 {
        (self.bottom_right.x - self.top_left.x).min(f64::MAX)
    }

    #[inline]
    pub fn height(&self) -> f64 {
        (self.bottom_right.y - self.top_left.y).min(f64::MAX)
    }

    /// Width and height as a vector.
    #[inline]
    pub fn size(&self) -> Point {
        Point::new(self.width(), self.height())
    }

    #[inline]
    pub fn center(&self) -> Point {
        self.top_left / 2.0 + self.bottom_right / 2.0
    }

    /// Inclusive on every side.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.top_left.x && p.x <= self.bottom_right.x && p.y >= self.top_left.y && p.y <= self.bottom_right.y
    }

    /// Grows each axis symmetrically until it is at least `min_extent` wide.
    pub fn with_min_extent(&self, min_extent: f64) -> Self {
        self.grown_to(min_extent, min_extent)
    }

    /// Pads every side by `ratio` times the extent of its axis.
    pub fn padded(&self, ratio: f64) -> Self {
        let pad = self.size() * ratio;
        Bounds::new(saturate(self.top_left - pad), saturate(self.bottom_right + pad))
    }

    /// Grows the shorter axis so the box becomes square, keeping the centre.
    pub fn squared(&self) -> Self {
        let side = self.width().max(self.height());
        self.grown_to(side, side)
    }

    /// Axes already at least as long as requested keep their corners.
    fn grown_to(&self, width: f64, height: f64) -> Self {
        let (left, right) = grow_axis(self.top_left.x, self.bottom_right.x, width);
        let (top, bottom) = grow_axis(self.top_left.y, self.bottom_right.y, height);
        Bounds::new(Point::new(left, top), Point::new(right, bottom))
    }
}

fn grow_axis(low: f64, high: f64, extent: f64) -> (f64, f64) {
    if (high - low).min(f64::MAX) >= extent {
        return (low, high);
    }
    let center = low / 2.0 + high / 2.0;
    let half = extent / 2.0;
    ((center - half).max(f64::MIN), (center + half).min(f64::MAX))
}

/// Pulls overflowed coordinates back to the largest finite value.
fn saturate(p: Point) -> Point {
    Point::new(p.x.clamp(f64::MIN, f64::MAX), p.y.clamp(f64::MIN, f64::MAX))
}
