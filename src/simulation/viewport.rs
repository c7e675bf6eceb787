use crate::models::Point;
use crate::spatial::Bounds;
use crate::utils::{valid_viewport_dimension, LayoutError, MIN_BOUNDS_EXTENT};

/// Affine map between model space and a `width x height` viewport.
///
/// The model box is stretched to fill the viewport on each axis, so the map
/// is not uniform when the aspect ratios differ.
///
/// # Examples
///
/// ```
/// use rs_force_layout::models::Point;
/// use rs_force_layout::simulation::ViewTransform;
/// use rs_force_layout::spatial::Bounds;
///
/// let bounds = Bounds::new(Point::new(-10.0, -10.0), Point::new(10.0, 10.0));
/// let transform = ViewTransform::new(bounds, 200.0, 100.0).unwrap();
///
/// assert_eq!(transform.to_viewport(Point::new(0.0, 0.0)), Point::new(100.0, 50.0));
/// assert_eq!(transform.to_model(Point::new(200.0, 100.0)), Point::new(10.0, 10.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    bounds: Bounds,
    viewport: Point,
}

impl ViewTransform {
    /// Model boxes thinner than [`MIN_BOUNDS_EXTENT`] are widened first.
    ///
    /// # Errors
    ///
    /// [`LayoutError::InvalidViewport`] when either dimension is not a
    /// positive finite number.
    pub fn new(bounds: Bounds, width: f64, height: f64) -> Result<Self, LayoutError> {
        if !valid_viewport_dimension(width) || !valid_viewport_dimension(height) {
            return Err(LayoutError::InvalidViewport);
        }
        Ok(ViewTransform {
            bounds: bounds.with_min_extent(MIN_BOUNDS_EXTENT),
            viewport: Point::new(width, height),
        })
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Viewport width and height.
    pub fn viewport_size(&self) -> (f64, f64) {
        (self.viewport.x, self.viewport.y)
    }

    /// Same viewport, new model box.
    pub fn with_bounds(&self, bounds: Bounds) -> Self {
        ViewTransform {
            bounds: bounds.with_min_extent(MIN_BOUNDS_EXTENT),
            viewport: self.viewport,
        }
    }

    /// Viewport units per model unit on each axis.
    pub fn scale(&self) -> Point {
        let size = self.bounds.size();
        Point::new(self.viewport.x / size.x, self.viewport.y / size.y)
    }

    pub fn to_viewport(&self, model: Point) -> Point {
        // Works on halves so boxes spanning most of the f64 range stay finite.
        let origin = self.bounds.top_left / 2.0;
        let half = self.half_size();
        Point::new(
            (model.x / 2.0 - origin.x) / half.x * self.viewport.x,
            (model.y / 2.0 - origin.y) / half.y * self.viewport.y,
        )
    }

    pub fn to_model(&self, view: Point) -> Point {
        let origin = self.bounds.top_left / 2.0;
        let half = self.half_size();
        Point::new(
            origin.x + view.x / self.viewport.x * half.x,
            origin.y + view.y / self.viewport.y * half.y,
        ) * 2.0
    }

    fn half_size(&self) -> Point {
        self.bounds.bottom_right / 2.0 - self.bounds.top_left / 2.0
    }
}
