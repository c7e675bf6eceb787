use crate::utils::{DEFAULT_LAYOUT_CONFIG, LayoutError};

/// Tuning parameters shared by every tick of a [`ForceLayout`](crate::simulation::ForceLayout).
///
/// Per-edge spring stiffness and rest length live on the edges themselves;
/// everything here applies to the whole graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Strength of the inverse-square repulsion between every pair of nodes.
    pub repulsion: f64,
    /// Velocity retained after each tick, in `[0, 1]`. Lower settles faster.
    pub friction: f64,
    /// Integration step applied to acceleration and velocity.
    pub timestep: f64,
    /// Velocity magnitude is clamped to this value after integration.
    pub max_speed: f64,
    /// Barnes-Hut accuracy threshold. `0.0` degrades to exact pairwise repulsion.
    pub theta: f64,
    /// Auto-stop fires once mean energy drops below this value.
    pub min_energy_threshold: f64,
    pub auto_stop: bool,
    /// Padding added to each side of the bounding box, as a fraction of its size.
    pub padding_ratio: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Seed for the jitter generator. `None` seeds from the operating system.
    pub seed: Option<u64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        DEFAULT_LAYOUT_CONFIG
    }
}

impl LayoutConfig {
    /// Builds a configuration, falling back to the defaults for every `None`.
    ///
    /// # Example
    /// ```
    /// use rs_force_layout::utils::LayoutConfig;
    ///
    /// let config = LayoutConfig::new(Some(2000.0), Some(0.1), None, None, None);
    /// assert_eq!(config.repulsion, 2000.0);
    /// assert_eq!(config.friction, 0.1);
    /// assert_eq!(config.theta, 0.5);
    /// ```
    pub fn new(
        repulsion: Option<f64>,
        friction: Option<f64>,
        timestep: Option<f64>,
        max_speed: Option<f64>,
        theta: Option<f64>,
    ) -> Self {
        let default = DEFAULT_LAYOUT_CONFIG;
        Self {
            repulsion: repulsion.unwrap_or(default.repulsion),
            friction: friction.unwrap_or(default.friction),
            timestep: timestep.unwrap_or(default.timestep),
            max_speed: max_speed.unwrap_or(default.max_speed),
            theta: theta.unwrap_or(default.theta),
            ..default
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_auto_stop(mut self, auto_stop: bool) -> Self {
        self.auto_stop = auto_stop;
        self
    }

    pub fn with_min_energy_threshold(mut self, threshold: f64) -> Self {
        self.min_energy_threshold = threshold;
        self
    }

    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    pub fn with_padding_ratio(mut self, padding_ratio: f64) -> Self {
        self.padding_ratio = padding_ratio;
        self
    }

    /// Checks every field against its allowed range.
    ///
    /// # Example
    /// ```
    /// use rs_force_layout::utils::{LayoutConfig, LayoutError};
    ///
    /// assert!(LayoutConfig::default().validate().is_ok());
    ///
    /// let bad = LayoutConfig::new(None, Some(1.5), None, None, None);
    /// assert!(matches!(bad.validate(), Err(LayoutError::InvalidConfig(_))));
    /// ```
    pub fn validate(&self) -> Result<(), LayoutError> {
        if !self.repulsion.is_finite() || self.repulsion < 0.0 {
            return Err(LayoutError::InvalidConfig("repulsion must be finite and non-negative".to_string()));
        }
        if !(0.0..=1.0).contains(&self.friction) {
            return Err(LayoutError::InvalidConfig("friction must lie in [0, 1]".to_string()));
        }
        if !self.timestep.is_finite() || self.timestep <= 0.0 {
            return Err(LayoutError::InvalidConfig("timestep must be finite and positive".to_string()));
        }
        // Infinity is allowed here and simply disables the clamp.
        if self.max_speed.is_nan() || self.max_speed <= 0.0 {
            return Err(LayoutError::InvalidConfig("max_speed must be positive".to_string()));
        }
        if !self.theta.is_finite() || self.theta < 0.0 {
            return Err(LayoutError::InvalidConfig("theta must be finite and non-negative".to_string()));
        }
        if !self.min_energy_threshold.is_finite() || self.min_energy_threshold < 0.0 {
            return Err(LayoutError::InvalidConfig("min_energy_threshold must be finite and non-negative".to_string()));
        }
        if !self.padding_ratio.is_finite() || self.padding_ratio < 0.0 {
            return Err(LayoutError::InvalidConfig("padding_ratio must be finite and non-negative".to_string()));
        }
        if !valid_viewport_dimension(self.viewport_width) || !valid_viewport_dimension(self.viewport_height) {
            return Err(LayoutError::InvalidViewport);
        }
        Ok(())
    }
}

pub(crate) fn valid_viewport_dimension(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
