use serde::{Deserialize, Serialize};

/// Packing limits shared by every atlas of a build.
/// Key notes:
///   - `max_width`/`max_height` bound each atlas before power-of-two rounding
///   - `margin` is replicated around every packed image on non-periodic axes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AtlasConfig {
    /// Maximum atlas width in pixels.
    #[serde(default = "default_max_dim")]
    pub max_width: u32,
    /// Maximum atlas height in pixels.
    #[serde(default = "default_max_dim")]
    pub max_height: u32,
    /// Bleed pixels around each packed image.
    #[serde(default = "default_margin")]
    pub margin: u32,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            max_width: default_max_dim(),
            max_height: default_max_dim(),
            margin: default_margin(),
        }
    }
}

impl AtlasConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - Dimensions are zero
    /// - The margin alone would fill an atlas (`2 * margin >= max`), so nothing could ever fit
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::AtlasError;

        if self.max_width == 0 || self.max_height == 0 {
            return Err(AtlasError::InvalidDimensions {
                width: self.max_width,
                height: self.max_height,
            });
        }

        let total_margin = self.margin.saturating_mul(2);
        if total_margin >= self.max_width || total_margin >= self.max_height {
            return Err(AtlasError::InvalidConfig(format!(
                "margin ({}) * 2 leaves no room in atlas dimensions ({}x{})",
                self.margin, self.max_width, self.max_height
            )));
        }

        Ok(())
    }

    /// Create a fluent builder for `AtlasConfig`.
    pub fn builder() -> AtlasConfigBuilder {
        AtlasConfigBuilder::new()
    }
}

fn default_max_dim() -> u32 {
    4096
}
fn default_margin() -> u32 {
    8
}

/// Builder for `AtlasConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct AtlasConfigBuilder {
    cfg: AtlasConfig,
}

impl AtlasConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: AtlasConfig::default(),
        }
    }
    pub fn with_max_dimensions(mut self, w: u32, h: u32) -> Self {
        self.cfg.max_width = w;
        self.cfg.max_height = h;
        self
    }
    pub fn margin(mut self, v: u32) -> Self {
        self.cfg.margin = v;
        self
    }
    pub fn build(self) -> AtlasConfig {
        self.cfg
    }
}
