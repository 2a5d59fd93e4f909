use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Texture-coordinate wrap mode for one axis.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WrapMode {
    Clamp,
    #[default]
    ClampToEdge,
    ClampToBorder,
    Repeat,
    MirroredRepeat,
}

impl WrapMode {
    /// Repeat and mirror both tile the texture along the axis.
    pub fn is_periodic(&self) -> bool {
        matches!(self, Self::Repeat | Self::MirroredRepeat)
    }
}

impl FromStr for WrapMode {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "clamp" => Ok(Self::Clamp),
            "clamp_to_edge" | "edge" => Ok(Self::ClampToEdge),
            "clamp_to_border" | "border" => Ok(Self::ClampToBorder),
            "repeat" => Ok(Self::Repeat),
            "mirror" | "mirrored_repeat" => Ok(Self::MirroredRepeat),
            _ => Err(()),
        }
    }
}

/// Minification / magnification filter.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    Nearest,
    #[default]
    Linear,
    NearestMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapNearest,
    LinearMipmapLinear,
}

impl FromStr for FilterMode {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "linear" => Ok(Self::Linear),
            "nearest_mipmap_nearest" => Ok(Self::NearestMipmapNearest),
            "nearest_mipmap_linear" => Ok(Self::NearestMipmapLinear),
            "linear_mipmap_nearest" => Ok(Self::LinearMipmapNearest),
            "linear_mipmap_linear" | "trilinear" => Ok(Self::LinearMipmapLinear),
            _ => Err(()),
        }
    }
}

/// Depth comparison used by shadow samplers.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CompareFunction {
    Never,
    Less,
    Equal,
    #[default]
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

/// How the GPU-side storage format is chosen.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InternalFormat {
    /// Derive from the image's pixel format.
    #[default]
    FromImage,
    /// Ask the driver to compress on upload.
    Compressed,
    /// Explicit format identifier (API specific).
    Explicit(u32),
}

/// GPU sampling state bound to a source image.
///
/// Two images can only share an atlas when all of these match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SamplerDesc {
    pub wrap_u: WrapMode,
    pub wrap_v: WrapMode,
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
    pub max_anisotropy: f32,
    pub internal_format: InternalFormat,
    /// RGBA border color, used with `ClampToBorder`.
    pub border_color: [f32; 4],
    /// Depth-compare enabled (shadow sampler).
    pub shadow_compare: bool,
    pub shadow_function: CompareFunction,
    pub shadow_ambient: f32,
    /// Sampler reads from a render target rather than CPU-resident pixels.
    pub render_target: bool,
}

impl Default for SamplerDesc {
    fn default() -> Self {
        Self {
            wrap_u: WrapMode::default(),
            wrap_v: WrapMode::default(),
            min_filter: FilterMode::default(),
            mag_filter: FilterMode::default(),
            max_anisotropy: 1.0,
            internal_format: InternalFormat::default(),
            border_color: [0.0, 0.0, 0.0, 0.0],
            shadow_compare: false,
            shadow_function: CompareFunction::default(),
            shadow_ambient: 0.0,
            render_target: false,
        }
    }
}

impl SamplerDesc {
    pub fn with_wrap(mut self, u: WrapMode, v: WrapMode) -> Self {
        self.wrap_u = u;
        self.wrap_v = v;
        self
    }
    pub fn with_filters(mut self, min: FilterMode, mag: FilterMode) -> Self {
        self.min_filter = min;
        self.mag_filter = mag;
        self
    }
    pub fn with_border_color(mut self, color: [f32; 4]) -> Self {
        self.border_color = color;
        self
    }

    pub fn is_periodic_u(&self) -> bool {
        self.wrap_u.is_periodic()
    }
    pub fn is_periodic_v(&self) -> bool {
        self.wrap_v.is_periodic()
    }
    /// True if either axis clamps to the border color.
    pub fn uses_border(&self) -> bool {
        self.wrap_u == WrapMode::ClampToBorder || self.wrap_v == WrapMode::ClampToBorder
    }
}
