use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Area in pixels.
    pub fn area(&self) -> u64 {
        (self.w as u64) * (self.h as u64)
    }
    /// Size ordering: by area, then by height, then by width.
    /// Position is ignored, so two equally sized rects compare `Equal`.
    pub fn cmp_area(&self, other: &Rect) -> Ordering {
        self.area()
            .cmp(&other.area())
            .then_with(|| self.h.cmp(&other.h))
            .then_with(|| self.w.cmp(&other.w))
    }
    /// Returns true if the two rects share at least one pixel.
    pub fn overlaps(&self, r: &Rect) -> bool {
        let (ax2, ay2) = (self.x + self.w, self.y + self.h);
        let (bx2, by2) = (r.x + r.w, r.y + r.h);
        !(self.x >= bx2 || r.x >= ax2 || self.y >= by2 || r.y >= ay2)
    }
    /// Grow by `mx` pixels left/right and `my` pixels top/bottom.
    /// The origin saturates at zero.
    pub fn expand(&self, mx: u32, my: u32) -> Rect {
        Rect::new(
            self.x.saturating_sub(mx),
            self.y.saturating_sub(my),
            self.w + mx * 2,
            self.h + my * 2,
        )
    }
}

/// Affine map from a source image's `[0,1]²` texture space into its atlas's `[0,1]²` space.
///
/// `(s, t)` maps to `(s * scale[0] + offset[0], t * scale[1] + offset[1])`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct UvTransform {
    pub scale: [f32; 2],
    pub offset: [f32; 2],
}

impl Default for UvTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl UvTransform {
    pub const IDENTITY: UvTransform = UvTransform {
        scale: [1.0, 1.0],
        offset: [0.0, 0.0],
    };

    /// Transform for a `w`×`h` region placed at `(x, y)` inside an `atlas_w`×`atlas_h` image.
    pub fn for_region(x: u32, y: u32, w: u32, h: u32, atlas_w: u32, atlas_h: u32) -> Self {
        let aw = atlas_w as f32;
        let ah = atlas_h as f32;
        Self {
            scale: [w as f32 / aw, h as f32 / ah],
            offset: [x as f32 / aw, y as f32 / ah],
        }
    }

    pub fn apply(&self, st: [f32; 2]) -> [f32; 2] {
        [
            st[0] * self.scale[0] + self.offset[0],
            st[1] * self.scale[1] + self.offset[1],
        ]
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Row-major 3x3 homogeneous matrix, for callers that keep the transform
    /// separate from vertex data (e.g. a per-draw texture matrix).
    pub fn to_matrix(&self) -> [[f32; 3]; 3] {
        [
            [self.scale[0], 0.0, self.offset[0]],
            [0.0, self.scale[1], self.offset[1]],
            [0.0, 0.0, 1.0],
        ]
    }
}

/// Statistics about one build pass.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct AtlasStats {
    /// Atlases that survived the pass.
    pub num_atlases: usize,
    /// Candidates submitted.
    pub num_candidates: usize,
    /// Candidates placed in an atlas.
    pub num_atlased: usize,
    /// Sum of final atlas areas.
    pub total_atlas_area: u64,
    /// Sum of member image areas (margins excluded).
    pub used_area: u64,
    /// used_area / total_atlas_area (0.0 to 1.0).
    pub occupancy: f64,
}

impl AtlasStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Atlases: {}, Atlased: {}/{}, Occupancy: {:.2}%, Total Area: {} px², Used Area: {} px²",
            self.num_atlases,
            self.num_atlased,
            self.num_candidates,
            self.occupancy * 100.0,
            self.total_atlas_area,
            self.used_area,
        )
    }

    /// Returns wasted space in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.total_atlas_area.saturating_sub(self.used_area)
    }

    /// Returns wasted space as a percentage (0.0 to 100.0).
    pub fn waste_percentage(&self) -> f64 {
        if self.total_atlas_area > 0 {
            (self.wasted_area() as f64 / self.total_atlas_area as f64) * 100.0
        } else {
            0.0
        }
    }
}
