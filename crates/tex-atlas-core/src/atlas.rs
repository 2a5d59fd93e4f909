use crate::candidate::CandidateId;
use crate::config::AtlasConfig;
use crate::error::{AtlasError, Result};
use crate::packer::{FreeSpace, GuillotineAllocator};
use crate::pixels::{PixelBuffer, PixelLayout};
use crate::sampler::SamplerDesc;
use serde::{Deserialize, Serialize};

/// Index of an atlas in a build's atlas list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AtlasId(pub usize);

/// One shared image + sampler that several candidates are packed into.
///
/// The atlas adopts pixel layout and sampler state from its first member.
/// If that member wraps on U, the atlas is pinned to its width and only grows
/// in V (and symmetrically for V).
#[derive(Debug, Clone)]
pub struct Atlas {
    pub(crate) id: AtlasId,
    layout: Option<PixelLayout>,
    sampler: SamplerDesc,
    max_width: u32,
    max_height: u32,
    width: u32,
    height: u32,
    margin: u32,
    periodic_u: bool,
    periodic_v: bool,
    free: GuillotineAllocator,
    members: Vec<CandidateId>,
    pub(crate) image: Option<PixelBuffer>,
}

impl Atlas {
    pub(crate) fn new(id: AtlasId, cfg: &AtlasConfig) -> Self {
        Self {
            id,
            layout: None,
            sampler: SamplerDesc::default(),
            max_width: cfg.max_width,
            max_height: cfg.max_height,
            width: 0,
            height: 0,
            margin: cfg.margin,
            periodic_u: false,
            periodic_v: false,
            free: GuillotineAllocator::new(cfg.max_width, cfg.max_height),
            members: Vec::new(),
            image: None,
        }
    }

    pub fn id(&self) -> AtlasId {
        self.id
    }
    /// Current width: the working bounds while packing, the power-of-two size once built.
    pub fn width(&self) -> u32 {
        self.width
    }
    pub fn height(&self) -> u32 {
        self.height
    }
    pub fn max_width(&self) -> u32 {
        self.max_width
    }
    pub fn max_height(&self) -> u32 {
        self.max_height
    }
    pub fn margin(&self) -> u32 {
        self.margin
    }
    /// Pixel layout shared by all members; `None` while empty.
    pub fn layout(&self) -> Option<PixelLayout> {
        self.layout
    }
    pub fn sampler(&self) -> &SamplerDesc {
        &self.sampler
    }
    pub fn members(&self) -> &[CandidateId] {
        &self.members
    }
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
    pub fn is_periodic_u(&self) -> bool {
        self.periodic_u
    }
    pub fn is_periodic_v(&self) -> bool {
        self.periodic_v
    }
    /// Composited pixels; present once the build pass has finished.
    pub fn image(&self) -> Option<&PixelBuffer> {
        self.image.as_ref()
    }

    /// Margin applied on the U and V axes for a member with `sampler`.
    pub fn margins_for(&self, sampler: &SamplerDesc) -> (u32, u32) {
        let mx = if sampler.is_periodic_u() { 0 } else { self.margin };
        let my = if sampler.is_periodic_v() { 0 } else { self.margin };
        (mx, my)
    }

    /// Size reserved for a `w`×`h` image: margins on both sides of each non-periodic axis.
    pub fn padded_size(&self, w: u32, h: u32, sampler: &SamplerDesc) -> (u32, u32) {
        let (mx, my) = self.margins_for(sampler);
        (w + mx * 2, h + my * 2)
    }

    pub(crate) fn fits(&self, w: u32, h: u32) -> bool {
        self.free.can_fit(w, h)
    }

    fn seed(&mut self, image: &PixelBuffer, sampler: &SamplerDesc) {
        self.layout = Some(image.layout());
        self.sampler = *sampler;
        self.periodic_u = sampler.is_periodic_u();
        self.periodic_v = sampler.is_periodic_v();
        if self.periodic_u {
            self.max_width = image.width();
            self.width = image.width();
        }
        if self.periodic_v {
            self.max_height = image.height();
            self.height = image.height();
        }
        self.free = GuillotineAllocator::new(self.max_width, self.max_height);
    }

    /// Places a member and returns its content origin, or `None` if no free region fits.
    /// Compatibility must have been checked by the caller.
    pub(crate) fn add(
        &mut self,
        id: CandidateId,
        image: &PixelBuffer,
        sampler: &SamplerDesc,
    ) -> Option<(u32, u32)> {
        if self.members.is_empty() {
            self.seed(image, sampler);
        }
        let (pw, ph) = self.padded_size(image.width(), image.height(), sampler);
        let slot = self.free.carve(pw, ph)?;
        let (mx, my) = self.margins_for(sampler);
        self.width = self.width.max(slot.x + pw);
        self.height = self.height.max(slot.y + ph);
        self.members.push(id);
        Some((slot.x + mx, slot.y + my))
    }

    /// Rounds each working dimension up to the next power of two.
    ///
    /// Fails if a dimension is above 2^31, where no `u32` power of two exists.
    pub(crate) fn clamp_to_pow2(&mut self) -> Result<()> {
        match (next_pow2(self.width), next_pow2(self.height)) {
            (Some(w), Some(h)) => {
                self.width = w;
                self.height = h;
                Ok(())
            }
            _ => Err(AtlasError::InvalidDimensions {
                width: self.width,
                height: self.height,
            }),
        }
    }
}

fn next_pow2(v: u32) -> Option<u32> {
    v.max(1).checked_next_power_of_two()
}
