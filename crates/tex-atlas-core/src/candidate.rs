use crate::atlas::AtlasId;
use crate::config::AtlasConfig;
use crate::diagnostics::Rejection;
use crate::pixels::PixelBuffer;
use crate::sampler::SamplerDesc;
use std::collections::HashMap;
use std::hash::Hash;

/// Index of a candidate inside its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidateId(pub usize);

/// Where a candidate ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub atlas: AtlasId,
    /// Top-left of the image content (margins excluded) inside the atlas.
    pub x: u32,
    pub y: u32,
}

/// A source image plus optional sampler state, submitted for atlasing.
#[derive(Debug, Clone)]
pub struct Candidate<K> {
    pub key: K,
    pub image: PixelBuffer,
    pub sampler: Option<SamplerDesc>,
    pub(crate) placement: Option<Placement>,
}

impl<K> Candidate<K> {
    pub fn new(key: K, image: PixelBuffer, sampler: Option<SamplerDesc>) -> Self {
        Self {
            key,
            image,
            sampler,
            placement: None,
        }
    }

    /// Sampler state used for matching; a missing sampler counts as the default one.
    pub fn effective_sampler(&self) -> SamplerDesc {
        self.sampler.unwrap_or_default()
    }

    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    pub fn atlas(&self) -> Option<AtlasId> {
        self.placement.map(|p| p.atlas)
    }
}

/// Decides whether a candidate could be atlased at all, independent of any atlas.
///
/// Pure: no side effects, same answer every time.
pub fn check_eligible(
    image: &PixelBuffer,
    sampler: &SamplerDesc,
    cfg: &AtlasConfig,
) -> Result<(), Rejection> {
    let layout = image.layout();
    if layout.format.is_compressed() {
        return Err(Rejection::CompressedFormat(layout.format));
    }
    if layout.bytes_per_pixel().is_none() {
        return Err(Rejection::UnalignedBitDepth(layout.bits_per_pixel));
    }
    if sampler.render_target {
        return Err(Rejection::RenderTarget);
    }
    let m2 = cfg.margin.saturating_mul(2);
    if image.width().saturating_add(m2) > cfg.max_width
        || image.height().saturating_add(m2) > cfg.max_height
    {
        return Err(Rejection::TooLarge {
            width: image.width(),
            height: image.height(),
            margin: cfg.margin,
            max_width: cfg.max_width,
            max_height: cfg.max_height,
        });
    }
    if sampler.is_periodic_u() && sampler.is_periodic_v() {
        return Err(Rejection::DoublyPeriodic);
    }
    Ok(())
}

/// Every candidate submitted for one build, deduplicated by key.
///
/// Storage is an arena in submission order; `CandidateId` indexes into it.
#[derive(Debug, Clone)]
pub struct CandidateRegistry<K> {
    items: Vec<Candidate<K>>,
    index: HashMap<K, CandidateId>,
}

impl<K> Default for CandidateRegistry<K> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> CandidateRegistry<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a candidate. A key already present is ignored and its existing id returned
    /// together with `false`.
    pub fn insert(
        &mut self,
        key: K,
        image: PixelBuffer,
        sampler: Option<SamplerDesc>,
    ) -> (CandidateId, bool) {
        if let Some(&id) = self.index.get(&key) {
            return (id, false);
        }
        let id = CandidateId(self.items.len());
        self.index.insert(key.clone(), id);
        self.items.push(Candidate::new(key, image, sampler));
        (id, true)
    }

    pub fn id_of<Q>(&self, key: &Q) -> Option<CandidateId>
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.index.get(key).copied()
    }

    pub fn get(&self, id: CandidateId) -> Option<&Candidate<K>> {
        self.items.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: CandidateId) -> Option<&mut Candidate<K>> {
        self.items.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CandidateId, &Candidate<K>)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, c)| (CandidateId(i), c))
    }

    /// Ids in ascending height; equal heights keep submission order.
    pub fn ids_by_height(&self) -> Vec<CandidateId> {
        let mut ids: Vec<CandidateId> = (0..self.items.len()).map(CandidateId).collect();
        ids.sort_by_key(|id| self.items[id.0].image.height());
        ids
    }

    pub(crate) fn clear_placements(&mut self) {
        for c in &mut self.items {
            c.placement = None;
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }
}
