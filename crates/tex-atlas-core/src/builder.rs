use crate::atlas::{Atlas, AtlasId};
use crate::candidate::{Candidate, CandidateRegistry, Placement, check_eligible};
use crate::compat::check_compatible;
use crate::compositing;
use crate::config::AtlasConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::error::{AtlasError, Result};
use crate::model::{AtlasStats, UvTransform};
use crate::pixels::PixelBuffer;
use crate::sampler::SamplerDesc;
use std::borrow::Borrow;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::instrument;

/// What the caller needs to redirect one source image to its atlas.
///
/// For a candidate that was not atlased, `atlas`, `image` and `sampler` are
/// `None` and `transform` is the identity.
#[derive(Debug, Clone, Copy)]
pub struct AtlasLookup<'a> {
    pub atlas: Option<AtlasId>,
    pub image: Option<&'a PixelBuffer>,
    pub sampler: Option<&'a SamplerDesc>,
    pub transform: UvTransform,
}

/// Texture-space transform of `candidate` inside `atlas`; identity if it was not placed there.
pub fn remap<K>(candidate: &Candidate<K>, atlas: &Atlas) -> UvTransform {
    match candidate.placement() {
        Some(p) if p.atlas == atlas.id() && atlas.width() > 0 && atlas.height() > 0 => {
            UvTransform::for_region(
                p.x,
                p.y,
                candidate.image.width(),
                candidate.image.height(),
                atlas.width(),
                atlas.height(),
            )
        }
        _ => UvTransform::IDENTITY,
    }
}

/// Batch atlas builder.
///
/// Register candidates with [`add`](Self::add), run [`build`](Self::build), then
/// query [`lookup`](Self::lookup) per key. A build always starts from scratch, so
/// running it twice on the same registry gives the same result.
pub struct AtlasBuilder<K, S = TracingSink> {
    cfg: AtlasConfig,
    registry: CandidateRegistry<K>,
    atlases: Vec<Atlas>,
    sink: S,
}

impl<K: Eq + Hash + Clone + Debug> AtlasBuilder<K, TracingSink> {
    /// Builder that reports diagnostics through `tracing`.
    pub fn new(cfg: AtlasConfig) -> Result<Self> {
        Self::with_sink(cfg, TracingSink)
    }
}

impl<K, S> AtlasBuilder<K, S>
where
    K: Eq + Hash + Clone + Debug,
    S: DiagnosticSink<K>,
{
    pub fn with_sink(cfg: AtlasConfig, sink: S) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            registry: CandidateRegistry::new(),
            atlases: Vec::new(),
            sink,
        })
    }

    pub fn config(&self) -> &AtlasConfig {
        &self.cfg
    }

    /// Submits one source image. Returns `false` if `key` was already registered,
    /// in which case the new data is ignored.
    pub fn add(&mut self, key: K, image: PixelBuffer, sampler: Option<SamplerDesc>) -> bool {
        self.registry.insert(key, image, sampler).1
    }

    /// Submits everything a candidate producer yields; returns how many were new.
    pub fn add_all<I>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator<Item = Candidate<K>>,
    {
        let mut added = 0;
        for c in candidates {
            if self.registry.insert(c.key, c.image, c.sampler).1 {
                added += 1;
            }
        }
        added
    }

    /// Drops every candidate and atlas.
    pub fn reset(&mut self) {
        self.registry.clear();
        self.atlases.clear();
    }

    pub fn candidates(&self) -> &CandidateRegistry<K> {
        &self.registry
    }

    /// Atlases produced by the last build, each with at least two members.
    pub fn atlases(&self) -> &[Atlas] {
        &self.atlases
    }

    pub fn atlas(&self, id: AtlasId) -> Option<&Atlas> {
        self.atlases.get(id.0)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Assigns every candidate to an atlas (largest first), drops single-member
    /// atlases, rounds the rest to powers of two and composites their pixels.
    #[instrument(skip_all, fields(candidates = self.registry.len()))]
    pub fn build(&mut self) -> Result<()> {
        let Self {
            cfg,
            registry,
            atlases,
            sink,
        } = self;
        atlases.clear();
        registry.clear_placements();

        let mut order = Vec::with_capacity(registry.len());
        for id in registry.ids_by_height() {
            let Some(c) = registry.get(id) else { continue };
            match check_eligible(&c.image, &c.effective_sampler(), cfg) {
                Ok(()) => order.push(id),
                Err(reason) => sink.report(&Diagnostic::Ineligible { key: &c.key, reason }),
            }
        }
        // ascending height, reversed: largest first
        order.reverse();

        for id in order {
            let Some(c) = registry.get(id) else { continue };
            let sampler = c.effective_sampler();
            let mut placed = None;
            for atlas in atlases.iter_mut() {
                match check_compatible(atlas, &c.image, &sampler) {
                    Ok(()) => {
                        if let Some(origin) = atlas.add(id, &c.image, &sampler) {
                            placed = Some((atlas.id(), origin));
                            break;
                        }
                    }
                    Err(reason) => sink.report(&Diagnostic::Incompatible {
                        key: &c.key,
                        atlas: atlas.id(),
                        reason,
                    }),
                }
            }
            if placed.is_none() {
                let mut atlas = Atlas::new(AtlasId(atlases.len()), cfg);
                if let Some(origin) = atlas.add(id, &c.image, &sampler) {
                    sink.report(&Diagnostic::AtlasCreated {
                        atlas: atlas.id(),
                        seed: &c.key,
                    });
                    placed = Some((atlas.id(), origin));
                    atlases.push(atlas);
                }
            }
            if let Some((atlas, (x, y))) = placed {
                sink.report(&Diagnostic::Placed {
                    key: &c.key,
                    atlas,
                    x,
                    y,
                });
                if let Some(c) = registry.get_mut(id) {
                    c.placement = Some(Placement { atlas, x, y });
                }
            }
        }

        let mut kept = Vec::with_capacity(atlases.len());
        for atlas in atlases.drain(..) {
            if atlas.members().len() > 1 {
                kept.push(atlas);
                continue;
            }
            for &m in atlas.members() {
                if let Some(c) = registry.get_mut(m) {
                    c.placement = None;
                    sink.report(&Diagnostic::AtlasDiscarded {
                        atlas: atlas.id(),
                        member: &c.key,
                    });
                }
            }
        }

        for (i, atlas) in kept.iter_mut().enumerate() {
            let id = AtlasId(i);
            atlas.id = id;
            for &m in atlas.members() {
                if let Some(p) = registry.get_mut(m).and_then(|c| c.placement.as_mut()) {
                    p.atlas = id;
                }
            }
            atlas.clamp_to_pow2()?;
            let image = compositing::composite(&*atlas, &*registry)?;
            atlas.image = Some(image);
            sink.report(&Diagnostic::AtlasFinished {
                atlas: id,
                width: atlas.width(),
                height: atlas.height(),
                members: atlas.members().len(),
            });
        }
        *atlases = kept;
        Ok(())
    }

    /// Atlas image, sampler and texture-space transform for a submitted key.
    ///
    /// Errors with `UnknownCandidate` if the key was never submitted.
    pub fn lookup<Q>(&self, key: &Q) -> Result<AtlasLookup<'_>>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + Debug + ?Sized,
    {
        let c = self
            .registry
            .id_of(key)
            .and_then(|id| self.registry.get(id))
            .ok_or_else(|| AtlasError::UnknownCandidate(format!("{key:?}")))?;
        let Some(atlas) = c.atlas().and_then(|id| self.atlases.get(id.0)) else {
            return Ok(AtlasLookup {
                atlas: None,
                image: None,
                sampler: None,
                transform: UvTransform::IDENTITY,
            });
        };
        Ok(AtlasLookup {
            atlas: Some(atlas.id()),
            image: atlas.image(),
            sampler: Some(atlas.sampler()),
            transform: remap(c, atlas),
        })
    }

    /// Shorthand for `lookup(key)?.transform`.
    pub fn uv_transform<Q>(&self, key: &Q) -> Result<UvTransform>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + Debug + ?Sized,
    {
        Ok(self.lookup(key)?.transform)
    }

    /// Computes statistics for the last build.
    pub fn stats(&self) -> AtlasStats {
        let mut total_atlas_area = 0u64;
        let mut used_area = 0u64;
        let mut num_atlased = 0usize;
        for atlas in &self.atlases {
            total_atlas_area += (atlas.width() as u64) * (atlas.height() as u64);
            for &m in atlas.members() {
                if let Some(c) = self.registry.get(m) {
                    num_atlased += 1;
                    used_area += (c.image.width() as u64) * (c.image.height() as u64);
                }
            }
        }
        let occupancy = if total_atlas_area > 0 {
            used_area as f64 / total_atlas_area as f64
        } else {
            0.0
        };
        AtlasStats {
            num_atlases: self.atlases.len(),
            num_candidates: self.registry.len(),
            num_atlased,
            total_atlas_area,
            used_area,
            occupancy,
        }
    }
}
