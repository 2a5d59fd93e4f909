use crate::atlas::AtlasId;
use crate::pixels::{DataType, PixelFormat};
use std::fmt;
use tracing::{debug, trace};

/// Texture axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    U,
    V,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::U => f.write_str("U"),
            Axis::V => f.write_str("V"),
        }
    }
}

/// Why a candidate was kept out of an atlas (or out of atlasing altogether).
///
/// Rejections are never fatal: the candidate simply keeps its own image.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    CompressedFormat(PixelFormat),
    UnalignedBitDepth(u32),
    RenderTarget,
    TooLarge {
        width: u32,
        height: u32,
        margin: u32,
        max_width: u32,
        max_height: u32,
    },
    DoublyPeriodic,
    LayoutMismatch {
        format: PixelFormat,
        data_type: DataType,
        bits_per_pixel: u32,
    },
    WrapMismatch(Axis),
    PeriodicSizeMismatch {
        axis: Axis,
        expected: u32,
        actual: u32,
    },
    BorderMismatch,
    SamplerMismatch(&'static str),
    NoSpace {
        width: u32,
        height: u32,
    },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::CompressedFormat(fmt_) => {
                write!(f, "compressed pixel format {fmt_:?} cannot be atlased")
            }
            Rejection::UnalignedBitDepth(bits) => {
                write!(f, "{bits} bits per pixel is not a multiple of 8")
            }
            Rejection::RenderTarget => f.write_str("sampler reads from a render target"),
            Rejection::TooLarge {
                width,
                height,
                margin,
                max_width,
                max_height,
            } => write!(
                f,
                "{width}x{height} plus margin {margin} exceeds atlas limit {max_width}x{max_height}"
            ),
            Rejection::DoublyPeriodic => f.write_str("wraps on both axes"),
            Rejection::LayoutMismatch {
                format,
                data_type,
                bits_per_pixel,
            } => write!(
                f,
                "pixel layout {format:?}/{data_type:?}/{bits_per_pixel}bpp differs from atlas"
            ),
            Rejection::WrapMismatch(axis) => write!(f, "{axis} wrap mode differs from atlas"),
            Rejection::PeriodicSizeMismatch {
                axis,
                expected,
                actual,
            } => write!(
                f,
                "periodic {axis} atlas is pinned to {expected}px, candidate has {actual}px"
            ),
            Rejection::BorderMismatch => f.write_str("border clamp or border color differs"),
            Rejection::SamplerMismatch(field) => write!(f, "sampler {field} differs"),
            Rejection::NoSpace { width, height } => {
                write!(f, "no free region for {width}x{height}")
            }
        }
    }
}

/// Events emitted while building atlases.
#[derive(Debug, Clone)]
pub enum Diagnostic<'a, K> {
    /// Candidate can never be atlased.
    Ineligible { key: &'a K, reason: Rejection },
    /// Candidate was turned down by one specific atlas.
    Incompatible {
        key: &'a K,
        atlas: AtlasId,
        reason: Rejection,
    },
    AtlasCreated { atlas: AtlasId, seed: &'a K },
    Placed {
        key: &'a K,
        atlas: AtlasId,
        x: u32,
        y: u32,
    },
    /// Atlas ended up with a single member and was dropped.
    AtlasDiscarded { atlas: AtlasId, member: &'a K },
    AtlasFinished {
        atlas: AtlasId,
        width: u32,
        height: u32,
        members: usize,
    },
}

/// Receives build diagnostics. Any `FnMut(&Diagnostic<K>)` closure is a sink.
pub trait DiagnosticSink<K> {
    fn report(&mut self, event: &Diagnostic<'_, K>);
}

impl<K, F> DiagnosticSink<K> for F
where
    F: FnMut(&Diagnostic<'_, K>),
{
    fn report(&mut self, event: &Diagnostic<'_, K>) {
        self(event)
    }
}

/// Default sink: forwards every event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl<K: fmt::Debug> DiagnosticSink<K> for TracingSink {
    fn report(&mut self, event: &Diagnostic<'_, K>) {
        match event {
            Diagnostic::Ineligible { key, reason } => {
                debug!(?key, %reason, "candidate not eligible for atlasing")
            }
            Diagnostic::Incompatible { key, atlas, reason } => {
                trace!(?key, atlas = atlas.0, %reason, "atlas rejected candidate")
            }
            Diagnostic::AtlasCreated { atlas, seed } => {
                debug!(atlas = atlas.0, ?seed, "new atlas")
            }
            Diagnostic::Placed { key, atlas, x, y } => {
                trace!(?key, atlas = atlas.0, x, y, "placed")
            }
            Diagnostic::AtlasDiscarded { atlas, member } => {
                debug!(atlas = atlas.0, ?member, "single-member atlas discarded")
            }
            Diagnostic::AtlasFinished {
                atlas,
                width,
                height,
                members,
            } => debug!(atlas = atlas.0, width, height, members, "atlas composited"),
        }
    }
}
