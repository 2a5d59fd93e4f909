use crate::atlas::Atlas;
use crate::diagnostics::{Axis, Rejection};
use crate::pixels::PixelBuffer;
use crate::sampler::SamplerDesc;

/// Decides whether a candidate may join `atlas`.
///
/// An empty atlas accepts anything that fits its free space; a non-empty one
/// additionally requires identical pixel layout and sampler state, and the
/// exact pinned size on a periodic axis.
pub fn check_compatible(
    atlas: &Atlas,
    image: &PixelBuffer,
    sampler: &SamplerDesc,
) -> Result<(), Rejection> {
    if sampler.render_target {
        return Err(Rejection::RenderTarget);
    }
    if !atlas.is_empty() {
        check_layout(atlas, image)?;
        check_sampler(atlas, image, sampler)?;
    }
    let (pw, ph) = atlas.padded_size(image.width(), image.height(), sampler);
    if !atlas.fits(pw, ph) {
        return Err(Rejection::NoSpace {
            width: pw,
            height: ph,
        });
    }
    Ok(())
}

fn check_layout(atlas: &Atlas, image: &PixelBuffer) -> Result<(), Rejection> {
    let layout = image.layout();
    if atlas.layout() != Some(layout) {
        return Err(Rejection::LayoutMismatch {
            format: layout.format,
            data_type: layout.data_type,
            bits_per_pixel: layout.bits_per_pixel,
        });
    }
    Ok(())
}

fn check_sampler(atlas: &Atlas, image: &PixelBuffer, s: &SamplerDesc) -> Result<(), Rejection> {
    let a = atlas.sampler();
    if s.wrap_u != a.wrap_u {
        return Err(Rejection::WrapMismatch(Axis::U));
    }
    if s.wrap_v != a.wrap_v {
        return Err(Rejection::WrapMismatch(Axis::V));
    }
    if atlas.is_periodic_u() && image.width() != atlas.max_width() {
        return Err(Rejection::PeriodicSizeMismatch {
            axis: Axis::U,
            expected: atlas.max_width(),
            actual: image.width(),
        });
    }
    if atlas.is_periodic_v() && image.height() != atlas.max_height() {
        return Err(Rejection::PeriodicSizeMismatch {
            axis: Axis::V,
            expected: atlas.max_height(),
            actual: image.height(),
        });
    }
    if s.uses_border() != a.uses_border() || (s.uses_border() && s.border_color != a.border_color)
    {
        return Err(Rejection::BorderMismatch);
    }
    if s.min_filter != a.min_filter {
        return Err(Rejection::SamplerMismatch("min filter"));
    }
    if s.mag_filter != a.mag_filter {
        return Err(Rejection::SamplerMismatch("mag filter"));
    }
    if s.max_anisotropy != a.max_anisotropy {
        return Err(Rejection::SamplerMismatch("max anisotropy"));
    }
    if s.internal_format != a.internal_format {
        return Err(Rejection::SamplerMismatch("internal format"));
    }
    if s.shadow_function != a.shadow_function {
        return Err(Rejection::SamplerMismatch("shadow compare function"));
    }
    if s.shadow_compare != a.shadow_compare {
        return Err(Rejection::SamplerMismatch("shadow compare mode"));
    }
    if s.shadow_ambient != a.shadow_ambient {
        return Err(Rejection::SamplerMismatch("shadow ambient"));
    }
    Ok(())
}
