use crate::atlas::Atlas;
use crate::candidate::CandidateRegistry;
use crate::error::{AtlasError, Result};
use crate::pixels::PixelBuffer;
use std::hash::Hash;

/// Blit `src` into `canvas` with its top-left at (dx, dy), then replicate
/// its edge pixels outward to fill the bleed margins.
///
/// - mx: margin columns on each side (0 on a periodic U axis)
/// - my: margin rows above and below (0 on a periodic V axis)
///
/// Rows are extended first; columns are then extended across the full
/// margin-expanded height, so corners take the diagonal corner pixel.
pub fn blit_with_margins(
    src: &PixelBuffer,
    canvas: &mut PixelBuffer,
    dx: u32,
    dy: u32,
    mx: u32,
    my: u32,
) {
    let (cw, ch) = canvas.dimensions();
    if dx >= cw || dy >= ch {
        return;
    }
    canvas.write_image(src, dx, dy);
    // clipped content size
    let w = src.width().min(cw - dx);
    let h = src.height().min(ch - dy);

    let last_row = dy + h - 1;
    for e in 1..=my {
        if dy >= e {
            canvas.copy_row_span(dy, dy - e, dx, w);
        }
        if last_row + e < ch {
            canvas.copy_row_span(last_row, last_row + e, dx, w);
        }
    }

    if mx == 0 {
        return;
    }
    let last_col = dx + w - 1;
    let y0 = dy.saturating_sub(my);
    let y1 = (last_row + my + 1).min(ch);
    for y in y0..y1 {
        for e in 1..=mx {
            if dx >= e {
                canvas.copy_pixel((dx, y), (dx - e, y));
            }
            if last_col + e < cw {
                canvas.copy_pixel((last_col, y), (last_col + e, y));
            }
        }
    }
}

/// Allocates the atlas image at its current size, zeroed, and draws every member into it.
pub fn composite<K: Eq + Hash + Clone>(
    atlas: &Atlas,
    candidates: &CandidateRegistry<K>,
) -> Result<PixelBuffer> {
    let layout = atlas
        .layout()
        .ok_or_else(|| AtlasError::UnsupportedLayout("atlas has no members".into()))?;
    let mut canvas = PixelBuffer::zeroed(atlas.width(), atlas.height(), layout)?;
    let (mx, my) = atlas.margins_for(atlas.sampler());
    for &id in atlas.members() {
        let Some(c) = candidates.get(id) else {
            continue;
        };
        if let Some(p) = c.placement() {
            blit_with_margins(&c.image, &mut canvas, p.x, p.y, mx, my);
        }
    }
    Ok(canvas)
}
