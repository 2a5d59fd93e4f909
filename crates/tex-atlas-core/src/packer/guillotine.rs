use super::FreeSpace;
use crate::model::Rect;

/// First-fit guillotine allocator with a shelf split.
///
/// Claiming `w`×`h` from a free rect `F` leaves at most two pieces:
/// a full-width band below the claim (`F.w` × `F.h - h`) and the
/// remainder beside it at the claim's height (`F.w - w` × `h`).
#[derive(Debug, Clone)]
pub struct GuillotineAllocator {
    free: Vec<Rect>,
}

impl GuillotineAllocator {
    /// One free rect covering `width`×`height` at the origin.
    pub fn new(width: u32, height: u32) -> Self {
        let mut free = Vec::new();
        if width > 0 && height > 0 {
            free.push(Rect::new(0, 0, width, height));
        }
        Self { free }
    }

    pub fn free_rects(&self) -> &[Rect] {
        &self.free
    }

    /// Largest free rect by area.
    pub fn largest_free(&self) -> Option<Rect> {
        self.free.iter().copied().max_by(|a, b| a.cmp_area(b))
    }

    fn first_fit(&self, w: u32, h: u32) -> Option<usize> {
        self.free.iter().position(|fr| fr.w >= w && fr.h >= h)
    }

    fn split(fr: &Rect, w: u32, h: u32) -> (Option<Rect>, Option<Rect>) {
        let below = if fr.h > h {
            Some(Rect::new(fr.x, fr.y + h, fr.w, fr.h - h))
        } else {
            None
        };
        let beside = if fr.w > w {
            Some(Rect::new(fr.x + w, fr.y, fr.w - w, h))
        } else {
            None
        };
        (below, beside)
    }
}

impl FreeSpace for GuillotineAllocator {
    fn can_fit(&self, w: u32, h: u32) -> bool {
        self.first_fit(w, h).is_some()
    }

    fn carve(&mut self, w: u32, h: u32) -> Option<Rect> {
        let idx = self.first_fit(w, h)?;
        // `remove` keeps scan order stable, which keeps first-fit deterministic.
        let fr = self.free.remove(idx);
        let (a, b) = Self::split(&fr, w, h);
        if let Some(r) = a {
            self.free.push(r);
        }
        if let Some(r) = b {
            self.free.push(r);
        }
        Some(Rect::new(fr.x, fr.y, w, h))
    }
}
