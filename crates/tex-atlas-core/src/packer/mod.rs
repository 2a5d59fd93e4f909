use crate::model::Rect;

pub mod guillotine;

pub use guillotine::GuillotineAllocator;

/// Free space inside one atlas.
///
/// Implementations keep their free rects disjoint; `carve` removes exactly
/// the returned region from the free set.
pub trait FreeSpace {
    fn can_fit(&self, w: u32, h: u32) -> bool;
    fn carve(&mut self, w: u32, h: u32) -> Option<Rect>;
}
