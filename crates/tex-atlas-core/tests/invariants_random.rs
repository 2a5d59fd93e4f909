use rand::{Rng, SeedableRng};
use tex_atlas_core::prelude::*;

const MARGIN: u32 = 3;

fn is_pow2(v: u32) -> bool {
    v != 0 && (v & (v - 1)) == 0
}

fn random_builder(seed: u64) -> AtlasBuilder<String> {
    let cfg = AtlasConfig::builder()
        .with_max_dimensions(512, 512)
        .margin(MARGIN)
        .build();
    let mut b = AtlasBuilder::new(cfg).expect("builder");
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let nearest = SamplerDesc::default().with_filters(FilterMode::Nearest, FilterMode::Nearest);
    let repeat_u = SamplerDesc::default().with_wrap(WrapMode::Repeat, WrapMode::ClampToEdge);
    let packed12 = PixelLayout::new(PixelFormat::Rgb, DataType::Packed, 12);
    for i in 0..200u32 {
        let kind = rng.gen_range(0..10);
        let (w, h, layout, sampler) = match kind {
            0 => (rng.gen_range(1..=48), rng.gen_range(1..=48), packed12, None),
            1 | 2 => {
                let w = if rng.gen_bool(0.5) { 64 } else { 96 };
                (w, rng.gen_range(4..=40), PixelLayout::RGBA8, Some(repeat_u))
            }
            3 | 4 => (
                rng.gen_range(1..=80),
                rng.gen_range(1..=80),
                PixelLayout::RGB8,
                Some(nearest),
            ),
            _ => (
                rng.gen_range(1..=120),
                rng.gen_range(1..=120),
                PixelLayout::RGBA8,
                None,
            ),
        };
        let img = PixelBuffer::zeroed(w, h, layout).expect("buffer");
        b.add(format!("t{i}"), img, sampler);
    }
    b.build().expect("build");
    b
}

/// Member rect grown by the margin on its atlas's non-periodic axes.
fn reserved(atlas: &Atlas, c: &Candidate<String>) -> Rect {
    let p = c.placement().expect("placed");
    let (mx, my) = atlas.margins_for(atlas.sampler());
    Rect::new(p.x, p.y, c.image.width(), c.image.height()).expand(mx, my)
}

#[test]
fn members_are_disjoint_and_in_bounds() {
    let b = random_builder(42);
    assert!(!b.atlases().is_empty());
    for atlas in b.atlases() {
        assert!(atlas.members().len() >= 2);
        assert!(is_pow2(atlas.width()) && is_pow2(atlas.height()));
        let rects: Vec<Rect> = atlas
            .members()
            .iter()
            .map(|&m| reserved(atlas, b.candidates().get(m).expect("candidate")))
            .collect();
        for r in &rects {
            assert!(r.x + r.w <= atlas.width(), "{r:?} exceeds width {}", atlas.width());
            assert!(r.y + r.h <= atlas.height(), "{r:?} exceeds height {}", atlas.height());
        }
        for i in 0..rects.len() {
            for j in (i + 1)..rects.len() {
                assert!(
                    !rects[i].overlaps(&rects[j]),
                    "overlap: {:?} vs {:?}",
                    rects[i],
                    rects[j]
                );
            }
        }
    }
}

#[test]
fn transforms_map_corners_onto_placement() {
    let b = random_builder(7);
    for (_, c) in b.candidates().iter() {
        let t = b.uv_transform(c.key.as_str()).expect("transform");
        let Some(p) = c.placement() else {
            assert!(t.is_identity());
            continue;
        };
        let atlas = b.atlas(p.atlas).expect("atlas");
        let (aw, ah) = (atlas.width() as f32, atlas.height() as f32);
        let lo = t.apply([0.0, 0.0]);
        let hi = t.apply([1.0, 1.0]);
        assert!((lo[0] - p.x as f32 / aw).abs() < 1e-5);
        assert!((lo[1] - p.y as f32 / ah).abs() < 1e-5);
        assert!((hi[0] - (p.x + c.image.width()) as f32 / aw).abs() < 1e-5);
        assert!((hi[1] - (p.y + c.image.height()) as f32 / ah).abs() < 1e-5);
    }
}

#[test]
fn unaligned_bit_depth_never_atlased() {
    let b = random_builder(99);
    for atlas in b.atlases() {
        for &m in atlas.members() {
            let c = b.candidates().get(m).expect("candidate");
            assert_eq!(c.image.layout().bits_per_pixel % 8, 0);
        }
    }
    for (_, c) in b.candidates().iter() {
        if c.image.layout().bits_per_pixel == 12 {
            assert!(c.placement().is_none());
        }
    }
}

#[test]
fn rebuild_is_deterministic() {
    let mut b = random_builder(2024);
    let snapshot = |b: &AtlasBuilder<String>| -> Vec<(String, Option<Placement>)> {
        b.candidates()
            .iter()
            .map(|(_, c)| (c.key.clone(), c.placement()))
            .collect()
    };
    let first = snapshot(&b);
    let sizes: Vec<(u32, u32)> = b.atlases().iter().map(|a| (a.width(), a.height())).collect();
    b.build().expect("rebuild");
    assert_eq!(first, snapshot(&b));
    let again: Vec<(u32, u32)> = b.atlases().iter().map(|a| (a.width(), a.height())).collect();
    assert_eq!(sizes, again);

    let fresh = random_builder(2024);
    assert_eq!(first, snapshot(&fresh));
}
