use tex_atlas_core::error::AtlasError;
use tex_atlas_core::prelude::*;

/// Keeps the placement-related events as short strings.
#[derive(Default)]
struct Recorder {
    events: Vec<String>,
}

impl DiagnosticSink<String> for Recorder {
    fn report(&mut self, e: &Diagnostic<'_, String>) {
        let line = match e {
            Diagnostic::AtlasCreated { atlas, seed } => format!("create {} {}", atlas.0, seed),
            Diagnostic::Placed { key, atlas, .. } => format!("place {} {}", key, atlas.0),
            Diagnostic::Incompatible { key, atlas, .. } => format!("reject {} {}", key, atlas.0),
            Diagnostic::AtlasDiscarded { atlas, member } => {
                format!("discard {} {}", atlas.0, member)
            }
            _ => return,
        };
        self.events.push(line);
    }
}

fn rgba(w: u32, h: u32) -> PixelBuffer {
    PixelBuffer::filled(w, h, PixelLayout::RGBA8, &[10, 20, 30, 255]).expect("buffer")
}

fn is_pow2(v: u32) -> bool {
    v != 0 && (v & (v - 1)) == 0
}

#[test]
fn largest_first_then_first_fit() {
    let cfg = AtlasConfig::builder()
        .with_max_dimensions(256, 256)
        .margin(2)
        .build();
    let mut b = AtlasBuilder::with_sink(cfg, Recorder::default()).expect("builder");
    b.add("small".to_string(), rgba(32, 32), None);
    b.add("big".to_string(), rgba(200, 200), None);
    b.add("mid".to_string(), rgba(64, 64), None);
    b.build().expect("build");

    assert_eq!(
        b.sink().events,
        vec![
            "create 0 big",
            "place big 0",
            "reject mid 0",
            "create 1 mid",
            "place mid 1",
            "place small 0",
            "discard 1 mid",
        ]
    );

    // big sits in the region carved at (0,0), inset by the margin
    let big = b.lookup("big").expect("lookup");
    assert_eq!(big.atlas, Some(AtlasId(0)));
    let p = b
        .candidates()
        .get(b.candidates().id_of("big").expect("id"))
        .and_then(|c| c.placement())
        .expect("placed");
    assert_eq!((p.x, p.y), (2, 2));

    assert_eq!(b.atlases().len(), 1);
    let atlas = &b.atlases()[0];
    assert_eq!(atlas.members().len(), 2);
    assert_eq!((atlas.width(), atlas.height()), (256, 256));
}

#[test]
fn submission_order_matches_spec_scenario() {
    let cfg = AtlasConfig::builder()
        .with_max_dimensions(256, 256)
        .margin(2)
        .build();
    let mut b = AtlasBuilder::with_sink(cfg, Recorder::default()).expect("builder");
    for (k, s) in [("a", 200), ("b", 64), ("c", 32)] {
        b.add(k.to_string(), rgba(s, s), None);
    }
    b.build().expect("build");
    let ev = &b.sink().events;
    assert_eq!(ev[0], "create 0 a");
    // b and c are each offered to atlas 0 before anything else happens to them
    let b_first = ev.iter().position(|e| e.contains(" b ")).expect("b event");
    assert_eq!(ev[b_first], "reject b 0");
    let c_first = ev.iter().position(|e| e.contains(" c ")).expect("c event");
    assert_eq!(ev[c_first], "place c 0");
}

#[test]
fn single_member_atlas_is_dropped_and_identity_returned() {
    let cfg = AtlasConfig::builder()
        .with_max_dimensions(128, 128)
        .margin(1)
        .build();
    let mut b = AtlasBuilder::new(cfg).expect("builder");
    b.add("alone".to_string(), rgba(16, 16), None);
    b.build().expect("build");
    assert!(b.atlases().is_empty());
    let hit = b.lookup("alone").expect("lookup");
    assert!(hit.atlas.is_none());
    assert!(hit.image.is_none());
    assert!(hit.sampler.is_none());
    assert!(hit.transform.is_identity());
}

#[test]
fn duplicate_keys_are_ignored() {
    let mut b = AtlasBuilder::new(AtlasConfig::default()).expect("builder");
    assert!(b.add("x".to_string(), rgba(8, 8), None));
    assert!(!b.add("x".to_string(), rgba(16, 16), None));
    assert_eq!(b.candidates().len(), 1);
    let id = b.candidates().id_of("x").expect("id");
    assert_eq!(b.candidates().get(id).expect("c").image.width(), 8);
}

#[test]
fn add_all_counts_new_candidates() {
    let mut b = AtlasBuilder::new(AtlasConfig::default()).expect("builder");
    let produced = vec![
        Candidate::new("a".to_string(), rgba(8, 8), None),
        Candidate::new("b".to_string(), rgba(8, 8), None),
        Candidate::new("a".to_string(), rgba(4, 4), None),
    ];
    assert_eq!(b.add_all(produced), 2);
    b.reset();
    assert!(b.candidates().is_empty());
}

#[test]
fn unknown_key_is_an_error() {
    let mut b = AtlasBuilder::new(AtlasConfig::default()).expect("builder");
    b.add("known".to_string(), rgba(8, 8), None);
    b.build().expect("build");
    assert!(matches!(
        b.lookup("missing"),
        Err(AtlasError::UnknownCandidate(_))
    ));
}

#[test]
fn final_sizes_are_pow2_and_cover_members() {
    let cfg = AtlasConfig::builder()
        .with_max_dimensions(300, 300)
        .margin(3)
        .build();
    let mut b = AtlasBuilder::new(cfg).expect("builder");
    b.add("a".to_string(), rgba(100, 40), None);
    b.add("b".to_string(), rgba(50, 70), None);
    b.add("c".to_string(), rgba(30, 10), None);
    b.build().expect("build");
    assert_eq!(b.atlases().len(), 1);
    let atlas = &b.atlases()[0];
    assert!(is_pow2(atlas.width()));
    assert!(is_pow2(atlas.height()));
    for &m in atlas.members() {
        let c = b.candidates().get(m).expect("candidate");
        let p = c.placement().expect("placed");
        assert!(p.x + c.image.width() + 3 <= atlas.width());
        assert!(p.y + c.image.height() + 3 <= atlas.height());
    }
    let img = atlas.image().expect("composited");
    assert_eq!(img.dimensions(), (atlas.width(), atlas.height()));
}

#[test]
fn incompatible_images_keep_their_own() {
    let cfg = AtlasConfig::builder()
        .with_max_dimensions(256, 256)
        .margin(1)
        .build();
    let mut b = AtlasBuilder::new(cfg).expect("builder");
    let rgb = PixelBuffer::zeroed(16, 16, PixelLayout::RGB8).expect("buffer");
    b.add("rgba".to_string(), rgba(16, 16), None);
    b.add("rgb".to_string(), rgb, None);
    b.build().expect("build");
    assert!(b.atlases().is_empty());
    assert!(b.uv_transform("rgba").expect("t").is_identity());
    assert!(b.uv_transform("rgb").expect("t").is_identity());
}

#[test]
fn stats_reflect_build() {
    let cfg = AtlasConfig::builder()
        .with_max_dimensions(128, 128)
        .margin(0)
        .build();
    let mut b = AtlasBuilder::new(cfg).expect("builder");
    b.add("a".to_string(), rgba(64, 64), None);
    b.add("b".to_string(), rgba(64, 64), None);
    b.add("c".to_string(), rgba(64, 64), None);
    b.add("d".to_string(), rgba(64, 64), None);
    b.build().expect("build");
    let s = b.stats();
    assert_eq!(s.num_atlases, 1);
    assert_eq!(s.num_candidates, 4);
    assert_eq!(s.num_atlased, 4);
    assert_eq!(s.total_atlas_area, 128 * 128);
    assert_eq!(s.used_area, 128 * 128);
    assert!((s.occupancy - 1.0).abs() < 1e-9);
    assert_eq!(s.wasted_area(), 0);
    assert!(s.summary().contains("Atlases: 1"));
}

#[test]
fn closure_acts_as_sink() {
    let cfg = AtlasConfig::builder()
        .with_max_dimensions(128, 128)
        .margin(1)
        .build();
    let mut created = 0;
    let mut placed = Vec::new();
    {
        let sink = |e: &Diagnostic<'_, String>| match e {
            Diagnostic::AtlasCreated { .. } => created += 1,
            Diagnostic::Placed { key, .. } => placed.push((*key).clone()),
            _ => {}
        };
        let mut b = AtlasBuilder::with_sink(cfg, sink).expect("builder");
        b.add("a".to_string(), rgba(16, 16), None);
        b.add("b".to_string(), rgba(16, 16), None);
        b.build().expect("build");
        assert_eq!(b.atlases().len(), 1);
    }
    assert_eq!(created, 1);
    // equal heights are offered in reverse submission order
    assert_eq!(placed, vec!["b".to_string(), "a".to_string()]);
}
