use image::{DynamicImage, ImageBuffer};
use tex_atlas_core::prelude::*;

const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];

fn solid(w: u32, h: u32, px: [u8; 4]) -> PixelBuffer {
    PixelBuffer::filled(w, h, PixelLayout::RGBA8, &px).expect("buffer")
}

fn placement(b: &AtlasBuilder<String>, key: &str) -> (Placement, u32, u32) {
    let c = b
        .candidates()
        .get(b.candidates().id_of(key).expect("id"))
        .expect("candidate");
    (c.placement().expect("placed"), c.image.width(), c.image.height())
}

#[test]
fn margins_do_not_bleed_across_neighbors() {
    let m = 3;
    let cfg = AtlasConfig::builder()
        .with_max_dimensions(128, 128)
        .margin(m)
        .build();
    let mut b = AtlasBuilder::new(cfg).expect("builder");
    b.add("red".to_string(), solid(32, 32, RED), None);
    b.add("green".to_string(), solid(32, 32, GREEN), None);
    b.build().expect("build");
    assert_eq!(b.atlases().len(), 1);
    let img = b.atlases()[0].image().expect("image");

    for (key, color) in [("red", RED), ("green", GREEN)] {
        let (p, w, h) = placement(&b, key);
        // every pixel of the margin-expanded rect carries the owner's color
        for y in (p.y - m)..(p.y + h + m) {
            for x in (p.x - m)..(p.x + w + m) {
                assert_eq!(img.pixel(x, y), &color, "{key} at ({x},{y})");
            }
        }
    }
}

#[test]
fn edge_rows_and_columns_are_replicated() {
    // 2x2 checker: corners must extend diagonally from the matching corner pixel
    let layout = PixelLayout::RGBA8;
    let data = [RED, GREEN, GREEN, RED].concat();
    let checker = PixelBuffer::new(2, 2, layout, data).expect("buffer");
    let cfg = AtlasConfig::builder()
        .with_max_dimensions(64, 64)
        .margin(2)
        .build();
    let mut b = AtlasBuilder::new(cfg).expect("builder");
    b.add("checker".to_string(), checker, None);
    b.add("filler".to_string(), solid(2, 2, RED), None);
    b.build().expect("build");
    let img = b.atlases()[0].image().expect("image");
    let (p, _, _) = placement(&b, "checker");

    assert_eq!(img.pixel(p.x - 2, p.y - 2), &RED);
    assert_eq!(img.pixel(p.x + 3, p.y - 1), &GREEN);
    assert_eq!(img.pixel(p.x - 1, p.y + 3), &GREEN);
    assert_eq!(img.pixel(p.x + 3, p.y + 3), &RED);
    // edge column above content
    assert_eq!(img.pixel(p.x + 1, p.y - 2), &GREEN);
}

#[test]
fn unused_area_is_zeroed() {
    let cfg = AtlasConfig::builder()
        .with_max_dimensions(256, 256)
        .margin(1)
        .build();
    let mut b = AtlasBuilder::new(cfg).expect("builder");
    b.add("a".to_string(), solid(100, 10, RED), None);
    b.add("b".to_string(), solid(10, 10, GREEN), None);
    b.build().expect("build");
    let atlas = &b.atlases()[0];
    let img = atlas.image().expect("image");
    assert_eq!(img.pixel(atlas.width() - 1, atlas.height() - 1), &[0, 0, 0, 0]);
}

#[test]
fn atlas_exports_as_rgba_image() {
    let cfg = AtlasConfig::builder()
        .with_max_dimensions(64, 64)
        .margin(1)
        .build();
    let mut b = AtlasBuilder::new(cfg).expect("builder");
    b.add("a".to_string(), solid(8, 8, RED), None);
    b.add("b".to_string(), solid(8, 8, GREEN), None);
    b.build().expect("build");
    let dynimg = b.atlases()[0]
        .image()
        .expect("image")
        .to_dynamic_image()
        .expect("convert");
    let rgba = dynimg.to_rgba8();
    let (p, _, _) = placement(&b, "a");
    assert_eq!(rgba.get_pixel(p.x, p.y).0, RED);
}

#[test]
fn wide_layouts_survive_image_conversion() {
    let rgb16 = DynamicImage::ImageRgb16(ImageBuffer::from_fn(5, 3, |x, y| {
        image::Rgb([x as u16 * 1000, y as u16 * 3000 + 7, 65535])
    }));
    let rgba16 = DynamicImage::ImageRgba16(ImageBuffer::from_fn(4, 4, |x, y| {
        image::Rgba([x as u16 * 257, 513, y as u16 * 4099, 40000])
    }));
    let rgba32f = DynamicImage::ImageRgba32F(ImageBuffer::from_fn(3, 2, |x, y| {
        image::Rgba([x as f32 * 0.25, y as f32 * 0.5, 1.5, -0.75])
    }));

    let cases = [
        (rgb16, PixelFormat::Rgb, DataType::UnsignedShort, 48),
        (rgba16, PixelFormat::Rgba, DataType::UnsignedShort, 64),
        (rgba32f, PixelFormat::Rgba, DataType::Float, 128),
    ];
    for (img, format, data_type, bits) in cases {
        let px = PixelBuffer::from_dynamic_image(&img).expect("import");
        assert_eq!(px.layout(), PixelLayout::new(format, data_type, bits));
        assert_eq!(px.dimensions(), (img.width(), img.height()));
        let back = px.to_dynamic_image().expect("export");
        assert_eq!(back, img, "{format:?}/{data_type:?}");
    }
}

#[test]
fn sixteen_bit_atlas_keeps_its_depth() {
    let cfg = AtlasConfig::builder()
        .with_max_dimensions(64, 64)
        .margin(1)
        .build();
    let mut b = AtlasBuilder::new(cfg).expect("builder");
    for (key, v) in [("a", 1000u16), ("b", 60000u16)] {
        let img = ImageBuffer::from_pixel(8, 8, image::Rgba([v, v, v, 65535]));
        let px = PixelBuffer::from_dynamic_image(&DynamicImage::ImageRgba16(img)).expect("import");
        b.add(key.to_string(), px, None);
    }
    b.build().expect("build");
    assert_eq!(b.atlases().len(), 1);
    let out = b.atlases()[0]
        .image()
        .expect("image")
        .to_dynamic_image()
        .expect("export");
    let DynamicImage::ImageRgba16(buf) = out else {
        panic!("expected a 16-bit RGBA atlas");
    };
    let (p, _, _) = placement(&b, "b");
    assert_eq!(buf.get_pixel(p.x, p.y).0, [60000, 60000, 60000, 65535]);
    // margin pixel replicates the edge
    assert_eq!(buf.get_pixel(p.x - 1, p.y).0, [60000, 60000, 60000, 65535]);
}

#[test]
#[should_panic(expected = "12 bits per pixel")]
fn unaligned_layout_has_no_pixel_addressing() {
    let layout = PixelLayout::new(PixelFormat::Rgb, DataType::Packed, 12);
    let px = PixelBuffer::zeroed(3, 2, layout).expect("buffer");
    let _ = px.pixel(1, 0);
}
