use crate::error::{AtlasError, Result};
use image::{
    DynamicImage, GrayAlphaImage, GrayImage, ImageBuffer, Luma, LumaA, Rgb32FImage, RgbImage,
    Rgba32FImage, RgbaImage,
};
use serde::{Deserialize, Serialize};

/// Pixel formats a source image may be stored in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    Alpha,
    Luminance,
    LuminanceAlpha,
    Red,
    Rg,
    Rgb,
    Rgba,
    Bgr,
    Bgra,
    // Block-compressed formats.
    Bc1Rgb,
    Bc1Rgba,
    Bc2,
    Bc3,
    Bc4,
    Bc5,
    Bc6h,
    Bc7,
    Etc1,
    Etc2Rgb,
    Etc2Rgba,
    Astc4x4,
    Pvrtc2,
    Pvrtc4,
}

impl PixelFormat {
    /// True for block-compressed formats, whose pixels are not individually addressable.
    pub fn is_compressed(&self) -> bool {
        matches!(
            self,
            Self::Bc1Rgb
                | Self::Bc1Rgba
                | Self::Bc2
                | Self::Bc3
                | Self::Bc4
                | Self::Bc5
                | Self::Bc6h
                | Self::Bc7
                | Self::Etc1
                | Self::Etc2Rgb
                | Self::Etc2Rgba
                | Self::Astc4x4
                | Self::Pvrtc2
                | Self::Pvrtc4
        )
    }
}

/// Component storage type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    UnsignedByte,
    Byte,
    UnsignedShort,
    Short,
    UnsignedInt,
    Int,
    HalfFloat,
    Float,
    /// Several components packed into one machine word (e.g. 5-6-5).
    Packed,
}

/// Everything needed to interpret a pixel buffer's bytes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PixelLayout {
    pub format: PixelFormat,
    pub data_type: DataType,
    pub bits_per_pixel: u32,
}

impl PixelLayout {
    pub const L8: PixelLayout = PixelLayout::new(PixelFormat::Luminance, DataType::UnsignedByte, 8);
    pub const LA8: PixelLayout =
        PixelLayout::new(PixelFormat::LuminanceAlpha, DataType::UnsignedByte, 16);
    pub const RGB8: PixelLayout = PixelLayout::new(PixelFormat::Rgb, DataType::UnsignedByte, 24);
    pub const RGBA8: PixelLayout = PixelLayout::new(PixelFormat::Rgba, DataType::UnsignedByte, 32);

    pub const fn new(format: PixelFormat, data_type: DataType, bits_per_pixel: u32) -> Self {
        Self {
            format,
            data_type,
            bits_per_pixel,
        }
    }

    /// Whole bytes per pixel, or `None` when the bit depth is not byte aligned.
    pub fn bytes_per_pixel(&self) -> Option<usize> {
        if self.bits_per_pixel == 0 || self.bits_per_pixel % 8 != 0 {
            None
        } else {
            Some((self.bits_per_pixel / 8) as usize)
        }
    }

    /// Bytes in one tightly packed row of `width` pixels (rounded up).
    pub fn row_bytes(&self, width: u32) -> usize {
        ((width as u64 * self.bits_per_pixel as u64).div_ceil(8)) as usize
    }
}

/// A CPU-resident image: tightly packed rows, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    layout: PixelLayout,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wraps raw pixel bytes. For uncompressed layouts the length must match
    /// `row_bytes(width) * height` exactly.
    pub fn new(width: u32, height: u32, layout: PixelLayout, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(AtlasError::InvalidDimensions { width, height });
        }
        if !layout.format.is_compressed() {
            let expected = layout.row_bytes(width) * height as usize;
            if data.len() != expected {
                return Err(AtlasError::PixelDataSize {
                    expected,
                    actual: data.len(),
                });
            }
        } else if data.is_empty() {
            return Err(AtlasError::PixelDataSize {
                expected: 1,
                actual: 0,
            });
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    /// A buffer with every byte zero.
    pub fn zeroed(width: u32, height: u32, layout: PixelLayout) -> Result<Self> {
        let len = layout.row_bytes(width) * height as usize;
        Self::new(width, height, layout, vec![0; len])
    }

    /// A buffer with every pixel set to `pixel` (one pixel's worth of bytes).
    pub fn filled(width: u32, height: u32, layout: PixelLayout, pixel: &[u8]) -> Result<Self> {
        let bpp = layout.bytes_per_pixel().ok_or_else(|| {
            AtlasError::UnsupportedLayout(format!(
                "{} bits per pixel is not byte aligned",
                layout.bits_per_pixel
            ))
        })?;
        if pixel.len() != bpp {
            return Err(AtlasError::PixelDataSize {
                expected: bpp,
                actual: pixel.len(),
            });
        }
        let data = pixel.repeat(width as usize * height as usize);
        Self::new(width, height, layout, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }
    pub fn height(&self) -> u32 {
        self.height
    }
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
    pub fn layout(&self) -> PixelLayout {
        self.layout
    }
    pub fn data(&self) -> &[u8] {
        &self.data
    }
    /// Panics on layouts that are not byte aligned; pixel addressing is undefined for them.
    fn bpp(&self) -> usize {
        match self.layout.bytes_per_pixel() {
            Some(b) => b,
            None => panic!(
                "{} bits per pixel cannot be addressed per pixel",
                self.layout.bits_per_pixel
            ),
        }
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.layout.row_bytes(self.width) + x as usize * self.bpp()
    }

    /// Bytes of the pixel at `(x, y)`.
    ///
    /// Panics if the coordinates are out of bounds or the layout is not byte aligned.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let bpp = self.bpp();
        let o = self.offset(x, y);
        &self.data[o..o + bpp]
    }

    /// Copy the pixel at `from` onto `to` within this buffer.
    pub(crate) fn copy_pixel(&mut self, from: (u32, u32), to: (u32, u32)) {
        let bpp = self.bpp();
        let src = self.offset(from.0, from.1);
        let dst = self.offset(to.0, to.1);
        self.data.copy_within(src..src + bpp, dst);
    }

    /// Copy `w` pixels starting at column `x` from row `src_y` onto row `dst_y`.
    pub(crate) fn copy_row_span(&mut self, src_y: u32, dst_y: u32, x: u32, w: u32) {
        let len = w as usize * self.bpp();
        let src = self.offset(x, src_y);
        let dst = self.offset(x, dst_y);
        self.data.copy_within(src..src + len, dst);
    }

    /// Write all of `src` into this buffer with its top-left corner at `(dx, dy)`.
    /// Rows or columns that fall outside are clipped. Layouts must share a stride.
    pub(crate) fn write_image(&mut self, src: &PixelBuffer, dx: u32, dy: u32) {
        if dx >= self.width || dy >= self.height {
            return;
        }
        let bpp = self.bpp();
        let cols = src.width.min(self.width - dx) as usize;
        let rows = src.height.min(self.height - dy);
        let src_stride = src.layout.row_bytes(src.width);
        for yy in 0..rows {
            let s = yy as usize * src_stride;
            let d = self.offset(dx, dy + yy);
            self.data[d..d + cols * bpp].copy_from_slice(&src.data[s..s + cols * bpp]);
        }
    }

    /// Import a decoded image, keeping its native channel layout.
    pub fn from_dynamic_image(img: &DynamicImage) -> Result<Self> {
        use DataType::*;
        use PixelFormat::*;
        let layout = match img {
            DynamicImage::ImageLuma8(_) => PixelLayout::L8,
            DynamicImage::ImageLumaA8(_) => PixelLayout::LA8,
            DynamicImage::ImageRgb8(_) => PixelLayout::RGB8,
            DynamicImage::ImageRgba8(_) => PixelLayout::RGBA8,
            DynamicImage::ImageLuma16(_) => PixelLayout::new(Luminance, UnsignedShort, 16),
            DynamicImage::ImageLumaA16(_) => PixelLayout::new(LuminanceAlpha, UnsignedShort, 32),
            DynamicImage::ImageRgb16(_) => PixelLayout::new(Rgb, UnsignedShort, 48),
            DynamicImage::ImageRgba16(_) => PixelLayout::new(Rgba, UnsignedShort, 64),
            DynamicImage::ImageRgb32F(_) => PixelLayout::new(Rgb, Float, 96),
            DynamicImage::ImageRgba32F(_) => PixelLayout::new(Rgba, Float, 128),
            other => {
                let rgba = other.to_rgba8();
                let (w, h) = rgba.dimensions();
                return Self::new(w, h, PixelLayout::RGBA8, rgba.into_raw());
            }
        };
        Self::new(img.width(), img.height(), layout, img.as_bytes().to_vec())
    }

    /// Export as a decoded image (e.g. to save as PNG).
    pub fn to_dynamic_image(&self) -> Result<DynamicImage> {
        use DataType::*;
        use PixelFormat::*;
        let (w, h) = (self.width, self.height);
        let data = self.data.clone();
        let img = match (self.layout.format, self.layout.data_type) {
            (Luminance, UnsignedByte) => GrayImage::from_raw(w, h, data).map(DynamicImage::ImageLuma8),
            (LuminanceAlpha, UnsignedByte) => {
                GrayAlphaImage::from_raw(w, h, data).map(DynamicImage::ImageLumaA8)
            }
            (Rgb, UnsignedByte) => RgbImage::from_raw(w, h, data).map(DynamicImage::ImageRgb8),
            (Rgba, UnsignedByte) => RgbaImage::from_raw(w, h, data).map(DynamicImage::ImageRgba8),
            (Luminance, UnsignedShort) => {
                ImageBuffer::<Luma<u16>, _>::from_raw(w, h, to_u16s(&data)).map(DynamicImage::ImageLuma16)
            }
            (LuminanceAlpha, UnsignedShort) => ImageBuffer::<LumaA<u16>, _>::from_raw(w, h, to_u16s(&data))
                .map(DynamicImage::ImageLumaA16),
            (Rgb, UnsignedShort) => {
                ImageBuffer::<image::Rgb<u16>, _>::from_raw(w, h, to_u16s(&data)).map(DynamicImage::ImageRgb16)
            }
            (Rgba, UnsignedShort) => {
                ImageBuffer::<image::Rgba<u16>, _>::from_raw(w, h, to_u16s(&data)).map(DynamicImage::ImageRgba16)
            }
            (Rgb, Float) => Rgb32FImage::from_raw(w, h, to_f32s(&data)).map(DynamicImage::ImageRgb32F),
            (Rgba, Float) => Rgba32FImage::from_raw(w, h, to_f32s(&data)).map(DynamicImage::ImageRgba32F),
            _ => None,
        };
        img.ok_or_else(|| AtlasError::UnsupportedLayout(format!("{:?}", self.layout)))
    }
}

fn to_u16s(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|c| u16::from_ne_bytes([c[0], c[1]]))
        .collect()
}

fn to_f32s(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}
