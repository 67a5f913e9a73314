// src/services/image_processor.rs
use crate::errors::AuraError;
use crate::models::{AspectRatio, ConversionResult, FlatObjectSpec, ImageGeometry, PortraitSpec};
use crate::services::image_codec::ImageCodec;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage, Rgba, RgbaImage, imageops};
use log::debug;
use std::sync::Arc;

/// Background behind portrait subjects, matches the app's dark theme.
pub const PORTRAIT_BACKGROUND: Rgb<u8> = Rgb([0x1a, 0x1a, 0x2e]);
/// Product cutouts are usually transparent PNGs; flatten them onto white.
pub const FLAT_OBJECT_BACKGROUND: Rgb<u8> = Rgb([0xff, 0xff, 0xff]);

const ASPECT_TOLERANCE: f64 = 0.1;
const MAX_UNNORMALIZED_WIDTH: u32 = 1500;
const MAX_UNNORMALIZED_HEIGHT: u32 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

pub struct ImageProcessor {
    codec: Arc<dyn ImageCodec>,
}

impl ImageProcessor {
    pub fn new(codec: Arc<dyn ImageCodec>) -> Self {
        Self { codec }
    }

    /// Crops to the portrait aspect (keeping the head in frame), scales to the
    /// exact target size and encodes to JPEG.
    pub async fn normalize_for_portrait_subject(
        &self,
        source: &str,
        spec: PortraitSpec,
    ) -> Result<ConversionResult, AuraError> {
        let img = self.codec.decode(source).await?;
        let (width, height) = img.dimensions();
        debug!(
            "Normalizing portrait {}x{} to {}x{}",
            width,
            height,
            spec.target_width(),
            spec.target_height
        );

        let raster = tokio::task::spawn_blocking(move || render_portrait(&img, &spec))
            .await
            .map_err(|e| AuraError::Encode(format!("Render task failed: {}", e)))?;

        self.finish(raster, spec.quality).await
    }

    /// Downscales so neither side exceeds `max_dimension`. Never crops or upscales.
    pub async fn normalize_for_flat_object(
        &self,
        source: &str,
        spec: FlatObjectSpec,
    ) -> Result<ConversionResult, AuraError> {
        let img = self.codec.decode(source).await?;
        let (width, height) = img.dimensions();
        debug!(
            "Normalizing flat object {}x{} (max {})",
            width, height, spec.max_dimension
        );

        let raster = tokio::task::spawn_blocking(move || render_flat_object(&img, &spec))
            .await
            .map_err(|e| AuraError::Encode(format!("Render task failed: {}", e)))?;

        self.finish(raster, spec.quality).await
    }

    pub async fn inspect_geometry(&self, source: &str) -> Result<ImageGeometry, AuraError> {
        let img = self.codec.decode(source).await?;
        let (width, height) = img.dimensions();
        Ok(geometry_of(width, height))
    }

    async fn finish(&self, raster: RgbImage, quality: u8) -> Result<ConversionResult, AuraError> {
        let (width, height) = raster.dimensions();
        let data = self.codec.encode(raster, quality).await?;
        if data.is_empty() {
            return Err(AuraError::Encode("Encoder produced no payload".to_string()));
        }

        Ok(ConversionResult {
            data,
            width,
            height,
        })
    }
}

pub fn geometry_of(width: u32, height: u32) -> ImageGeometry {
    let aspect_ratio = width as f64 / height as f64;
    let aspect_diff = (aspect_ratio - AspectRatio::PORTRAIT.value()).abs();

    ImageGeometry {
        width,
        height,
        aspect_ratio,
        is_portrait: height > width,
        needs_normalization: aspect_diff > ASPECT_TOLERANCE
            || width > MAX_UNNORMALIZED_WIDTH
            || height > MAX_UNNORMALIZED_HEIGHT,
    }
}

/// Too wide: trim both sides equally. Too tall: trim the bottom only, the top
/// edge stays anchored at y = 0.
pub fn portrait_crop(width: u32, height: u32, aspect: AspectRatio) -> CropRect {
    let full = CropRect {
        x: 0,
        y: 0,
        width,
        height,
    };

    // Cross-multiplied so exact ratios compare equal.
    let source = width as u64 * aspect.height as u64;
    let target = height as u64 * aspect.width as u64;

    if source > target {
        let crop_width = ((height as f64 * aspect.value()).round() as u32).clamp(1, width);
        CropRect {
            x: (width - crop_width) / 2,
            width: crop_width,
            ..full
        }
    } else if source < target {
        let crop_height = ((width as f64 / aspect.value()).round() as u32).clamp(1, height);
        CropRect {
            height: crop_height,
            ..full
        }
    } else {
        full
    }
}

pub fn flat_object_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    if width <= max_dimension && height <= max_dimension {
        return (width, height);
    }

    let scale = |side: u32, larger: u32| {
        ((side as f64 / larger as f64 * max_dimension as f64).round() as u32).max(1)
    };

    if width > height {
        (max_dimension, scale(height, width))
    } else {
        (scale(width, height), max_dimension)
    }
}

// Alpha is flattened before resampling so transparent texels never bleed
// their color channels into the result.
fn render_portrait(img: &DynamicImage, spec: &PortraitSpec) -> RgbImage {
    let rgba = img.to_rgba8();
    let crop = portrait_crop(rgba.width(), rgba.height(), spec.aspect);
    let region = imageops::crop_imm(&rgba, crop.x, crop.y, crop.width, crop.height).to_image();
    let flattened = flatten_onto(&region, PORTRAIT_BACKGROUND);

    imageops::resize(
        &flattened,
        spec.target_width(),
        spec.target_height,
        imageops::FilterType::Lanczos3,
    )
}

fn render_flat_object(img: &DynamicImage, spec: &FlatObjectSpec) -> RgbImage {
    let flattened = flatten_onto(&img.to_rgba8(), FLAT_OBJECT_BACKGROUND);
    let (width, height) =
        flat_object_dimensions(flattened.width(), flattened.height(), spec.max_dimension);
    if (width, height) == flattened.dimensions() {
        return flattened;
    }

    imageops::resize(&flattened, width, height, imageops::FilterType::Lanczos3)
}

fn flatten_onto(raster: &RgbaImage, background: Rgb<u8>) -> RgbImage {
    let [r, g, b] = background.0;
    let mut canvas = RgbaImage::from_pixel(raster.width(), raster.height(), Rgba([r, g, b, 255]));
    imageops::overlay(&mut canvas, raster, 0, 0);
    DynamicImage::ImageRgba8(canvas).to_rgb8()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::image_codec::{decode_bytes, encode_jpeg};
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct MemoryCodec {
        images: HashMap<String, DynamicImage>,
        empty_output: bool,
    }

    impl MemoryCodec {
        fn with(source: &str, img: DynamicImage) -> Self {
            let mut images = HashMap::new();
            images.insert(source.to_string(), img);
            Self {
                images,
                empty_output: false,
            }
        }
    }

    #[async_trait]
    impl ImageCodec for MemoryCodec {
        async fn decode(&self, source: &str) -> Result<DynamicImage, AuraError> {
            self.images
                .get(source)
                .cloned()
                .ok_or_else(|| AuraError::Decode(format!("unknown source {}", source)))
        }

        async fn encode(&self, raster: RgbImage, quality: u8) -> Result<Vec<u8>, AuraError> {
            if self.empty_output {
                return Ok(Vec::new());
            }
            encode_jpeg(&raster, quality)
        }
    }

    fn processor(codec: MemoryCodec) -> ImageProcessor {
        ImageProcessor::new(Arc::new(codec))
    }

    fn two_tone(width: u32, height: u32, top: Rgba<u8>, bottom: Rgba<u8>) -> DynamicImage {
        let img = RgbaImage::from_fn(width, height, |_, y| if y < height / 2 { top } else { bottom });
        DynamicImage::ImageRgba8(img)
    }

    fn close_to(pixel: Rgb<u8>, expected: Rgb<u8>) -> bool {
        pixel
            .0
            .iter()
            .zip(expected.0.iter())
            .all(|(a, b)| (*a as i16 - *b as i16).abs() <= 6)
    }

    #[test]
    fn wide_sources_crop_from_the_center() {
        let crop = portrait_crop(2000, 1000, AspectRatio::PORTRAIT);
        assert_eq!(crop.width, 750);
        assert_eq!(crop.height, 1000);
        assert_eq!(crop.x, (2000 - 750) / 2);
        assert_eq!(crop.y, 0);
    }

    #[test]
    fn tall_sources_stay_top_anchored() {
        for (w, h) in [(600, 1600), (300, 401), (1000, 5000)] {
            let crop = portrait_crop(w, h, AspectRatio::PORTRAIT);
            assert_eq!(crop.y, 0, "{}x{}", w, h);
            assert_eq!(crop.x, 0);
            assert_eq!(crop.width, w);
        }
        assert_eq!(portrait_crop(600, 1600, AspectRatio::PORTRAIT).height, 800);
    }

    #[test]
    fn exact_aspect_is_not_cropped() {
        let crop = portrait_crop(900, 1200, AspectRatio::PORTRAIT);
        assert_eq!(
            crop,
            CropRect {
                x: 0,
                y: 0,
                width: 900,
                height: 1200
            }
        );
    }

    #[test]
    fn flat_objects_never_upscale() {
        assert_eq!(flat_object_dimensions(800, 600, 1024), (800, 600));
        assert_eq!(flat_object_dimensions(1024, 1024, 1024), (1024, 1024));
        assert_eq!(flat_object_dimensions(2048, 1024, 1024), (1024, 512));
        assert_eq!(flat_object_dimensions(1000, 3000, 1024), (341, 1024));
        assert_eq!(flat_object_dimensions(3000, 3000, 1024), (1024, 1024));
    }

    #[test]
    fn geometry_flags_off_ratio_and_oversized() {
        let ok = geometry_of(900, 1200);
        assert!(ok.is_portrait);
        assert!(!ok.needs_normalization);

        assert!(geometry_of(1200, 1200).needs_normalization);
        assert!(geometry_of(1530, 2040).needs_normalization);
        assert!(!geometry_of(1000, 1000).is_portrait);
    }

    #[tokio::test]
    async fn portrait_output_has_exact_target_dimensions() {
        let codec = MemoryCodec::with("wide", DynamicImage::new_rgb8(1600, 900));
        let spec = PortraitSpec {
            target_height: 400,
            ..PortraitSpec::default()
        };

        let result = processor(codec)
            .normalize_for_portrait_subject("wide", spec)
            .await
            .unwrap();

        assert_eq!((result.width, result.height), (300, 400));
        let decoded = decode_bytes(&result.data).unwrap();
        assert_eq!(decoded.dimensions(), (300, 400));
    }

    #[tokio::test]
    async fn portrait_keeps_the_top_of_tall_images() {
        let red = Rgba([255, 0, 0, 255]);
        let blue = Rgba([0, 0, 255, 255]);
        // 300x1200: the 3:4 crop keeps rows 0..400, all red.
        let codec = MemoryCodec::with("tall", two_tone(300, 1200, red, blue));
        let spec = PortraitSpec {
            target_height: 200,
            ..PortraitSpec::default()
        };

        let result = processor(codec)
            .normalize_for_portrait_subject("tall", spec)
            .await
            .unwrap();

        let decoded = decode_bytes(&result.data).unwrap().to_rgb8();
        let bottom = *decoded.get_pixel(75, 195);
        assert!(close_to(bottom, Rgb([255, 0, 0])), "got {:?}", bottom);
    }

    #[tokio::test]
    async fn transparent_portraits_get_the_neutral_background() {
        let codec = MemoryCodec::with("clear", DynamicImage::new_rgba8(300, 400));
        let spec = PortraitSpec {
            target_height: 80,
            ..PortraitSpec::default()
        };

        let result = processor(codec)
            .normalize_for_portrait_subject("clear", spec)
            .await
            .unwrap();

        let decoded = decode_bytes(&result.data).unwrap().to_rgb8();
        assert!(close_to(*decoded.get_pixel(30, 40), PORTRAIT_BACKGROUND));
    }

    #[tokio::test]
    async fn flat_object_small_source_keeps_dimensions_on_white() {
        let codec = MemoryCodec::with("cutout", DynamicImage::new_rgba8(320, 240));
        let result = processor(codec)
            .normalize_for_flat_object("cutout", FlatObjectSpec::default())
            .await
            .unwrap();

        assert_eq!((result.width, result.height), (320, 240));
        let decoded = decode_bytes(&result.data).unwrap().to_rgb8();
        assert!(close_to(*decoded.get_pixel(160, 120), FLAT_OBJECT_BACKGROUND));
    }

    // Opaque texels in `color`, fully transparent black texels in between.
    fn checkerboard_over(size: u32, color: Rgb<u8>) -> DynamicImage {
        let [r, g, b] = color.0;
        let img = RgbaImage::from_fn(size, size, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([r, g, b, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        });
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn downscaled_flat_objects_do_not_darken_transparent_texels() {
        let img = checkerboard_over(400, FLAT_OBJECT_BACKGROUND);
        let spec = FlatObjectSpec {
            max_dimension: 100,
            quality: 92,
        };

        let out = render_flat_object(&img, &spec);

        assert_eq!(out.dimensions(), (100, 100));
        for pixel in out.pixels() {
            assert!(close_to(*pixel, FLAT_OBJECT_BACKGROUND), "got {:?}", pixel);
        }
    }

    #[test]
    fn downscaled_portraits_do_not_darken_transparent_texels() {
        let img = checkerboard_over(600, PORTRAIT_BACKGROUND);
        let spec = PortraitSpec {
            target_height: 120,
            ..PortraitSpec::default()
        };

        let out = render_portrait(&img, &spec);

        assert_eq!(out.dimensions(), (90, 120));
        for pixel in out.pixels() {
            assert!(close_to(*pixel, PORTRAIT_BACKGROUND), "got {:?}", pixel);
        }
    }

    #[tokio::test]
    async fn flat_object_large_source_is_downscaled() {
        let codec = MemoryCodec::with("big", DynamicImage::new_rgb8(2400, 1200));
        let spec = FlatObjectSpec {
            max_dimension: 600,
            quality: 80,
        };
        let result = processor(codec)
            .normalize_for_flat_object("big", spec)
            .await
            .unwrap();

        assert_eq!((result.width, result.height), (600, 300));
    }

    #[tokio::test]
    async fn inspect_is_idempotent() {
        let codec = MemoryCodec::with("photo", DynamicImage::new_rgb8(1200, 1600));
        let processor = processor(codec);

        let first = processor.inspect_geometry("photo").await.unwrap();
        let second = processor.inspect_geometry("photo").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.aspect_ratio, 0.75);
        assert!(!first.needs_normalization);
    }

    #[tokio::test]
    async fn decode_failures_propagate() {
        let codec = MemoryCodec::with("known", DynamicImage::new_rgb8(10, 10));
        let result = processor(codec)
            .normalize_for_flat_object("missing", FlatObjectSpec::default())
            .await;
        assert!(matches!(result, Err(AuraError::Decode(_))));
    }

    #[tokio::test]
    async fn empty_encoder_output_is_an_encode_error() {
        let mut codec = MemoryCodec::with("photo", DynamicImage::new_rgb8(30, 40));
        codec.empty_output = true;
        let result = processor(codec)
            .normalize_for_portrait_subject("photo", PortraitSpec::default())
            .await;
        assert!(matches!(result, Err(AuraError::Encode(_))));
    }
}
