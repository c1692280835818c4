/// Asset provider: loads the three game images at startup.
///
/// ## Sources
///   1. Embedded: BMP files compiled into the binary (default)
///   2. Directory: `background.bmp`, `platform.bmp`, `player.bmp` read
///      from the configured `assets.dir`
///
/// Every image is decoded to RGBA and scaled (nearest neighbour) to the
/// exact size it is drawn at. Any failure aborts startup; there is no
/// fallback image.
///
/// ## Supported BMP variants
///   - 24-bit, uncompressed
///   - 32-bit, uncompressed (BGRA) or BI_BITFIELDS with explicit masks
///   - bottom-up or top-down row order

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::physics::{PLATFORM_H, PLATFORM_W, PLAYER_H, PLAYER_W, VIEW_H, VIEW_W};

pub type Rgba = [u8; 4];

/// Decoded image, row-major RGBA.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Rgba>,
}

impl Image {
    pub fn get(&self, x: usize, y: usize) -> Rgba {
        self.pixels[y * self.width + x]
    }
}

// ── Errors ──

#[derive(Debug)]
pub enum AssetError {
    NotFound { name: String },
    Io { name: String, source: io::Error },
    Decode { name: String, reason: &'static str },
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::NotFound { name } => write!(f, "asset '{name}' not found"),
            AssetError::Io { name, source } => write!(f, "could not read asset '{name}': {source}"),
            AssetError::Decode { name, reason } => write!(f, "could not decode asset '{name}': {reason}"),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ── Sources ──

/// Where raw image bytes come from.
pub trait AssetSource {
    /// Human-readable origin, for logs.
    fn describe(&self) -> String;
    fn fetch(&self, name: &str) -> Result<Vec<u8>, AssetError>;
}

pub struct EmbeddedSource;

const EMBEDDED: &[(&str, &[u8])] = &[
    ("background.bmp", include_bytes!("../assets/background.bmp")),
    ("platform.bmp", include_bytes!("../assets/platform.bmp")),
    ("player.bmp", include_bytes!("../assets/player.bmp")),
];

impl AssetSource for EmbeddedSource {
    fn describe(&self) -> String {
        "embedded".to_string()
    }

    fn fetch(&self, name: &str) -> Result<Vec<u8>, AssetError> {
        EMBEDDED.iter()
            .find(|(n, _)| *n == name)
            .map(|(_, bytes)| bytes.to_vec())
            .ok_or_else(|| AssetError::NotFound { name: name.to_string() })
    }
}

pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirSource { root: root.into() }
    }
}

impl AssetSource for DirSource {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    fn fetch(&self, name: &str) -> Result<Vec<u8>, AssetError> {
        let path = self.root.join(name);
        std::fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => AssetError::NotFound { name: path.display().to_string() },
            _ => AssetError::Io { name: path.display().to_string(), source: e },
        })
    }
}

/// Pick the source for a configured directory: `None` means embedded.
pub fn source_for(dir: Option<&Path>) -> Box<dyn AssetSource> {
    match dir {
        Some(d) => Box::new(DirSource::new(d)),
        None => Box::new(EmbeddedSource),
    }
}

// ── Loading ──

/// Fetch, decode and scale one image to exactly `width` x `height`.
pub fn load_image(
    source: &dyn AssetSource,
    name: &str,
    width: usize,
    height: usize,
) -> Result<Image, AssetError> {
    let bytes = source.fetch(name)?;
    let image = decode_bmp(&bytes)
        .map_err(|reason| AssetError::Decode { name: name.to_string(), reason })?;
    Ok(resize_nearest(&image, width, height))
}

/// Everything the renderer draws, sized for the logical canvas.
pub struct GameAssets {
    pub background: Image,
    pub platform: Image,
    pub player: Image,
}

impl GameAssets {
    pub fn load(source: &dyn AssetSource) -> Result<Self, AssetError> {
        let assets = GameAssets {
            background: load_image(source, "background.bmp", VIEW_W as usize, VIEW_H as usize)?,
            platform: load_image(source, "platform.bmp", PLATFORM_W as usize, PLATFORM_H as usize)?,
            player: load_image(source, "player.bmp", PLAYER_W as usize, PLAYER_H as usize)?,
        };
        log::info!("Loaded assets from {}", source.describe());
        Ok(assets)
    }
}

// ══════════════════════════════════════════════════════════════
// BMP decoding
// ══════════════════════════════════════════════════════════════

fn read_u16(bytes: &[u8], at: usize) -> Option<u16> {
    let b = bytes.get(at..at + 2)?;
    Some(u16::from_le_bytes([b[0], b[1]]))
}

fn read_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let b = bytes.get(at..at + 4)?;
    Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

fn read_i32(bytes: &[u8], at: usize) -> Option<i32> {
    let b = bytes.get(at..at + 4)?;
    Some(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// Scale a masked channel value to 0..=255. An empty mask means opaque.
fn extract_channel(v: u32, mask: u32) -> u8 {
    if mask == 0 {
        return 255;
    }
    let shift = mask.trailing_zeros();
    let max = ((mask >> shift) as u64).max(1);
    ((((v & mask) >> shift) as u64) * 255 / max) as u8
}

const TRUNCATED: &str = "truncated file";
const TOO_LARGE: &str = "image dimensions too large";

pub fn decode_bmp(bytes: &[u8]) -> Result<Image, &'static str> {
    if bytes.get(0..2) != Some(b"BM".as_slice()) {
        return Err("missing BM signature");
    }
    let data_offset = read_u32(bytes, 10).ok_or(TRUNCATED)? as usize;
    let dib_size = read_u32(bytes, 14).ok_or(TRUNCATED)? as usize;
    if dib_size < 40 {
        return Err("unsupported DIB header");
    }

    let width = read_i32(bytes, 18).ok_or(TRUNCATED)?;
    let height_raw = read_i32(bytes, 22).ok_or(TRUNCATED)?;
    let planes = read_u16(bytes, 26).ok_or(TRUNCATED)?;
    let bpp = read_u16(bytes, 28).ok_or(TRUNCATED)?;
    let compression = read_u32(bytes, 30).ok_or(TRUNCATED)?;
    if planes != 1 {
        return Err("unsupported plane count");
    }

    let w = width.unsigned_abs() as usize;
    let h = height_raw.unsigned_abs() as usize;
    if w == 0 || h == 0 {
        return Err("empty image");
    }
    let top_down = height_raw < 0;

    // Pixel layout: bytes per pixel and channel masks (None = 24-bit BGR)
    let (bytes_pp, masks) = match bpp {
        24 if compression == 0 => (3, None),
        24 => return Err("compressed 24-bit bitmap"),
        32 => {
            let masks = match compression {
                0 => (0x00FF_0000, 0x0000_FF00, 0x0000_00FF, 0xFF00_0000),
                // Masks follow the 40-byte header; alpha only from V4 on
                3 => (
                    read_u32(bytes, 54).ok_or(TRUNCATED)?,
                    read_u32(bytes, 58).ok_or(TRUNCATED)?,
                    read_u32(bytes, 62).ok_or(TRUNCATED)?,
                    if dib_size >= 56 { read_u32(bytes, 66).ok_or(TRUNCATED)? } else { 0 },
                ),
                _ => return Err("unsupported 32-bit compression"),
            };
            (4, Some(masks))
        }
        _ => return Err("unsupported bit depth"),
    };

    // Validate the payload against the header before allocating anything
    let stride = w
        .checked_mul(bytes_pp)
        .map(|row| row.div_ceil(4) * 4)
        .ok_or(TOO_LARGE)?;
    let end = stride
        .checked_mul(h)
        .and_then(|len| data_offset.checked_add(len))
        .ok_or(TOO_LARGE)?;
    let payload = bytes.get(data_offset..end).ok_or(TRUNCATED)?;

    let mut pixels = vec![[0u8; 4]; w * h];
    for y in 0..h {
        let src_y = if top_down { y } else { h - 1 - y };
        let row = &payload[src_y * stride..(src_y + 1) * stride];
        for x in 0..w {
            let s = x * bytes_pp;
            pixels[y * w + x] = match masks {
                None => [row[s + 2], row[s + 1], row[s], 255],
                Some((rmask, gmask, bmask, amask)) => {
                    let v = u32::from_le_bytes([row[s], row[s + 1], row[s + 2], row[s + 3]]);
                    [
                        extract_channel(v, rmask),
                        extract_channel(v, gmask),
                        extract_channel(v, bmask),
                        extract_channel(v, amask),
                    ]
                }
            };
        }
    }

    Ok(Image { width: w, height: h, pixels })
}

pub fn resize_nearest(image: &Image, width: usize, height: usize) -> Image {
    if image.width == width && image.height == height {
        return image.clone();
    }
    let mut pixels = Vec::with_capacity(width * height);
    for y in 0..height {
        let sy = y * image.height / height;
        for x in 0..width {
            let sx = x * image.width / width;
            pixels.push(image.get(sx, sy));
        }
    }
    Image { width, height, pixels }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal bottom-up 24-bit BMP from top-to-bottom rows of RGB.
    fn bmp24(w: usize, rows: &[&[[u8; 3]]]) -> Vec<u8> {
        let h = rows.len();
        let stride = (w * 3).div_ceil(4) * 4;
        let data_len = stride * h;
        let mut out = Vec::new();
        out.extend_from_slice(b"BM");
        out.extend_from_slice(&((54 + data_len) as u32).to_le_bytes());
        out.extend_from_slice(&[0, 0, 0, 0]);
        out.extend_from_slice(&54u32.to_le_bytes());
        out.extend_from_slice(&40u32.to_le_bytes());
        out.extend_from_slice(&(w as i32).to_le_bytes());
        out.extend_from_slice(&(h as i32).to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&24u16.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(data_len as u32).to_le_bytes());
        out.extend_from_slice(&[0; 16]);
        for row in rows.iter().rev() {
            let start = out.len();
            for px in row.iter() {
                out.extend_from_slice(&[px[2], px[1], px[0]]);
            }
            out.resize(start + stride, 0);
        }
        out
    }

    struct MapSource(Vec<(&'static str, Vec<u8>)>);

    impl AssetSource for MapSource {
        fn describe(&self) -> String { "test".into() }
        fn fetch(&self, name: &str) -> Result<Vec<u8>, AssetError> {
            self.0.iter()
                .find(|(n, _)| *n == name)
                .map(|(_, b)| b.clone())
                .ok_or_else(|| AssetError::NotFound { name: name.into() })
        }
    }

    const RED: [u8; 3] = [255, 0, 0];
    const BLUE: [u8; 3] = [0, 0, 255];

    #[test]
    fn decodes_24bit_bottom_up() {
        let bytes = bmp24(2, &[&[RED, BLUE], &[BLUE, RED]]);
        let img = decode_bmp(&bytes).unwrap();
        assert_eq!((img.width, img.height), (2, 2));
        assert_eq!(img.get(0, 0), [255, 0, 0, 255]);
        assert_eq!(img.get(1, 0), [0, 0, 255, 255]);
        assert_eq!(img.get(0, 1), [0, 0, 255, 255]);
    }

    #[test]
    fn rejects_non_bmp() {
        assert_eq!(decode_bmp(b"PNG....").unwrap_err(), "missing BM signature");
    }

    #[test]
    fn rejects_truncated_payload() {
        let mut bytes = bmp24(3, &[&[RED, RED, RED], &[RED, RED, RED]]);
        bytes.truncate(60);
        assert_eq!(decode_bmp(&bytes).unwrap_err(), TRUNCATED);
    }

    /// Bare 54-byte header claiming the given size and no pixel data.
    fn header_only(width: i32, height: i32, bpp: u16) -> Vec<u8> {
        let mut out = bmp24(1, &[&[RED]]);
        out.truncate(54);
        out[18..22].copy_from_slice(&width.to_le_bytes());
        out[22..26].copy_from_slice(&height.to_le_bytes());
        out[28..30].copy_from_slice(&bpp.to_le_bytes());
        out
    }

    #[test]
    fn extreme_dimensions_fail_without_allocating() {
        for bpp in [24, 32] {
            let bytes = header_only(i32::MIN, i32::MIN, bpp);
            assert!(decode_bmp(&bytes).is_err());
        }
    }

    #[test]
    fn oversized_header_with_tiny_payload_is_truncated() {
        let bytes = header_only(60_000, 60_000, 32);
        assert_eq!(decode_bmp(&bytes).unwrap_err(), TRUNCATED);
    }

    #[test]
    fn bad_header_surfaces_as_decode_error() {
        let src = MapSource(vec![("player.bmp", header_only(i32::MAX, -i32::MAX, 24))]);
        let err = load_image(&src, "player.bmp", 40, 40).unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
    }

    #[test]
    fn resize_to_exact_dimensions() {
        let bytes = bmp24(2, &[&[RED, BLUE]]);
        let img = decode_bmp(&bytes).unwrap();
        let big = resize_nearest(&img, 8, 3);
        assert_eq!((big.width, big.height), (8, 3));
        assert_eq!(big.pixels.len(), 24);
        assert_eq!(big.get(3, 2), [255, 0, 0, 255]);
        assert_eq!(big.get(4, 0), [0, 0, 255, 255]);
    }

    #[test]
    fn load_image_scales_to_requested_size() {
        let src = MapSource(vec![("tile.bmp", bmp24(1, &[&[BLUE]]))]);
        let img = load_image(&src, "tile.bmp", 80, 10).unwrap();
        assert_eq!((img.width, img.height), (80, 10));
        assert!(img.pixels.iter().all(|p| *p == [0, 0, 255, 255]));
    }

    #[test]
    fn missing_asset_fails_load() {
        let src = MapSource(vec![("background.bmp", bmp24(1, &[&[RED]]))]);
        match GameAssets::load(&src) {
            Err(AssetError::NotFound { name }) => assert_eq!(name, "platform.bmp"),
            other => panic!("expected NotFound, got {:?}", other.err()),
        }
    }

    #[test]
    fn undecodable_asset_fails_load() {
        let src = MapSource(vec![("tile.bmp", b"garbage".to_vec())]);
        let err = load_image(&src, "tile.bmp", 4, 4).unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
        assert!(err.to_string().contains("tile.bmp"));
    }

    #[test]
    fn embedded_assets_load_at_game_sizes() {
        let assets = GameAssets::load(&EmbeddedSource).unwrap();
        assert_eq!((assets.background.width, assets.background.height), (500, 700));
        assert_eq!((assets.platform.width, assets.platform.height), (80, 10));
        assert_eq!((assets.player.width, assets.player.height), (40, 40));
        // Player sprite has a transparent surround
        assert_eq!(assets.player.get(0, 0)[3], 0);
    }

    #[test]
    fn dir_source_reports_missing_directory() {
        let src = DirSource::new("/nonexistent/birdjumper-assets");
        assert!(matches!(src.fetch("player.bmp"), Err(AssetError::NotFound { .. })));
    }
}
