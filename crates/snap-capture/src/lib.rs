use anyhow::{bail, Context, Result};
use image::RgbaImage;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub mod screenshot;

pub use screenshot::{BoardCapture, CaptureError, InteractiveCapture};

/// Normalized screen region (0.0-1.0 edges relative to the board screenshot).
/// `left <= right` and `top <= bottom` are expected but not enforced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRegion {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl ScreenRegion {
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Pixel box `(left, top, right, bottom)` for an image of the given size.
    /// Fractions are multiplied by the dimension and truncated.
    pub fn to_pixels(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let (w, h) = (width as f64, height as f64);
        (
            (w * self.left) as u32,
            (h * self.top) as u32,
            (w * self.right) as u32,
            (h * self.bottom) as u32,
        )
    }
}

/// The five fixed areas of a Marvel Snap board, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BoardRegion {
    YourCards,
    Location1,
    Location2,
    Location3,
    EnergyTurns,
}

impl BoardRegion {
    pub const ALL: [BoardRegion; 5] = [
        BoardRegion::YourCards,
        BoardRegion::Location1,
        BoardRegion::Location2,
        BoardRegion::Location3,
        BoardRegion::EnergyTurns,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BoardRegion::YourCards => "your_cards",
            BoardRegion::Location1 => "location1",
            BoardRegion::Location2 => "location2",
            BoardRegion::Location3 => "location3",
            BoardRegion::EnergyTurns => "energy_turns",
        }
    }

    pub fn bounds(self) -> ScreenRegion {
        match self {
            BoardRegion::YourCards => regions::HAND,
            BoardRegion::Location1 => regions::LEFT_LOCATION,
            BoardRegion::Location2 => regions::MIDDLE_LOCATION,
            BoardRegion::Location3 => regions::RIGHT_LOCATION,
            BoardRegion::EnergyTurns => regions::ENERGY_TURN,
        }
    }

    /// File name of the cropped image, e.g. `location2.png`.
    pub fn image_file_name(self) -> String {
        format!("{}.png", self.name())
    }
}

impl fmt::Display for BoardRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fractional bounds measured on a full SNAP window capture
pub mod regions {
    use super::ScreenRegion;

    /// Player hand, a strip across the bottom of the board.
    pub const HAND: ScreenRegion = ScreenRegion::new(0.0, 0.75, 1.0, 0.890);

    pub const LEFT_LOCATION: ScreenRegion = ScreenRegion::new(0.160, 0.215, 0.385, 0.760);
    pub const MIDDLE_LOCATION: ScreenRegion = ScreenRegion::new(0.385, 0.215, 0.610, 0.760);
    pub const RIGHT_LOCATION: ScreenRegion = ScreenRegion::new(0.610, 0.215, 0.835, 0.760);

    /// Energy counter and turn indicator in the bottom-right corner.
    pub const ENERGY_TURN: ScreenRegion = ScreenRegion::new(0.420, 0.895, 1.0, 1.0);
}

/// Crop a region from a captured frame using normalized coordinates
pub fn crop_region(frame: &RgbaImage, region: &ScreenRegion) -> RgbaImage {
    let (w, h) = (frame.width(), frame.height());
    let (left, top, right, bottom) = region.to_pixels(w, h);

    // Clamp to image bounds
    let x = left.min(w);
    let y = top.min(h);
    let rw = right.min(w).saturating_sub(x);
    let rh = bottom.min(h).saturating_sub(y);

    image::imageops::crop_imm(frame, x, y, rw, rh).to_image()
}

/// Slice a full-board screenshot into one image per [`BoardRegion`].
///
/// `output_dir` is created when missing. Returns the saved path for every
/// region.
pub fn slice_board(image_path: &Path, output_dir: &Path) -> Result<BTreeMap<BoardRegion, PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let frame = image::open(image_path)
        .with_context(|| format!("Failed to open screenshot {}", image_path.display()))?
        .to_rgba8();
    let (w, h) = frame.dimensions();
    debug!("Slicing {} ({}x{})", image_path.display(), w, h);

    let mut saved = BTreeMap::new();
    for region in BoardRegion::ALL {
        let crop = crop_region(&frame, &region.bounds());
        if crop.width() == 0 || crop.height() == 0 {
            bail!(
                "Region {} is empty for a {}x{} screenshot",
                region,
                w,
                h
            );
        }

        let path = output_dir.join(region.image_file_name());
        crop.save(&path)
            .with_context(|| format!("Failed to save {}", path.display()))?;
        saved.insert(region, path);
    }

    info!("Saved {} board regions to {}", saved.len(), output_dir.display());
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Frame whose red/green channels encode the pixel's x/y position (mod 256)
    fn coordinate_frame(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([(x % 256) as u8, (y % 256) as u8, 0, 255])
        })
    }

    #[test]
    fn test_regions_are_normalized() {
        for region in BoardRegion::ALL {
            let b = region.bounds();
            assert!((0.0..=1.0).contains(&b.left), "{region} left");
            assert!((0.0..=1.0).contains(&b.right), "{region} right");
            assert!((0.0..=1.0).contains(&b.top), "{region} top");
            assert!((0.0..=1.0).contains(&b.bottom), "{region} bottom");
            assert!(b.left <= b.right && b.top <= b.bottom, "{region} inverted");
        }
    }

    #[test]
    fn test_locations_are_side_by_side() {
        let l1 = BoardRegion::Location1.bounds();
        let l2 = BoardRegion::Location2.bounds();
        let l3 = BoardRegion::Location3.bounds();
        assert_eq!(l1.right, l2.left);
        assert_eq!(l2.right, l3.left);
        assert_eq!(l1.top, l3.top);
    }

    #[test]
    fn test_to_pixels_truncates() {
        let (left, top, right, bottom) = regions::LEFT_LOCATION.to_pixels(1000, 333);
        assert_eq!((left, top, right, bottom), (160, 71, 385, 253));
    }

    #[test]
    fn test_crop_region() {
        let img = RgbaImage::new(1920, 1080);
        let cropped = crop_region(&img, &regions::HAND);
        assert_eq!(cropped.width(), 1920);
        // 0.75 * 1080 = 810, 0.89 * 1080 = 961.2 -> 961
        assert_eq!(cropped.height(), 961 - 810);
    }

    #[test]
    fn test_crop_region_inverted_is_empty() {
        let img = RgbaImage::new(100, 100);
        let cropped = crop_region(&img, &ScreenRegion::new(0.8, 0.5, 0.2, 0.6));
        assert_eq!(cropped.width(), 0);
    }

    #[test]
    fn test_slice_board_writes_every_region() {
        let dir = tempfile::tempdir().unwrap();
        for (w, h) in [(1920u32, 1080u32), (900, 1300), (813, 577)] {
            let shot = dir.path().join(format!("screenshot_{w}x{h}.png"));
            coordinate_frame(w, h).save(&shot).unwrap();

            let out = dir.path().join(format!("regions_{w}x{h}"));
            let saved = slice_board(&shot, &out).unwrap();
            assert_eq!(saved.len(), 5);

            for region in BoardRegion::ALL {
                let path = &saved[&region];
                assert_eq!(path, &out.join(region.image_file_name()));

                let crop = image::open(path).unwrap().to_rgba8();
                let (left, top, right, bottom) = region.bounds().to_pixels(w, h);
                assert_eq!(crop.dimensions(), (right - left, bottom - top), "{region} {w}x{h}");

                let origin = crop.get_pixel(0, 0);
                assert_eq!(origin[0], (left % 256) as u8, "{region} x origin");
                assert_eq!(origin[1], (top % 256) as u8, "{region} y origin");
            }
        }
    }

    #[test]
    fn test_slice_board_missing_image() {
        let dir = tempfile::tempdir().unwrap();
        let result = slice_board(&dir.path().join("nope.png"), dir.path());
        assert!(result.is_err());
    }
}
