use image::Rgba;

pub const POSITIVE_RING: Rgba<u8> = Rgba([76, 175, 80, 220]);
pub const NEGATIVE_RING: Rgba<u8> = Rgba([244, 67, 54, 220]);
pub const INNER_FILL: Rgba<u8> = Rgba([0, 0, 0, 160]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Checkmark,
    Cross,
}

/// Colors and symbol of a seal, fixed by the classification outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub ring: Rgba<u8>,
    pub fill: Rgba<u8>,
    pub symbol: Symbol,
}

impl Palette {
    pub const fn for_outcome(is_positive: bool) -> Self {
        if is_positive {
            Self {
                ring: POSITIVE_RING,
                fill: INNER_FILL,
                symbol: Symbol::Checkmark,
            }
        } else {
            Self {
                ring: NEGATIVE_RING,
                fill: INNER_FILL,
                symbol: Symbol::Cross,
            }
        }
    }
}

/// Geometry of the seal, expressed relative to the seal or image size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SealStyle {
    /// Seal side as a fraction of the image's smaller dimension.
    pub size_ratio: f64,
    /// Distance kept from the right and bottom edges, in pixels.
    pub margin: u32,
    pub outline_width: u32,
    /// Decorative ring radius as a fraction of the main radius.
    pub inner_ring_ratio: f64,
    pub checkmark_ratio: f64,
    pub cross_ratio: f64,
    /// Base stroke width as a fraction of the seal side; symbols use twice this.
    pub stroke_ratio: f64,
    /// Seals smaller than this are not drawn at all.
    pub min_size: u32,
}

impl Default for SealStyle {
    fn default() -> Self {
        Self {
            size_ratio: 0.22,
            margin: 20,
            outline_width: 3,
            inner_ring_ratio: 0.7,
            checkmark_ratio: 0.2,
            cross_ratio: 0.15,
            stroke_ratio: 0.02,
            min_size: 8,
        }
    }
}

impl SealStyle {
    pub fn seal_size(&self, width: u32, height: u32) -> u32 {
        (f64::from(width.min(height)) * self.size_ratio).floor() as u32
    }

    pub fn symbol_stroke(&self, seal_size: u32) -> u32 {
        let base = (f64::from(seal_size) * self.stroke_ratio).floor() as u32;
        2 * base.max(1)
    }

    /// Top-left corner of the seal, never left of or above the image origin.
    pub fn position(&self, width: u32, height: u32, seal_size: u32) -> (i64, i64) {
        let offset = i64::from(seal_size) + i64::from(self.margin);
        (
            (i64::from(width) - offset).max(0),
            (i64::from(height) - offset).max(0),
        )
    }
}
