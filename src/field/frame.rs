use crate::config::{CELL_COUNT, GRID_WIDTH};

/// How brightness is quantized and packed into the output buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Integer brightness slots in `0..=max`
    Levels(u32),
    /// 8-bit gray packed as opaque ARGB: `0xFF000000 | v << 16 | v << 8 | v`
    ArgbGray,
}

impl OutputFormat {
    /// Highest brightness level; `Levels(0)` behaves as `Levels(1)`
    pub fn max_level(self) -> u32 {
        match self {
            OutputFormat::Levels(max) => max.max(1),
            OutputFormat::ArgbGray => 255,
        }
    }

    /// Quantize a normalized value (rounding to nearest) and pack it
    pub fn encode(self, value: f32) -> u32 {
        let max = self.max_level();
        let level = ((value.clamp(0.0, 1.0) * max as f32 + 0.5) as u32).min(max);
        match self {
            OutputFormat::Levels(_) => level,
            OutputFormat::ArgbGray => 0xFF00_0000 | (level << 16) | (level << 8) | level,
        }
    }

    pub fn decode(self, packed: u32) -> u32 {
        match self {
            OutputFormat::Levels(_) => packed.min(self.max_level()),
            OutputFormat::ArgbGray => packed & 0xFF,
        }
    }
}

/// One rendered frame, row-major from the top-left cell
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    format: OutputFormat,
    pixels: [u32; CELL_COUNT],
}

impl Frame {
    /// All-dark frame
    pub fn blank(format: OutputFormat) -> Self {
        Self {
            format,
            pixels: [format.encode(0.0); CELL_COUNT],
        }
    }

    pub(crate) fn set(&mut self, index: usize, value: f32) {
        self.pixels[index] = self.format.encode(value);
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Packed values as they go to the display
    pub fn pixels(&self) -> &[u32; CELL_COUNT] {
        &self.pixels
    }

    /// Brightness level of cell (x, y)
    pub fn level(&self, x: usize, y: usize) -> u32 {
        self.format.decode(self.pixels[y * GRID_WIDTH + x])
    }

    pub fn levels(&self) -> impl Iterator<Item = u32> + '_ {
        self.pixels.iter().map(|&p| self.format.decode(p))
    }

    /// Brightness per cell in [0, 1]
    pub fn intensities(&self) -> Vec<f32> {
        let max = self.format.max_level() as f32;
        self.levels().map(|l| l as f32 / max).collect()
    }
}
