use crate::errors::{Error, Result};

/// A RGBA `Color`. Each channel is a floating point value within `[0, 1]`,
/// which is checked when the color is built from arbitrary values.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Color {
    r: f32,
    g: f32,
    b: f32,
    a: f32,
}

fn channel(name: &'static str, value: f32) -> Result<f32> {
    if value >= 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(Error::ColorOutOfRange {
            channel: name,
            value,
        })
    }
}

impl Color {
    /// Creates an opaque color.
    pub fn rgb(r: f32, g: f32, b: f32) -> Result<Self> {
        Color::rgba(r, g, b, 1.0)
    }

    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Result<Self> {
        Ok(Color {
            r: channel("r", r)?,
            g: channel("g", g)?,
            b: channel("b", b)?,
            a: channel("a", a)?,
        })
    }

    /// Creates `Color` from a u32 encoded `RGBA`, e.g. `0xFF8000FF`.
    pub fn from_rgba_u32(encoded: u32) -> Self {
        let c = |shift: u32| ((encoded >> shift) & 0xFF) as f32 / 255.0;
        Color {
            r: c(24),
            g: c(16),
            b: c(8),
            a: c(0),
        }
    }

    #[inline]
    pub fn r(&self) -> f32 {
        self.r
    }

    #[inline]
    pub fn g(&self) -> f32 {
        self.g
    }

    #[inline]
    pub fn b(&self) -> f32 {
        self.b
    }

    #[inline]
    pub fn a(&self) -> f32 {
        self.a
    }

    /// Returns the same color with another alpha channel.
    pub fn with_alpha(&self, a: f32) -> Result<Self> {
        Color::rgba(self.r, self.g, self.b, a)
    }

    /// Returns the `grayscale` representation of RGB values.
    pub fn grayscale(&self) -> f32 {
        self.r * 0.299 + self.g * 0.587 + self.b * 0.114
    }

    pub fn rgba_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Color {
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    pub const RED: Color = Color {
        r: 1.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    pub const GREEN: Color = Color {
        r: 0.0,
        g: 1.0,
        b: 0.0,
        a: 1.0,
    };

    pub const BLUE: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 1.0,
        a: 1.0,
    };

    pub const TRANSPARENT: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };
}
