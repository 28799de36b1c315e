/*
 * Styling primitives shared by widgets, decorators and the drawing
 * collaborator. Colors are stored as RGB and converted to the native BGR
 * layout only at the backend boundary.
 */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Packs the color in the `0x00BBGGRR` layout native GDI calls expect.
    pub fn to_bgr(self) -> u32 {
        (self.r as u32) | ((self.g as u32) << 8) | ((self.b as u32) << 16)
    }

    pub fn from_bgr(value: u32) -> Self {
        Self {
            r: (value & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: ((value >> 16) & 0xFF) as u8,
        }
    }

    /// Scales every channel to `percent` of its value.
    pub fn darken(self, percent: u32) -> Self {
        Self {
            r: (self.r as u32 * percent / 100) as u8,
            g: (self.g as u32 * percent / 100) as u8,
            b: (self.b as u32 * percent / 100) as u8,
        }
    }

    /// Adds `amount` to every channel, saturating at 0xFF.
    pub fn lighten(self, amount: u8) -> Self {
        Self {
            r: self.r.saturating_add(amount),
            g: self.g.saturating_add(amount),
            b: self.b.saturating_add(amount),
        }
    }
}

/// Colors the drawing collaborator reads for a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub hover: Color,
    pub text: Color,
}

impl Palette {
    pub const fn new(background: Color, hover: Color, text: Color) -> Self {
        Self {
            background,
            hover,
            text,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(
            Color::rgb(0xF0, 0xF0, 0xF0),
            Color::rgb(0xE5, 0xF1, 0xFB),
            Color::BLACK,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontDescription {
    pub name: Option<String>,
    pub size: Option<i32>,
    pub weight: Option<FontWeight>,
}

impl FontDescription {
    pub fn sized(size: i32) -> Self {
        Self {
            name: None,
            size: Some(size),
            weight: None,
        }
    }
}
