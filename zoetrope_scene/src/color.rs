use std::fmt;

/// 8-bit RGBA color. The default is the teal the renderer uses for
/// primitives with no explicit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for Color {
    fn default() -> Self {
        Color::rgb(0x56, 0xa2, 0xb2)
    }
}

static NAMED_COLORS: phf::Map<&'static str, (u8, u8, u8)> = phf::phf_map! {
    "black" => (0x00, 0x00, 0x00),
    "white" => (0xff, 0xff, 0xff),
    "red" => (0xff, 0x00, 0x00),
    "green" => (0x00, 0x80, 0x00),
    "lime" => (0x00, 0xff, 0x00),
    "blue" => (0x00, 0x00, 0xff),
    "yellow" => (0xff, 0xff, 0x00),
    "cyan" => (0x00, 0xff, 0xff),
    "magenta" => (0xff, 0x00, 0xff),
    "orange" => (0xff, 0xa5, 0x00),
    "purple" => (0x80, 0x00, 0x80),
    "pink" => (0xff, 0xc0, 0xcb),
    "brown" => (0xa5, 0x2a, 0x2a),
    "gray" => (0x80, 0x80, 0x80),
    "grey" => (0x80, 0x80, 0x80),
    "lightgray" => (0xd3, 0xd3, 0xd3),
    "darkgray" => (0xa9, 0xa9, 0xa9),
    "gold" => (0xff, 0xd7, 0x00),
    "silver" => (0xc0, 0xc0, 0xc0),
    "navy" => (0x00, 0x00, 0x80),
    "teal" => (0x00, 0x80, 0x80),
    "olive" => (0x80, 0x80, 0x00),
    "maroon" => (0x80, 0x00, 0x00),
    "coral" => (0xff, 0x7f, 0x50),
    "salmon" => (0xfa, 0x80, 0x72),
    "turquoise" => (0x40, 0xe0, 0xd0),
    "violet" => (0xee, 0x82, 0xee),
    "indigo" => (0x4b, 0x00, 0x82),
    "khaki" => (0xf0, 0xe6, 0x8c),
    "orchid" => (0xda, 0x70, 0xd6),
};

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Resolve a color name or `#rrggbb` / `#rrggbbaa` hex string.
    pub fn from_name(name: &str) -> Option<Self> {
        if let Some(hex) = name.strip_prefix('#') {
            return Self::from_hex(hex);
        }
        NAMED_COLORS
            .get(name.to_ascii_lowercase().as_str())
            .map(|&(r, g, b)| Color::rgb(r, g, b))
    }

    fn from_hex(hex: &str) -> Option<Self> {
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    pub fn to_linear(&self) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            f32::from(self.a) / 255.0,
        ]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}
