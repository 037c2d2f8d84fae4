/// A band/object background or foreground color.
///
/// Supports RGB, Grayscale, and CMYK color spaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    /// RGB color (red, green, blue) with values from 0.0 to 1.0
    Rgb(f64, f64, f64),
    /// Grayscale color with value from 0.0 (black) to 1.0 (white)
    Gray(f64),
    /// CMYK color (cyan, magenta, yellow, key/black) with values from 0.0 to 1.0
    Cmyk(f64, f64, f64, f64),
}

impl Color {
    /// Creates an RGB color with values clamped to 0.0-1.0.
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Color::Rgb(r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0))
    }

    /// Create a color from a hex string like "#RRGGBB"
    pub fn hex(hex_str: &str) -> Self {
        let hex = hex_str.trim_start_matches('#');
        if hex.len() != 6 {
            return Color::black(); // Default fallback
        }

        let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0) as f64 / 255.0;
        let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0) as f64 / 255.0;
        let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0) as f64 / 255.0;

        Color::rgb(r, g, b)
    }

    /// Creates a grayscale color with value clamped to 0.0-1.0.
    pub fn gray(value: f64) -> Self {
        Color::Gray(value.clamp(0.0, 1.0))
    }

    /// Creates a CMYK color with values clamped to 0.0-1.0.
    pub fn cmyk(c: f64, m: f64, y: f64, k: f64) -> Self {
        Color::Cmyk(
            c.clamp(0.0, 1.0),
            m.clamp(0.0, 1.0),
            y.clamp(0.0, 1.0),
            k.clamp(0.0, 1.0),
        )
    }

    /// Black color (gray 0.0).
    pub fn black() -> Self {
        Color::Gray(0.0)
    }

    /// White color (gray 1.0).
    pub fn white() -> Self {
        Color::Gray(1.0)
    }

    /// Red color (RGB 1,0,0).
    pub fn red() -> Self {
        Color::Rgb(1.0, 0.0, 0.0)
    }

    /// Green color (RGB 0,1,0).
    pub fn green() -> Self {
        Color::Rgb(0.0, 1.0, 0.0)
    }

    /// Blue color (RGB 0,0,1).
    pub fn blue() -> Self {
        Color::Rgb(0.0, 0.0, 1.0)
    }

    pub fn yellow() -> Self {
        Color::Rgb(1.0, 1.0, 0.0)
    }

    pub fn cyan() -> Self {
        Color::Rgb(0.0, 1.0, 1.0)
    }

    pub fn magenta() -> Self {
        Color::Rgb(1.0, 0.0, 1.0)
    }

    /// Pure cyan color in CMYK space (100% cyan, 0% magenta, 0% yellow, 0% black)
    pub fn cmyk_cyan() -> Self {
        Color::Cmyk(1.0, 0.0, 0.0, 0.0)
    }

    /// Pure magenta color in CMYK space (0% cyan, 100% magenta, 0% yellow, 0% black)
    pub fn cmyk_magenta() -> Self {
        Color::Cmyk(0.0, 1.0, 0.0, 0.0)
    }

    /// Pure yellow color in CMYK space (0% cyan, 0% magenta, 100% yellow, 0% black)
    pub fn cmyk_yellow() -> Self {
        Color::Cmyk(0.0, 0.0, 1.0, 0.0)
    }

    /// Pure black color in CMYK space (0% cyan, 0% magenta, 0% yellow, 100% black)
    pub fn cmyk_black() -> Self {
        Color::Cmyk(0.0, 0.0, 0.0, 1.0)
    }

    /// Get red component (converts other color spaces to RGB approximation)
    pub fn r(&self) -> f64 {
        match self {
            Color::Rgb(r, _, _) => *r,
            Color::Gray(g) => *g,
            Color::Cmyk(c, _, _, k) => (1.0 - c) * (1.0 - k),
        }
    }

    /// Get green component (converts other color spaces to RGB approximation)
    pub fn g(&self) -> f64 {
        match self {
            Color::Rgb(_, g, _) => *g,
            Color::Gray(g) => *g,
            Color::Cmyk(_, m, _, k) => (1.0 - m) * (1.0 - k),
        }
    }

    /// Get blue component (converts other color spaces to RGB approximation)
    pub fn b(&self) -> f64 {
        match self {
            Color::Rgb(_, _, b) => *b,
            Color::Gray(g) => *g,
            Color::Cmyk(_, _, y, k) => (1.0 - y) * (1.0 - k),
        }
    }

    /// Get CMYK components (for CMYK colors, or conversion for others)
    pub fn cmyk_components(&self) -> (f64, f64, f64, f64) {
        match self {
            Color::Cmyk(c, m, y, k) => (*c, *m, *y, *k),
            Color::Rgb(r, g, b) => {
                // Convert RGB to CMYK using standard formula
                let k = 1.0 - r.max(*g).max(*b);
                if k >= 1.0 {
                    (0.0, 0.0, 0.0, 1.0)
                } else {
                    let c = (1.0 - r - k) / (1.0 - k);
                    let m = (1.0 - g - k) / (1.0 - k);
                    let y = (1.0 - b - k) / (1.0 - k);
                    (c, m, y, k)
                }
            }
            Color::Gray(g) => {
                // Convert grayscale to CMYK (K channel only)
                let k = 1.0 - g;
                (0.0, 0.0, 0.0, k)
            }
        }
    }

    /// Convert to RGB color space
    pub fn to_rgb(&self) -> Color {
        match self {
            Color::Rgb(_, _, _) => *self,
            Color::Gray(g) => Color::Rgb(*g, *g, *g),
            Color::Cmyk(c, m, y, k) => {
                // Standard CMYK to RGB conversion
                let r = (1.0 - c) * (1.0 - k);
                let g = (1.0 - m) * (1.0 - k);
                let b = (1.0 - y) * (1.0 - k);
                Color::Rgb(r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0))
            }
        }
    }

    /// Convert to CMYK color space
    pub fn to_cmyk(&self) -> Color {
        match self {
            Color::Cmyk(_, _, _, _) => *self,
            _ => {
                let (c, m, y, k) = self.cmyk_components();
                Color::Cmyk(c, m, y, k)
            }
        }
    }

    /// Check if this color is in CMYK color space
    pub fn is_cmyk(&self) -> bool {
        matches!(self, Color::Cmyk(_, _, _, _))
    }

    /// Check if this color is in RGB color space
    pub fn is_rgb(&self) -> bool {
        matches!(self, Color::Rgb(_, _, _))
    }

    /// Check if this color is in grayscale color space
    pub fn is_gray(&self) -> bool {
        matches!(self, Color::Gray(_))
    }
}
