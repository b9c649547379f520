use serde::{Deserialize, Serialize};

/// Unpacks a `0xRRGGBB` color into components in `[0, 1]`.
pub fn color_from_hex(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Material {
    /// Blinn-Phong surface with a fixed faint specular color.
    Phong {
        color: [f32; 3],
        shininess: f32,
        flat_shading: bool,
    },
}

impl Material {
    pub fn color(&self) -> [f32; 3] {
        match self {
            Self::Phong { color, .. } => *color,
        }
    }

    pub fn shininess(&self) -> f32 {
        match self {
            Self::Phong { shininess, .. } => *shininess,
        }
    }

    pub fn flat_shading(&self) -> bool {
        match self {
            Self::Phong { flat_shading, .. } => *flat_shading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_unpack_per_channel() {
        assert_eq!(color_from_hex(0xff0000), [1.0, 0.0, 0.0]);
        assert_eq!(color_from_hex(0x00ff00), [0.0, 1.0, 0.0]);
        assert_eq!(color_from_hex(0x0000ff), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn paper_white_is_slightly_grey() {
        let [r, g, b] = color_from_hex(0xf5f5f5);

        assert!((r - 245.0 / 255.0).abs() < 1e-6);
        assert_eq!(r, g);
        assert_eq!(g, b);
    }
}
