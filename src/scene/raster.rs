use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

/// How the key light's shadow map is sampled.
#[derive(Copy, Clone, Debug, Deserialize, PartialEq, Serialize, SmartDefault)]
#[serde(rename_all = "kebab-case")]
pub enum ShadowFilter {
    /// Single hardware-compared tap.
    Hard,
    /// 3x3 kernel of hardware-compared taps.
    Pcf,
    /// 5x5 kernel of hardware-compared taps.
    #[default]
    PcfSoft,
}

impl ShadowFilter {
    /// Half-width of the sampling kernel, in texels.
    pub fn kernel_radius(self) -> u32 {
        match self {
            Self::Hard => 0,
            Self::Pcf => 1,
            Self::PcfSoft => 2,
        }
    }
}

/// Creation-time options of the render surface.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, SmartDefault)]
#[serde(default)]
pub struct SurfaceOptions {
    #[default(true)]
    pub antialias: bool,
    /// Whether the canvas is transparent where nothing is drawn.
    #[default(true)]
    pub alpha: bool,
    #[default(true)]
    pub shadows: bool,
    pub shadow_filter: ShadowFilter,
}

/// Pixel size of the render surface.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, SmartDefault)]
pub struct Raster {
    #[default(300)]
    pub width: u32,
    #[default(150)]
    pub height: u32,
    /// Shadow settings copied from the surface options.
    #[default(true)]
    pub shadows: bool,
    pub shadow_filter: ShadowFilter,
}

impl Raster {
    pub fn new(width: u32, height: u32, options: &SurfaceOptions) -> Self {
        Self {
            width,
            height,
            shadows: options.shadows,
            shadow_filter: options.shadow_filter,
        }
    }
}
