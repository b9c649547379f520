mod scene;

pub use scene::Scene;

export![animation, camera, dirty, geometry, light, material, object, raster];
