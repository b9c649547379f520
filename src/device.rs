mod device;

pub use device::Device;

export![camera, geometry, instance, lights, raster];
