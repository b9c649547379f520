#![deny(unsafe_code)]

//! A rotating paper plane rendered with WebGL2.
//!
//! The scene model (`scene`) is plain data with dirty tracking, the device
//! (`device`, on top of the thin WebGL2 wrappers in `engine`) uploads and
//! draws it, and the runner mounts it into a page element.

#[allow(unused_imports)]
use log::{debug, info, warn};

macro_rules! export {
    [$( $module:ident ),* $(,)*] => {
        $(
            mod $module;
            pub use self::$module::*;
        )*
    };
}

export![device, engine, plane, runner, scene];

pub mod web;

/// GLSL shaders.
pub mod shaders {
    /// A preprocessed GLSL stage along with the names it binds.
    #[derive(Debug)]
    pub struct ShaderInfo {
        pub name: &'static str,
        pub code: &'static str,
        pub defines: &'static [&'static str],
        pub uniform_blocks: &'static [&'static str],
        pub texture_units: &'static [&'static str],
    }

    include!(concat!(env!("OUT_DIR"), "/glsl_shaders.rs"));
}
