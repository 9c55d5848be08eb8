pub mod audio;
#[cfg(feature = "mic")]
pub mod mic;
