pub mod map;

pub use map::SimpleBSTMap;
