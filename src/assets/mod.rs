pub mod cache;
pub mod loader;
pub mod lookup;
pub mod texture;
