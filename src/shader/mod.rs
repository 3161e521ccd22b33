pub mod definition;
pub mod kernel;
pub mod library;
pub mod material;
