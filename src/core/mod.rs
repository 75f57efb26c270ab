pub mod angle;
pub mod config;
pub mod palette;
pub mod segment;
