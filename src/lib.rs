pub mod city;
pub mod config;
pub mod continent;
pub mod heightfield;
pub mod pairing;
pub mod preview;
pub mod start;
pub mod terrain;
pub mod world;

pub use config::GenParams;
pub use heightfield::{HeightField, generate_heightfield};
pub use world::{GenError, World, generate_world, generate_world_with};
