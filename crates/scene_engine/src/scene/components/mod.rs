//! Built-in components

pub mod movement;
pub mod sprite;

pub use movement::Movement;
pub use sprite::Sprite;
