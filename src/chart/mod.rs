//! Terminal line charts of numeric columns

pub mod color;
pub mod render;
pub mod select;
