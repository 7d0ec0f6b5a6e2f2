pub mod cell;
pub mod color;
pub mod distance;
pub mod grid;
