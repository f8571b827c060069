//! Maze generation and construction

pub mod builder;
pub mod config;
pub mod generator;

pub use builder::{Corner, Maze, MazeBuilder, StarEntities};
pub use config::MazeConfiguration;
pub use generator::{CellCode, Grid, GridError, MazeGenerator};
