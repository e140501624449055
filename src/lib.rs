// Library exports for the beam search Battlesnake
// The server binary, the replay tool and the integration tests all build on these

#[macro_use]
extern crate rocket;

pub mod bot;
pub mod config;
pub mod debug_logger;
pub mod evaluation;
pub mod features;
pub mod grid;
pub mod handler;
pub mod heuristics;
pub mod moves;
pub mod pathfinding;
pub mod replay;
pub mod search;
pub mod selection;
pub mod simulate;
pub mod state;
pub mod types;
