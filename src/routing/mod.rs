pub mod adjuster;
pub mod config;
pub mod data_structures;
pub mod dijkstra;
pub mod error;
pub mod io;
pub mod logging;
pub mod network;
pub mod planner;
pub mod run;
