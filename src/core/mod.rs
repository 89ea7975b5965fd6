pub mod config;
pub mod directory;
pub mod services;
pub mod state;
pub mod timer;
pub mod workflow;
