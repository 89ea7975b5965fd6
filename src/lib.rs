pub mod bot;
pub mod core;
pub mod errors;
pub mod util;
