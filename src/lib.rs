pub mod cli;
pub mod errors;
pub mod logging;
pub mod model;
pub mod platform;
pub mod report;
pub mod scanner;
pub mod target;
