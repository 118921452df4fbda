pub mod cli;
pub mod config;
pub mod decode;
pub mod heuristic;
mod metrics;
pub mod model;
pub mod mood;
pub mod recommend;
pub mod server;

pub use config::Opts;
pub use mood::{MoodClassifier, MoodResult, Source, Strategy, detect_mood};
