pub mod benchmark;
pub mod bot;
pub mod config;
pub mod error;
pub mod game;
pub mod geometry;
pub mod pathing;
pub mod protocol;
pub mod rng;
pub mod runner;
pub mod targeting;
pub mod transport;
pub mod world;

pub use bot::{Bot, Decision};
pub use config::BotConfig;
pub use error::ProtocolError;
pub use world::World;
