pub mod monitor;
pub mod network;
pub mod output;
pub mod rate;
pub mod speed;
pub mod time;
