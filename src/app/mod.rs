pub mod delivery;
pub mod handler;
pub mod ports;
