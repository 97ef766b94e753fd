//! Lead store and notifier ports

pub mod ports;

pub use ports::*;
