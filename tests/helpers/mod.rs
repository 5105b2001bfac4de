#![allow(dead_code)]

pub mod builders;
pub mod fakes;

pub use builders::{BotBuilder, TestBot};
pub use fakes::{RecordingOracle, RecordingTransport};
