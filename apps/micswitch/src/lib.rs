// Microphone switcher library
pub mod client;
pub mod command;
pub mod notifications;
pub mod pactl;
pub mod parser;
pub mod platform;
pub mod source;
pub mod switch_audio_source;
pub mod use_cases;

#[cfg(test)]
mod test_support;

pub use client::{AudioSystemClient, ClientError};
pub use command::SwitchCommandBuilder;
pub use parser::SourceFormat;
pub use source::{AudioSource, AudioSourceList};
pub use use_cases::{ListSourcesUseCase, SwitchSourceUseCase, UseCaseError};
