//! Relay core library — message decision pipeline, bot/keyword/transcript
//! stores, Claude backend, and Instagram delivery used by the CLI.

pub mod channels;
pub mod config;
pub mod context;
pub mod generate;
pub mod init;
pub mod keyword;
pub mod llm;
pub mod pipeline;
pub mod relay;
pub mod store;
