mod client;

pub use client::{OpenAICompatibleClient, OpenAICompatibleClientBuilder, DEFAULT_TIMEOUT};
