//! portkey-adapter: Gemini-style content generation through the Portkey gateway
//!
//! This library lets a client keep one request/response shape (Gemini
//! `contents` in, `candidates` out) while requests are served by Portkey's
//! OpenAI-compatible API. It normalizes content, translates requests and
//! responses, decodes streamed responses, and estimates what the gateway
//! cannot answer natively.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::too_many_lines)]

pub mod cli;
pub mod config;
pub mod error;
pub mod messages;
pub mod services;

// Re-exports for convenience
pub use error::{AdapterError, Result};
pub use services::{portkey::PortkeyContentGenerator, ContentGenerator};
