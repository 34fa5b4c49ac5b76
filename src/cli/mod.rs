//! CLI argument parsing and command routing

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{config::ConfigOverrides, services::GenerationConfig};

/// Gemini-style content generation through the Portkey gateway
#[derive(Debug, Parser)]
#[command(name = "portkey-adapter")]
#[command(about = "Gemini-style content generation through the Portkey gateway", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Model to use (overrides the settings file)
    #[arg(long, global = true, env = "PORTKEY_MODEL")]
    pub model: Option<String>,

    /// Gateway base URL (overrides the settings file)
    #[arg(long, global = true, env = "PORTKEY_BASE_URL")]
    pub base_url: Option<String>,

    /// Settings file to read instead of the default location
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a response to a prompt
    Generate {
        /// The prompt to send
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,

        /// Maximum tokens to generate
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Sampling temperature
        #[arg(long)]
        temperature: Option<f32>,

        /// Nucleus sampling probability
        #[arg(long)]
        top_p: Option<f32>,

        /// Print fragments as they arrive
        #[arg(long)]
        stream: bool,
    },

    /// Estimate the token count of some text
    CountTokens {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Embed some text
    Embed {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Embedding model (defaults to the settings file, then the gateway default)
        #[arg(long)]
        embedding_model: Option<String>,
    },

    /// Check that the environment is set up for an auth method
    CheckAuth {
        /// Auth method identifier (defaults to the settings file, then `portkey`)
        #[arg(long)]
        auth_type: Option<String>,
    },
}

impl Cli {
    /// Parse CLI arguments from environment
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Config values given on the command line
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            model: self.model.clone(),
            base_url: self.base_url.clone(),
        }
    }
}

impl Commands {
    /// Generation parameters of a `generate` command, if any were given
    #[must_use]
    pub fn generation_config(&self) -> Option<GenerationConfig> {
        match self {
            Self::Generate {
                max_tokens,
                temperature,
                top_p,
                ..
            } if max_tokens.is_some() || temperature.is_some() || top_p.is_some() => {
                Some(GenerationConfig {
                    max_output_tokens: *max_tokens,
                    temperature: *temperature,
                    top_p: *top_p,
                })
            }
            _ => None,
        }
    }
}
