//! portkey-adapter binary entry point

use std::io::Write;

use color_eyre::Result;
use futures::StreamExt;
use portkey_adapter::{
    cli::{Cli, Commands},
    config::{auth::load_environment, validate_auth_method, AdapterConfig, AuthType, Settings},
    messages::Contents,
    services::{
        create_content_generator, ContentGenerator, CountTokensParameters, EmbedContentParameters,
        GenerateContentParameters,
    },
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Install error handler
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("portkey_adapter=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    load_environment();

    let settings = match &cli.settings {
        Some(path) => Settings::load_from_path(path)?,
        None => Settings::load()?,
    };

    let auth_method = settings
        .selected_auth_type
        .clone()
        .unwrap_or_else(|| AuthType::UsePortkey.to_string());

    if let Commands::CheckAuth { auth_type } = &cli.command {
        let method = auth_type.as_deref().unwrap_or(&auth_method);
        match validate_auth_method(method) {
            None => println!("valid"),
            Some(message) => {
                eprintln!("{message}");
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let auth_type: AuthType = auth_method.parse().map_err(color_eyre::eyre::Report::msg)?;
    let config = AdapterConfig::resolve(&cli.overrides(), &settings)?;
    let generator = create_content_generator(auth_type, config)?;

    run(generator.as_ref(), &cli.command, &settings).await
}

async fn run(generator: &dyn ContentGenerator, command: &Commands, settings: &Settings) -> Result<()> {
    match command {
        Commands::Generate { prompt, stream, .. } => {
            let mut request = GenerateContentParameters::new(prompt.join(" "));
            request.config = command.generation_config();

            if *stream {
                let mut fragments = generator.generate_content_stream(request).await?;
                let mut stdout = std::io::stdout();
                while let Some(fragment) = fragments.next().await {
                    let fragment = fragment?;
                    write!(stdout, "{}", fragment.text())?;
                    stdout.flush()?;
                    tracing::debug!(finish_reason = ?fragment.finish_reason(), usage = ?fragment.usage(), "fragment");
                }
                writeln!(stdout)?;
            } else {
                let response = generator.generate_content(request).await?;
                println!("{}", response.text());
                tracing::debug!(usage = ?response.usage(), "generation finished");
            }
        }
        Commands::CountTokens { text } => {
            let response = generator
                .count_tokens(CountTokensParameters {
                    contents: Contents::from(text.join(" ")),
                })
                .await?;
            println!("{}", response.total_tokens);
        }
        Commands::Embed {
            text,
            embedding_model,
        } => {
            let response = generator
                .embed_content(EmbedContentParameters {
                    contents: Contents::from(text.join(" ")),
                    model: embedding_model
                        .clone()
                        .or_else(|| settings.embedding_model.clone()),
                })
                .await?;
            let values = response
                .embeddings
                .first()
                .map(|e| e.values.as_slice())
                .unwrap_or_default();
            let preview: Vec<String> = values.iter().take(8).map(|v| format!("{v:.6}")).collect();
            println!("dimensions: {}", values.len());
            println!("[{}]", preview.join(", "));
        }
        Commands::CheckAuth { .. } => {}
    }

    Ok(())
}
