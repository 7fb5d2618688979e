// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::io::{self, Write};

use crossterm::{
    style::{Color, ResetColor, SetForegroundColor},
    ExecutableCommand,
};

use parley::chat::ChatSession;
use parley::cli::{AskArgs, Cli};
use parley::config::Settings;
use parley::error::{ParleyError, Result};
use parley::llm::registry::ProviderRegistry;
use parley::tui::{self, App};

/// Registry from `--providers`, then the settings file, then the built-in list
pub(super) fn build_registry(cli: &Cli, settings: &Settings) -> Result<ProviderRegistry> {
    let Some(path) = cli
        .providers
        .clone()
        .or_else(|| settings.resolved_providers_file())
    else {
        return Ok(ProviderRegistry::builtin());
    };

    let registry = ProviderRegistry::from_path(&path)?;
    tracing::info!(path = %path.display(), providers = registry.len(), "loaded provider descriptors");
    if registry.is_empty() {
        tracing::warn!(path = %path.display(), "no usable providers in descriptor file");
    }
    Ok(registry)
}

/// Session with the startup provider selected and its key loaded, when
/// both are available
pub(super) fn build_session(cli: &Cli, settings: &Settings, registry: ProviderRegistry) -> ChatSession {
    let model = cli
        .model
        .clone()
        .unwrap_or_else(|| settings.defaults.model.clone());
    let mut session = ChatSession::new(registry, model)
        .with_streaming(settings.defaults.stream && !cli.no_stream);
    if let Some(prompt) = &settings.defaults.system_prompt {
        session = session.with_system_prompt(prompt.clone());
    }

    let provider = startup_provider(cli, settings);
    match session.select_provider(&provider) {
        Ok(()) => {
            if let Some(key) = settings.api_key_for(&provider) {
                session.set_api_key(key);
            }
        }
        Err(e) => tracing::warn!(provider = %provider, error = %e, "startup provider unavailable"),
    }
    session
}

fn startup_provider(cli: &Cli, settings: &Settings) -> String {
    cli.provider
        .clone()
        .unwrap_or_else(|| settings.defaults.provider.clone())
}

/// Interactive chat. Opens the setup flow first when no key is known.
pub(super) async fn run_chat(cli: &Cli, settings: Settings) -> Result<()> {
    let registry = build_registry(cli, &settings)?;
    let session = build_session(cli, &settings, registry);

    let mut app = App::new(session, settings).with_settings_path(Settings::default_path());
    if !app.session().has_api_key() {
        app.open_setup();
    }
    tui::run_chat_tui(app).await
}

/// Single question, reply printed as it arrives
pub(super) async fn run_ask(cli: &Cli, args: &AskArgs, settings: &Settings) -> Result<()> {
    let registry = build_registry(cli, settings)?;
    let mut session = build_session(cli, settings, registry);

    let provider = startup_provider(cli, settings);
    if session.provider_name().is_none() {
        return Err(ParleyError::UnsupportedProvider(provider));
    }
    if let Some(key) = &args.api_key {
        session.set_api_key(key.clone());
    }
    if !session.has_api_key() {
        let hint = Settings::default_api_key_env(&provider)
            .map(|env| format!("set {} or pass --api-key", env))
            .unwrap_or_else(|| "pass --api-key".to_string());
        return Err(ParleyError::Config(format!("No API key for {}: {}", provider, hint)));
    }

    let request = session.prepare(&args.prompt)?;
    tracing::debug!(?request, "ask");
    request
        .run(|chunk| {
            print!("{}", chunk);
            let _ = io::stdout().flush();
        })
        .await?;
    println!();
    Ok(())
}

/// Print the providers that would be registered
pub(super) fn run_providers(cli: &Cli, settings: &Settings) -> Result<()> {
    let registry = build_registry(cli, settings)?;
    let mut stdout = io::stdout();

    if registry.is_empty() {
        println!("No providers registered.");
        return Ok(());
    }

    let _ = stdout.execute(SetForegroundColor(Color::Cyan));
    println!("{:<20} {:<8} ENDPOINT", "NAME", "STREAM");
    let _ = stdout.execute(ResetColor);

    for name in registry.names() {
        let Some(provider) = registry.get_by_name(&name) else {
            continue;
        };
        let info = provider.info();
        let stream = if info.stream { "yes" } else { "no" };
        println!("{:<20} {:<8} {}", info.name, stream, info.endpoint);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_build_registry_defaults_to_builtin() {
        let cli = Cli::parse_from(["parley"]);
        let registry = build_registry(&cli, &Settings::default()).unwrap();
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_build_registry_from_flag() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"name": "OpenRouter Stream"}}]"#).unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::parse_from(["parley", "--providers", path.as_str()]);
        let registry = build_registry(&cli, &Settings::default()).unwrap();
        assert_eq!(registry.names(), vec!["OpenRouter Stream".to_string()]);
    }

    #[test]
    fn test_build_session_uses_flags() {
        let cli = Cli::parse_from(["parley", "-p", "OpenRouter", "-m", "openai/gpt-4o", "--no-stream"]);
        let mut settings = Settings::default();
        settings.remember_api_key("OpenRouter", "sk-or-from-file");

        let session = build_session(&cli, &settings, ProviderRegistry::builtin());

        assert_eq!(session.provider_name(), Some("OpenRouter"));
        assert_eq!(session.model(), "openai/gpt-4o");
        assert!(!session.will_stream());
    }

    #[test]
    fn test_build_session_unknown_provider() {
        let cli = Cli::parse_from(["parley", "-p", "Nope"]);
        let session = build_session(&cli, &Settings::default(), ProviderRegistry::builtin());
        assert!(session.provider_name().is_none());
    }

    #[tokio::test]
    async fn test_ask_unknown_provider_fails() {
        let cli = Cli::parse_from(["parley", "-p", "Nope", "ask", "hi"]);
        let parley::cli::Commands::Ask(args) = cli.command() else {
            panic!("expected ask");
        };
        let err = run_ask(&cli, args, &Settings::default()).await.unwrap_err();
        assert!(matches!(err, ParleyError::UnsupportedProvider(name) if name == "Nope"));
    }
}
