//! Marketeer command implementations

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use marketeer_agent::profile::SAMPLE_PROFILE;
use marketeer_agent::{BusinessProfile, Delegation, ManagerAgent, Specialist};
use marketeer_config::{self, Config, COMPLETION_KEY_ENV, SEARCH_KEY_ENV};
use marketeer_provider::CompatProvider;

/// Goals run by `marketeer demo`
const DEMO_GOALS: &[&str] = &[
    "Create an engaging Instagram post about our weekly special.",
    "Check for any new customer reviews and draft responses.",
];

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Write the default config and a sample business profile
pub async fn init_command() -> Result<()> {
    println!("◆ Initializing Marketeer...");
    println!("{}", RULE);

    let config = marketeer_config::init()
        .await
        .context("failed to write default config")?;

    let profile_path = config.profile_path();
    if profile_path.exists() {
        println!("  Profile already exists: {}", profile_path.display());
    } else {
        if let Some(parent) = profile_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&profile_path, SAMPLE_PROFILE).await?;
        println!("  Created {}", profile_path.display());
    }

    println!("\n◆ Marketeer initialized");
    println!("\nNext steps:");
    println!(
        "  1. Add your API key to {} or export {}",
        marketeer_config::config_path().display(),
        COMPLETION_KEY_ENV
    );
    println!("  2. Describe your business in {}", profile_path.display());
    println!("  3. Delegate a goal: marketeer delegate -g \"Create a post about our new menu\"");

    Ok(())
}

/// Route goals to the specialists, once or interactively
pub async fn delegate_command(
    goal: Option<String>,
    profile: Option<PathBuf>,
    trace: bool,
) -> Result<()> {
    let config = Config::load().await?;
    let manager = build_manager(&config, profile.as_deref()).await?;

    if let Some(goal) = goal {
        run_goal(&manager, &goal, trace).await?;
        return Ok(());
    }

    println!("◆ Interactive mode (type 'exit' to quit)");
    println!("{}", RULE);

    loop {
        print!("◆ goal> ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }

        run_goal(&manager, input, trace).await?;
        println!();
    }

    Ok(())
}

/// Run the sample goals back to back
pub async fn demo_command(profile: Option<PathBuf>) -> Result<()> {
    let config = Config::load().await?;
    let manager = build_manager(&config, profile.as_deref()).await?;

    for (i, goal) in DEMO_GOALS.iter().enumerate() {
        println!("\n◆ Demo {}/{}: {}", i + 1, DEMO_GOALS.len(), goal);
        println!("{}", RULE);
        run_goal(&manager, goal, false).await?;
    }

    Ok(())
}

/// Show configuration status
pub async fn status_command() -> Result<()> {
    let config_path = marketeer_config::config_path();

    println!("◆ Marketeer Status");
    println!("{}", RULE);
    println!("Config:   {} {}", config_path.display(), presence(&config_path));

    let config = Config::load().await?;
    let profile_path = config.profile_path();
    println!("Profile:  {} {}", profile_path.display(), presence(&profile_path));
    println!("Model:    {}", config.default_model());
    println!(
        "Endpoint: {}",
        config
            .api_base()
            .unwrap_or_else(|| marketeer_provider::compat::DEFAULT_API_BASE.to_string())
    );
    println!("API key:  {}", key_status(config.has_api_key()));
    println!(
        "Search:   {}",
        key_status(config.search_api_key().is_some())
    );

    if profile_path.exists() {
        let profile = BusinessProfile::load(&profile_path).await?;
        println!(
            "Voice:    {}",
            profile.brand_voice().unwrap_or("[Missing brand_voice line]")
        );
    }

    Ok(())
}

fn presence(path: &Path) -> &'static str {
    if path.exists() {
        "[OK]"
    } else {
        "[Missing]"
    }
}

fn key_status(set: bool) -> &'static str {
    if set {
        "[Set]"
    } else {
        "[Missing]"
    }
}

/// Wire the provider and both specialists from config
async fn build_manager(config: &Config, profile: Option<&Path>) -> Result<ManagerAgent> {
    let api_key = config.api_key().with_context(|| {
        format!(
            "No API key configured. Set provider.api_key in {} or export {}",
            marketeer_config::config_path().display(),
            COMPLETION_KEY_ENV
        )
    })?;
    if config.search_api_key().is_none() {
        warn!(
            "{} is not set, trend search will report an error to the agent",
            SEARCH_KEY_ENV
        );
    }

    let profile = load_profile(config, profile).await?;
    let provider = CompatProvider::new(
        api_key,
        config.api_base(),
        Some(config.default_model()),
    );

    let manager = ManagerAgent::new(&profile, Arc::new(provider), config);
    if !manager.is_available(Specialist::Reputation) {
        warn!(
            "add a 'brand_voice:' line to the profile to enable {}",
            Specialist::Reputation.persona()
        );
    }
    Ok(manager)
}

/// An explicit path must exist; the configured one falls back to the sample
async fn load_profile(config: &Config, explicit: Option<&Path>) -> Result<BusinessProfile> {
    if let Some(path) = explicit {
        return BusinessProfile::load(path)
            .await
            .with_context(|| format!("could not read profile {}", path.display()));
    }

    let path = config.profile_path();
    if path.exists() {
        Ok(BusinessProfile::load(&path).await?)
    } else {
        warn!(
            "no business profile at {}, using the sample profile (run `marketeer init`)",
            path.display()
        );
        Ok(BusinessProfile::default())
    }
}

async fn run_goal(manager: &ManagerAgent, goal: &str, trace: bool) -> Result<()> {
    let delegation = manager.delegate_traced(goal).await?;
    print_delegation(&delegation, trace);
    Ok(())
}

fn print_delegation(delegation: &Delegation, trace: bool) {
    if let Some(specialist) = delegation.specialist {
        info!("handled by {} ({})", specialist.persona(), specialist.label());
    }

    if trace {
        if let Some(conversation) = &delegation.conversation {
            println!("\n◆ Thought process");
            println!("{}", RULE);
            println!("{}", conversation.transcript());
            println!("{}", RULE);
        }
    }

    println!("\n◆ {}", delegation.result);
}
