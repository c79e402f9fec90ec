// This is the entry point of the registration bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic): allow-list, registration service, store port
// - `infra/` = Implementations of core traits (JSON file store) plus the healthcheck listener
// - `discord/` = Discord-specific adapters (commands, button handler)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Register commands and event handlers

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with several mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

mod config;

use crate::config::BotConfig;
use crate::core::registration::{AllowList, RegistrationService};
use crate::discord::commands::presence;
use crate::discord::{class_buttons, Data, Error};
use crate::infra::healthcheck;
use crate::infra::registration::JsonRegistrationStore;
use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

/// Event handler for non-command Discord events.
/// Class picker clicks arrive here as component interactions.
async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            tracing::info!("✅ Logged in as {}", data_about_bot.user.tag());
        }
        serenity::FullEvent::InteractionCreate {
            interaction: serenity::Interaction::Component(component),
        } => {
            if let Err(e) = class_buttons::handle_component(ctx, data, component).await {
                tracing::error!(
                    custom_id = %component.data.custom_id,
                    "Error handling component interaction: {}",
                    e
                );
            }
        }
        _ => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let config = BotConfig::from_env()?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================

    let store = JsonRegistrationStore::new(&config.registrations_path);
    let registration_service = Arc::new(RegistrationService::new(store, AllowList::default()));
    tracing::info!(
        path = %config.registrations_path.display(),
        approved = registration_service.allow_list().len(),
        "Registration store ready"
    );

    let data = Data {
        registration: Arc::clone(&registration_service),
        member_role_name: config.member_role_name.clone(),
    };

    // Healthcheck runs for the life of the process; losing it shouldn't take the bot down.
    let port = config.port;
    tokio::spawn(async move {
        if let Err(e) = healthcheck::serve(port).await {
            tracing::error!("Healthcheck server stopped: {}", e);
        }
    });

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    // GUILD_MEMBERS is needed to fetch and rename members.
    let intents = serenity::GatewayIntents::GUILDS | serenity::GatewayIntents::GUILD_MEMBERS;

    let guild_id = config.guild_id;
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                discord::commands::register::register(),
                discord::commands::registrations::registrations(),
            ],
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                tracing::info!("🔄 Registering slash commands...");

                // Guild registration shows up instantly; global can take up to an hour.
                match guild_id {
                    Some(id) => {
                        poise::builtins::register_in_guild(
                            ctx,
                            &framework.options().commands,
                            serenity::GuildId::new(id),
                        )
                        .await?;
                        tracing::info!(guild_id = id, "✅ Slash commands registered for this guild!");
                    }
                    None => {
                        poise::builtins::register_globally(ctx, &framework.options().commands)
                            .await?;
                        tracing::info!("✅ Slash commands registered globally!");
                    }
                }

                presence::on_ready(ctx);
                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await
        .context("Error creating client")?;

    client.start().await.context("Error running bot")?;
    Ok(())
}
