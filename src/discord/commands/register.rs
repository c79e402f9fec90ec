// The /register command.
//
// **Flow:**
// 1. Show a modal asking for the IGN
// 2. Gate the IGN against the allow-list and current owner
// 3. Reply (ephemeral) with the class picker
//
// Picking a class is handled in `discord::class_buttons`, which is where the
// registration is actually written.

use crate::core::registration::{RegistrationError, RegistrationService};
use crate::discord::class_buttons::class_button_row;
use crate::infra::registration::JsonRegistrationStore;
use poise::serenity_prelude as serenity;
use poise::Modal as _;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

/// How long we wait for the modal to be submitted before giving up.
const MODAL_TIMEOUT: Duration = Duration::from_secs(60);

/// Type alias for our bot's context.
/// This is what every command receives as its first parameter.
pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type ApplicationContext<'a> = poise::ApplicationContext<'a, Data, Error>;

/// Data that's shared across all commands.
pub struct Data {
    pub registration: Arc<RegistrationService<JsonRegistrationStore>>,
    /// Role granted once a registration goes through (matched case-insensitively).
    pub member_role_name: String,
}

#[derive(Debug, poise::Modal)]
#[name = "IGN Registration"]
struct RegisterModal {
    #[name = "Enter your IGN"]
    #[placeholder = "e.g., WalangHeal"]
    ign: String,
}

fn ephemeral(content: impl Into<String>) -> serenity::CreateInteractionResponse {
    serenity::CreateInteractionResponse::Message(
        serenity::CreateInteractionResponseMessage::new()
            .content(content)
            .ephemeral(true),
    )
}

/// Register your IGN and class.
#[poise::command(slash_command, guild_only)]
pub async fn register(ctx: ApplicationContext<'_>) -> Result<(), Error> {
    let custom_id = format!("register_modal_{}", ctx.interaction.id);
    let generic = Context::Application(ctx);
    let serenity_ctx = generic.serenity_context();
    let author_id = generic.author().id;

    ctx.interaction
        .create_response(serenity_ctx, RegisterModal::create(None, custom_id.clone()))
        .await?;
    ctx.has_sent_initial_response.store(true, Ordering::SeqCst);

    let Some(submission) = serenity::ModalInteractionCollector::new(serenity_ctx)
        .author_id(author_id)
        .custom_ids(vec![custom_id])
        .timeout(MODAL_TIMEOUT)
        .await
    else {
        tracing::debug!(user_id = %author_id, "Registration modal was never submitted");
        return Ok(());
    };

    let form = RegisterModal::parse(submission.data.clone())?;
    let user_id = author_id.to_string();

    let ign = match generic.data().registration.check(&form.ign, &user_id).await {
        Ok(ign) => ign,
        Err(RegistrationError::Store(e)) => {
            tracing::error!(user_id = %user_id, "Failed to read registrations: {}", e);
            submission
                .create_response(
                    serenity_ctx,
                    ephemeral("⚠️ I couldn't read the registration list. Please try again later."),
                )
                .await?;
            return Ok(());
        }
        Err(rejection) => {
            submission
                .create_response(serenity_ctx, ephemeral(format!("⚠️ {}", rejection)))
                .await?;
            return Ok(());
        }
    };

    let embed = serenity::CreateEmbed::new()
        .title("Select Your Class")
        .description(format!(
            "IGN: **{}**\n\nClick a button below to choose your class:",
            ign
        ))
        .color(0x3498DB); // Blue

    submission
        .create_response(
            serenity_ctx,
            serenity::CreateInteractionResponse::Message(
                serenity::CreateInteractionResponseMessage::new()
                    .embed(embed)
                    .components(vec![class_button_row(&ign)])
                    .ephemeral(true),
            ),
        )
        .await?;

    Ok(())
}
