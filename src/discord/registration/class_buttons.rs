// Class picker buttons and the handler that finishes a registration.
//
// The buttons are sent by /register and may be clicked long after that
// command returned, so they are handled from the global event handler, not
// from a collector. Everything the handler needs is encoded in the custom id:
// `class_<Class>_<IGN>` (the IGN itself may contain underscores).

use crate::core::registration::{CanonicalIgn, PlayerClass, RegistrationError};
use crate::discord::{Data, Error};
use poise::serenity_prelude as serenity;

const CUSTOM_ID_PREFIX: &str = "class";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassChoice {
    pub class: PlayerClass,
    pub ign: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassIdError {
    #[error("not a class button")]
    NotClassButton,
    #[error("unknown class: {0}")]
    UnknownClass(String),
    #[error("class button is missing its class or IGN")]
    Incomplete,
}

pub fn class_custom_id(class: PlayerClass, ign: &CanonicalIgn) -> String {
    format!("{}_{}_{}", CUSTOM_ID_PREFIX, class.label(), ign)
}

pub fn parse_class_custom_id(custom_id: &str) -> Result<ClassChoice, ClassIdError> {
    let mut parts = custom_id.splitn(3, '_');

    if parts.next() != Some(CUSTOM_ID_PREFIX) {
        return Err(ClassIdError::NotClassButton);
    }

    let label = parts.next().filter(|s| !s.is_empty()).ok_or(ClassIdError::Incomplete)?;
    let ign = parts.next().filter(|s| !s.is_empty()).ok_or(ClassIdError::Incomplete)?;

    let class = label
        .parse::<PlayerClass>()
        .map_err(|_| ClassIdError::UnknownClass(label.to_string()))?;

    Ok(ClassChoice {
        class,
        ign: ign.to_string(),
    })
}

/// One button per class, all pointing at the same IGN.
pub fn class_button_row(ign: &CanonicalIgn) -> serenity::CreateActionRow {
    let buttons = PlayerClass::ALL
        .into_iter()
        .map(|class| {
            serenity::CreateButton::new(class_custom_id(class, ign))
                .label(class.label())
                .emoji(serenity::ReactionType::Unicode(class.emoji().to_string()))
                .style(serenity::ButtonStyle::Primary)
        })
        .collect();

    serenity::CreateActionRow::Buttons(buttons)
}

pub fn nickname_for(class: PlayerClass, ign: &CanonicalIgn) -> String {
    format!("[{}] {}", class.label(), ign)
}

async fn follow_up(
    ctx: &serenity::Context,
    component: &serenity::ComponentInteraction,
    content: impl Into<String>,
) -> Result<(), Error> {
    component
        .create_followup(
            ctx,
            serenity::CreateInteractionResponseFollowup::new()
                .content(content)
                .ephemeral(true),
        )
        .await?;
    Ok(())
}

/// Look the member role up by name in the cache. Kept sync so the cache
/// guard never lives across an await.
fn find_role(
    ctx: &serenity::Context,
    guild_id: serenity::GuildId,
    role_name: &str,
) -> Option<serenity::RoleId> {
    let guild = ctx.cache.guild(guild_id)?;
    guild
        .roles
        .values()
        .find(|role| role.name.to_lowercase() == role_name.to_lowercase())
        .map(|role| role.id)
}

/// Entry point from the event handler for every component interaction.
pub async fn handle_component(
    ctx: &serenity::Context,
    data: &Data,
    component: &serenity::ComponentInteraction,
) -> Result<(), Error> {
    let choice = match parse_class_custom_id(&component.data.custom_id) {
        Ok(choice) => choice,
        Err(ClassIdError::NotClassButton) => return Ok(()),
        Err(e) => {
            tracing::warn!(custom_id = %component.data.custom_id, "Ignoring class button: {}", e);
            return Ok(());
        }
    };

    component.defer(ctx).await?;

    let Some(guild_id) = component.guild_id else {
        follow_up(ctx, component, "⚠️ Registration only works inside the server.").await?;
        return Ok(());
    };

    let user_id = component.user.id.to_string();
    let service = &data.registration;

    if let Err(e) = service.check(&choice.ign, &user_id).await {
        return report_rejection(ctx, component, e, Stage::Check).await;
    }

    let member = match guild_id.member(ctx, component.user.id).await {
        Ok(member) => member,
        Err(e) => {
            tracing::warn!(user_id = %user_id, "Failed to fetch member: {}", e);
            follow_up(
                ctx,
                component,
                "⚠️ I couldn’t find your member profile. Please try again in a moment.",
            )
            .await?;
            return Ok(());
        }
    };

    // Persist first so a concurrent claim on the same name loses cleanly,
    // then rename; a failed rename undoes the write.
    let registration = match service.register(&choice.ign, &user_id, choice.class).await {
        Ok(registration) => registration,
        Err(e) => return report_rejection(ctx, component, e, Stage::Save).await,
    };

    let nickname = nickname_for(choice.class, &registration.ign);
    if let Err(e) = guild_id
        .edit_member(
            ctx,
            component.user.id,
            serenity::EditMember::new().nickname(&nickname),
        )
        .await
    {
        tracing::warn!(user_id = %user_id, nickname = %nickname, "Failed to set nickname: {}", e);
        if let Err(revert_err) = service.revert(&registration).await {
            tracing::error!(
                ign = %registration.ign,
                user_id = %user_id,
                "Failed to revert registration after nickname failure: {}",
                revert_err
            );
        }
        follow_up(
            ctx,
            component,
            "⚠️ I couldn’t change your nickname. Please check my permissions.",
        )
        .await?;
        return Ok(());
    }

    if let Some(role_id) = find_role(ctx, guild_id, &data.member_role_name) {
        if let Err(e) = member.add_role(ctx, role_id).await {
            tracing::warn!(user_id = %user_id, "Failed to add member role: {}", e);
        }
    }

    tracing::info!(
        user_id = %user_id,
        nickname = %nickname,
        updated_at = %registration.record.updated_at,
        "Member registered"
    );
    follow_up(
        ctx,
        component,
        format!("🎉 You are now registered as **{}**!", nickname),
    )
    .await?;

    // Clear the picker so it can't be clicked twice.
    let cleared = serenity::EditInteractionResponse::new()
        .content(" ")
        .embeds(Vec::new())
        .components(Vec::new());
    if let Err(e) = component.edit_response(ctx, cleared).await {
        tracing::debug!("Failed to clear class picker: {}", e);
    }
    if let Err(e) = component.delete_response(ctx).await {
        tracing::debug!("Failed to delete class picker: {}", e);
    }

    Ok(())
}

/// Where in the handler a registration error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Read-only gate before anything is written.
    Check,
    /// The write itself.
    Save,
}

fn rejection_message(error: &RegistrationError, stage: Stage) -> String {
    match (error, stage) {
        (RegistrationError::NotAllowed(_) | RegistrationError::Unavailable(_), _) => {
            format!("⚠️ {}", error)
        }
        (RegistrationError::Store(_), Stage::Check) => {
            "⚠️ I couldn't read the registration list. Please try again later.".to_string()
        }
        (RegistrationError::Store(_), Stage::Save) => {
            "⚠️ I couldn't save your registration. Please contact an officer.".to_string()
        }
    }
}

async fn report_rejection(
    ctx: &serenity::Context,
    component: &serenity::ComponentInteraction,
    error: RegistrationError,
    stage: Stage,
) -> Result<(), Error> {
    if let RegistrationError::Store(e) = &error {
        tracing::error!(
            user_id = %component.user.id,
            stage = ?stage,
            "Registration storage failure: {}",
            e
        );
    }

    follow_up(ctx, component, rejection_message(&error, stage)).await
}
