// Officer tools for the registration table: look at it, and free up a name.

use crate::core::registration::{normalize_ign, record_key, RegistrationRecord};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;
use std::collections::HashSet;

/// Discord caps embed descriptions at 4096 characters.
const DESCRIPTION_LIMIT: usize = 4000;

/// Manage IGN registrations
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_NICKNAMES",
    subcommands("list", "lookup", "remove")
)]
pub async fn registrations(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Show every registered IGN
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_NICKNAMES")]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    let service = &ctx.data().registration;
    let records = service.list_all().await?;
    let approved = service.allow_list().len();

    let open = unclaimed(service.allow_list().names(), &records);
    let open_text = if open.is_empty() {
        "None".to_string()
    } else {
        truncate_field(&open.join(", "))
    };

    let embed = serenity::CreateEmbed::new()
        .title("📋 Registered IGNs")
        .description(format_registrations(records.clone()))
        .field("Unclaimed", open_text, false)
        .color(0x3498DB)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "{}/{} approved IGNs registered",
            records.len(),
            approved
        )));

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Show who holds an IGN
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_NICKNAMES")]
pub async fn lookup(
    ctx: Context<'_>,
    #[description = "IGN to look up"] ign: String,
) -> Result<(), Error> {
    let service = &ctx.data().registration;
    let approved = service.allow_list().is_allowed(&ign);
    let record = service.get(&ign).await?;
    let reply = lookup_reply(&ign, approved, record.as_ref());

    ctx.send(poise::CreateReply::default().content(reply).ephemeral(true))
        .await?;
    Ok(())
}

/// Remove the registration for an IGN so someone else can claim it
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_NICKNAMES")]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "IGN to unregister"] ign: String,
) -> Result<(), Error> {
    let removed = ctx.data().registration.remove(&ign).await?;

    let reply = if removed {
        tracing::info!(ign = %ign.trim(), by = %ctx.author().id, "Registration removed");
        format!("✅ Removed the registration for **{}**.", ign.trim())
    } else {
        format!("❌ **{}** is not registered.", ign.trim())
    };

    ctx.send(poise::CreateReply::default().content(reply).ephemeral(true))
        .await?;
    Ok(())
}

fn lookup_reply(ign: &str, approved: bool, record: Option<&RegistrationRecord>) -> String {
    match record {
        Some(record) => format!(
            "**{}** is registered to <@{}> as {} (since <t:{}:f>).",
            record.ign,
            record.user_id,
            record.class_name,
            record.updated_at.timestamp()
        ),
        None if !approved => format!("**{}** is not an approved IGN.", ign.trim()),
        None => format!("**{}** is not registered.", ign.trim()),
    }
}

/// Approved names nobody has claimed yet, in roster order.
fn unclaimed<'a>(approved: &'a [String], records: &[RegistrationRecord]) -> Vec<&'a str> {
    let taken: HashSet<String> = records.iter().map(record_key).collect();
    approved
        .iter()
        .filter(|name| !taken.contains(&normalize_ign(name)))
        .map(String::as_str)
        .collect()
}

/// Embed field values are capped at 1024 characters.
fn truncate_field(text: &str) -> String {
    const FIELD_LIMIT: usize = 1000;
    if text.chars().count() <= FIELD_LIMIT {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(FIELD_LIMIT).collect();
    cut.push('…');
    cut
}

/// One line per record, alphabetical by IGN, cut off before the embed limit.
fn format_registrations(mut records: Vec<RegistrationRecord>) -> String {
    if records.is_empty() {
        return "No registrations yet.".to_string();
    }

    records.sort_by_key(|r| r.ign.to_lowercase());

    let mut description = String::new();
    for (shown, record) in records.iter().enumerate() {
        let line = format!(
            "**{}** · {} · <@{}>\n",
            record.ign, record.class_name, record.user_id
        );
        if description.len() + line.len() > DESCRIPTION_LIMIT {
            description.push_str(&format!("…and {} more", records.len() - shown));
            break;
        }
        description.push_str(&line);
    }

    description
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ign: &str, user_id: &str, class_name: &str) -> RegistrationRecord {
        RegistrationRecord {
            ign: ign.into(),
            user_id: user_id.into(),
            class_name: class_name.into(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn empty_table_has_a_placeholder() {
        assert_eq!(format_registrations(Vec::new()), "No registrations yet.");
    }

    #[test]
    fn lines_are_sorted_case_insensitively() {
        let text = format_registrations(vec![
            record("xMads", "1", "Berserker"),
            record("dE", "2", "Archer"),
            record("Fize", "3", "Skald"),
        ]);

        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("**dE**"));
        assert!(lines[1].starts_with("**Fize**"));
        assert!(lines[2].starts_with("**xMads**"));
        assert!(lines[2].contains("<@1>"));
    }

    #[test]
    fn lookup_distinguishes_unapproved_names() {
        assert_eq!(
            lookup_reply(" Imposter ", false, None),
            "**Imposter** is not an approved IGN."
        );
        assert_eq!(lookup_reply("Fize", true, None), "**Fize** is not registered.");

        let held = record("Fize", "42", "Skald");
        let reply = lookup_reply("fize", true, Some(&held));
        assert!(reply.starts_with("**Fize** is registered to <@42> as Skald"));
    }

    #[test]
    fn unclaimed_skips_registered_names() {
        let approved = vec!["xMads".to_string(), "Fize".to_string(), "dE".to_string()];
        let records = vec![record("xMads", "1", "Berserker")];

        assert_eq!(unclaimed(&approved, &records), vec!["Fize", "dE"]);
        assert!(unclaimed(&approved[..1], &records).is_empty());
    }

    #[test]
    fn long_fields_are_cut() {
        let long = "a".repeat(2000);
        let cut = truncate_field(&long);
        assert_eq!(cut.chars().count(), 1001);
        assert!(cut.ends_with('…'));
        assert_eq!(truncate_field("short"), "short");
    }

    #[test]
    fn long_tables_are_truncated() {
        let records = (0..500)
            .map(|i| record(&format!("Player{i:03}"), &i.to_string(), "Warlord"))
            .collect();

        let text = format_registrations(records);
        assert!(text.len() <= DESCRIPTION_LIMIT + 32);
        assert!(text.contains("more"));
    }
}
