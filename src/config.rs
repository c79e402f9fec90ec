// Runtime configuration, read from the environment (a .env file is loaded
// first if present).

use anyhow::{Context, Result};
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_REGISTRATIONS_PATH: &str = "data/registrations.json";
const DEFAULT_MEMBER_ROLE: &str = "member";

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    /// Register commands in this guild only (instant) instead of globally.
    pub guild_id: Option<u64>,
    pub port: u16,
    pub registrations_path: PathBuf,
    pub member_role_name: String,
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|v| !v.trim().is_empty())
            .context("Missing DISCORD_TOKEN environment variable! Create a .env file with your bot token.")?;

        let guild_id = match lookup("GUILD_ID").filter(|v| !v.trim().is_empty()) {
            Some(raw) => {
                let id: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("GUILD_ID is not a valid id: {raw}"))?;
                if id == 0 {
                    anyhow::bail!("GUILD_ID must not be 0");
                }
                Some(id)
            }
            None => None,
        };

        let port = match lookup("PORT").filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT is not a valid port: {raw}"))?,
            None => DEFAULT_PORT,
        };

        let registrations_path = lookup("REGISTRATIONS_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REGISTRATIONS_PATH));

        let member_role_name = lookup("MEMBER_ROLE_NAME")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MEMBER_ROLE.to_string());

        Ok(Self {
            discord_token,
            guild_id,
            port,
            registrations_path,
            member_role_name,
        })
    }
}
