// Bot presence. Discord-layer glue only: we point members at /register so
// the bot's status doubles as the instructions.

use poise::serenity_prelude as serenity;

/// Sets the default "Playing /register" status.
pub fn reset_status(ctx: &serenity::Context) {
    let activity = serenity::ActivityData::playing("/register");
    ctx.set_presence(Some(activity), serenity::OnlineStatus::Online);
}

/// Called once the bot is ready.
pub fn on_ready(ctx: &serenity::Context) {
    reset_status(ctx);
}
