use crate::models::common::{Context, Error};
use crate::res::colors::EMBED_COLOR_INFO;
use poise::CreateReply;
use serenity::all::{CreateEmbed, Timestamp};

/// Bot says hello to you!
#[poise::command(slash_command)]
pub async fn hello(ctx: Context<'_>) -> Result<(), Error> {
    ctx.send(
        CreateReply::default().embed(
            CreateEmbed::new()
                .title("Hello!")
                .description("I am the bot!")
                .color(EMBED_COLOR_INFO)
                .timestamp(Timestamp::now()),
        ),
    )
    .await?;
    Ok(())
}
