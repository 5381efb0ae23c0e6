use crate::command_router::BirthdayCommand;
use crate::models::common::{Context, Error};
use crate::models::domain::{Invoker, InvokerGuild};
use crate::models::reply::Reply;
use poise::CreateReply;
use serenity::all::{CreateEmbed, CreateEmbedFooter, GuildChannel, Permissions, Role, Timestamp};

/// Manage Birthdays
#[poise::command(
    slash_command,
    subcommands("add", "show", "remove", "list", "check", "stats", "setup"),
    subcommand_required
)]
pub async fn birthday(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Add your birthday
#[poise::command(slash_command)]
pub async fn add(
    ctx: Context<'_>,
    #[description = "Your birthday in MM/DD format, so for April 20th, use 04/20"] date: String,
) -> Result<(), Error> {
    respond(ctx, BirthdayCommand::Add { date }).await
}

/// Show your saved birthday
#[poise::command(slash_command)]
pub async fn show(ctx: Context<'_>) -> Result<(), Error> {
    respond(ctx, BirthdayCommand::Show).await
}

/// Remove your birthday from the list
#[poise::command(slash_command)]
pub async fn remove(ctx: Context<'_>) -> Result<(), Error> {
    respond(ctx, BirthdayCommand::Remove).await
}

/// Check all registered birthdays (ADMIN)
#[poise::command(slash_command)]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    respond(ctx, BirthdayCommand::List).await
}

/// Force check todays birthdays (ADMIN)
#[poise::command(slash_command)]
pub async fn check(ctx: Context<'_>) -> Result<(), Error> {
    respond(ctx, BirthdayCommand::Check).await
}

/// View birthday statistics (ADMIN)
#[poise::command(slash_command)]
pub async fn stats(ctx: Context<'_>) -> Result<(), Error> {
    respond(ctx, BirthdayCommand::Stats).await
}

/// Setup birthday notifications for this server (ADMIN)
#[poise::command(slash_command)]
pub async fn setup(
    ctx: Context<'_>,
    #[description = "Channel where messages will be sent"] channel: GuildChannel,
    #[description = "Role to ping when somebody has a birthday"] role: Role,
) -> Result<(), Error> {
    respond(
        ctx,
        BirthdayCommand::Setup {
            channel_id: channel.id.to_string(),
            role_id: role.id.to_string(),
        },
    )
    .await
}

async fn respond(ctx: Context<'_>, command: BirthdayCommand) -> Result<(), Error> {
    let with_guild_name = matches!(command, BirthdayCommand::Setup { .. });
    let invoker = invoker_from(ctx, with_guild_name).await;

    // 誕生日チェックは応答期限を超えることがあるので先に応答を保留する
    if command == BirthdayCommand::Check && invoker.is_admin && invoker.guild.is_some() {
        ctx.defer().await?;
    }

    let reply = ctx.data().router.dispatch(&command, &invoker).await;
    ctx.send(render(reply)).await?;
    Ok(())
}

/// コマンドの実行者をユースケースに渡す形へ変換する
async fn invoker_from(ctx: Context<'_>, with_guild_name: bool) -> Invoker {
    let author = ctx.author();

    // 管理者 = Administrator または Manage Server 権限を持つメンバー
    let is_admin = match ctx {
        Context::Application(app_ctx) => app_ctx
            .interaction
            .member
            .as_ref()
            .and_then(|member| member.permissions)
            .is_some_and(|permissions| {
                permissions.contains(Permissions::ADMINISTRATOR)
                    || permissions.contains(Permissions::MANAGE_GUILD)
            }),
        Context::Prefix(_) => false,
    };

    let guild = match ctx.guild_id() {
        Some(guild_id) => {
            let name = if with_guild_name {
                ctx.http()
                    .get_guild(guild_id)
                    .await
                    .ok()
                    .map(|guild| guild.name)
            } else {
                None
            };
            Some(InvokerGuild {
                id: guild_id.to_string(),
                name,
            })
        }
        None => None,
    };

    Invoker {
        user_id: author.id.to_string(),
        username: author.name.clone(),
        guild,
        is_admin,
    }
}

fn render(reply: Reply) -> CreateReply {
    let mut create_reply = CreateReply::default().ephemeral(reply.ephemeral);
    if let Some(content) = reply.content {
        create_reply = create_reply.content(content);
    }
    if let Some(embed) = reply.embed {
        let mut create_embed = CreateEmbed::new().title(embed.title).color(embed.color);
        if let Some(description) = embed.description {
            create_embed = create_embed.description(description);
        }
        for field in embed.fields {
            create_embed = create_embed.field(field.name, field.value, field.inline);
        }
        if let Some(footer) = embed.footer {
            create_embed = create_embed.footer(CreateEmbedFooter::new(footer));
        }
        if embed.timestamp {
            create_embed = create_embed.timestamp(Timestamp::now());
        }
        create_reply = create_reply.embed(create_embed);
    }
    create_reply
}
