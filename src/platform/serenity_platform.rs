use crate::models::data::{GuildConfig, MemberBirthday};
use crate::models::domain::{ChannelAccess, NotifyTarget};
use crate::platform::{ChatPlatform, ResolveError};
use crate::res::colors::EMBED_COLOR_BIRTHDAY;
use poise::async_trait;
use serenity::all::{
    ChannelId, CreateEmbed, CreateMessage, GuildChannel, GuildId, Http, PartialGuild,
    Permissions, ReactionType, RoleId, Timestamp,
};
use std::collections::HashMap;
use std::sync::Arc;

pub struct SerenityPlatform {
    http: Arc<Http>,
}

impl SerenityPlatform {
    pub fn new(http: Arc<Http>) -> Self {
        SerenityPlatform { http }
    }

    async fn fetch_guild(&self, raw_guild_id: &str) -> Result<PartialGuild, ResolveError> {
        let guild_id = parse_id(raw_guild_id)
            .map(GuildId::new)
            .ok_or_else(|| ResolveError::GuildNotFound(raw_guild_id.to_string()))?;
        self.http.get_guild(guild_id).await.map_err(|err| {
            if is_not_found(&err) {
                ResolveError::GuildNotFound(raw_guild_id.to_string())
            } else {
                ResolveError::Platform(err.into())
            }
        })
    }

    async fn fetch_channel(
        &self,
        guild: &PartialGuild,
        raw_channel_id: &str,
    ) -> Result<GuildChannel, ResolveError> {
        let not_found = || ResolveError::ChannelNotFound(raw_channel_id.to_string());
        let channel_id = parse_id(raw_channel_id)
            .map(ChannelId::new)
            .ok_or_else(not_found)?;
        let mut channels: HashMap<ChannelId, GuildChannel> = guild
            .id
            .channels(&self.http)
            .await
            .map_err(|err| ResolveError::Platform(err.into()))?;
        channels.remove(&channel_id).ok_or_else(not_found)
    }
}

#[async_trait]
impl ChatPlatform for SerenityPlatform {
    async fn resolve_target(&self, config: &GuildConfig) -> Result<NotifyTarget, ResolveError> {
        let guild = self.fetch_guild(&config.guild_id).await?;
        let channel = self.fetch_channel(&guild, &config.channel_id).await?;

        let role_exists = parse_id(&config.role_id)
            .map(RoleId::new)
            .is_some_and(|role_id| guild.roles.contains_key(&role_id));
        if !role_exists {
            return Err(ResolveError::RoleNotFound(config.role_id.clone()));
        }

        Ok(NotifyTarget {
            guild_id: config.guild_id.clone(),
            guild_name: guild.name,
            channel_id: config.channel_id.clone(),
            channel_name: channel.name,
            role_id: config.role_id.clone(),
        })
    }

    async fn send_birthday(
        &self,
        target: &NotifyTarget,
        member: &MemberBirthday,
    ) -> anyhow::Result<()> {
        let http = &self.http;
        let channel_id = parse_id(&target.channel_id)
            .map(ChannelId::new)
            .ok_or_else(|| anyhow::anyhow!("invalid channel id {}", target.channel_id))?;

        let role_mention = format!("<@&{}>", target.role_id);
        let embed = CreateEmbed::new()
            .title("Happy birthday!")
            .description(format!("It is {}'s birthday today!", member.username))
            .field("Birthday", member.birth_date().to_string(), true)
            .field(
                "Celebration",
                format!("{role_mention} Wish them a happy birthday!"),
                true,
            )
            .color(EMBED_COLOR_BIRTHDAY)
            .timestamp(Timestamp::now());

        let msg = channel_id
            .send_message(http, CreateMessage::new().content(role_mention).embed(embed))
            .await?;

        // リアクションの失敗は送信済みの通知には影響させない
        if let Err(err) = msg
            .react(http, ReactionType::Unicode("🎉".to_string()))
            .await
        {
            tracing::warn!(error = %err, channel_id = %channel_id, "Failed to add reaction");
        }
        Ok(())
    }

    async fn channel_access(
        &self,
        guild_id: &str,
        channel_id: &str,
    ) -> Result<ChannelAccess, ResolveError> {
        let guild = self.fetch_guild(guild_id).await?;
        let channel = self.fetch_channel(&guild, channel_id).await?;

        let me = self
            .http
            .get_current_user()
            .await
            .map_err(|err| ResolveError::Platform(err.into()))?;
        let bot_member = guild
            .id
            .member(&self.http, me.id)
            .await
            .map_err(|err| ResolveError::Platform(err.into()))?;
        let permissions = guild.user_permissions_in(&channel, &bot_member);

        Ok(ChannelAccess {
            view_channel: permissions.contains(Permissions::VIEW_CHANNEL),
            send_messages: permissions.contains(Permissions::SEND_MESSAGES),
            embed_links: permissions.contains(Permissions::EMBED_LINKS),
        })
    }

    async fn is_guild_present(&self, guild_id: &str) -> anyhow::Result<bool> {
        match self.fetch_guild(guild_id).await {
            Ok(_) => Ok(true),
            Err(ResolveError::Platform(err)) => {
                tracing::warn!(guild_id, error = %err, "Failed to look up guild");
                Err(err)
            }
            Err(_) => Ok(false),
        }
    }
}

/// Discordのスノーフレーク。0は無効なIDとして扱う
fn parse_id(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|id| *id != 0)
}

/// 削除済み・アクセス不可のリソースに対するAPIエラーかどうか
fn is_not_found(err: &serenity::Error) -> bool {
    match err {
        serenity::Error::Http(http_err) => http_err
            .status_code()
            .is_some_and(|status| matches!(status.as_u16(), 403 | 404)),
        _ => false,
    }
}
