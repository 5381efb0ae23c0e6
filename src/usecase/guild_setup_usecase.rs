use crate::config::BotClock;
use crate::data::birthday_store::BirthdayStore;
use crate::models::data::GuildConfig;
use crate::models::domain::Invoker;
use crate::models::reply::{Reply, ReplyEmbed};
use crate::platform::{ChatPlatform, ResolveError};
use crate::res::colors::EMBED_COLOR_SUCCESS;
use std::sync::Arc;

/// ギルドの通知チャンネルとロールを設定する
pub struct GuildSetupUsecase {
    store: Arc<dyn BirthdayStore>,
    platform: Arc<dyn ChatPlatform>,
    clock: BotClock,
    check_time_display: String,
}

impl GuildSetupUsecase {
    pub fn new(
        store: Arc<dyn BirthdayStore>,
        platform: Arc<dyn ChatPlatform>,
        clock: BotClock,
        check_time_display: String,
    ) -> Self {
        GuildSetupUsecase {
            store,
            platform,
            clock,
            check_time_display,
        }
    }

    pub async fn invoke(
        &self,
        invoker: &Invoker,
        channel_id: &str,
        role_id: &str,
    ) -> anyhow::Result<Reply> {
        let guild = invoker.guild.as_ref().ok_or_else(|| {
            let err_msg = "Could not retrieve the Guild ID.";
            tracing::error!(err_msg);
            anyhow::anyhow!(err_msg)
        })?;

        // 通知先のチャンネルでボットが発言できるか確認
        let access = match self.platform.channel_access(&guild.id, channel_id).await {
            Ok(access) => access,
            Err(ResolveError::Platform(err)) => return Err(err),
            Err(err) => {
                tracing::debug!(guild_id = %guild.id, "{err}");
                return Ok(Reply::text("Invalid channel selected. Please try again.").ephemeral());
            }
        };
        if !access.view_channel {
            return Ok(Reply::text(
                "❌ I don't have permission to view that channel. Please give me the \"View Channel\" permission and try again.",
            )
            .ephemeral());
        }
        if !access.send_messages {
            return Ok(Reply::text(
                "❌ I don't have permission to send messages in that channel. Please give me the \"Send Messages\" permission and try again.",
            )
            .ephemeral());
        }
        if !access.embed_links {
            return Ok(Reply::text(
                "❌ I don't have permission to embed links in that channel. Please give me the \"Embed Links\" permission and try again.",
            )
            .ephemeral());
        }

        let config = GuildConfig {
            guild_id: guild.id.clone(),
            guild_name: guild.name.clone(),
            channel_id: channel_id.to_string(),
            role_id: role_id.to_string(),
        };
        self.store
            .upsert_guild_config(&config, self.clock.now())
            .await?;
        tracing::info!(guild_id = %config.guild_id, guild = config.display_name(), "Setup completed");

        Ok(Reply::embed(
            ReplyEmbed::new("Birthday Notifications configured", EMBED_COLOR_SUCCESS)
                .description("Birthday notifications have been configured")
                .field("Birthday Channel", format!("<#{channel_id}>"), true)
                .field("Role", format!("<@&{role_id}>"), true)
                .field("Next Check", self.check_time_display.as_str(), false)
                .footer("Users can now add their birthday with /birthday add")
                .timestamp(),
        ))
    }
}
