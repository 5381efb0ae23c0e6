use crate::config::BotClock;
use crate::constants::RECENT_REGISTRATION_DAYS;
use crate::data::birthday_store::BirthdayStore;
use crate::models::domain::BirthDate;
use crate::models::reply::{Reply, ReplyEmbed};
use crate::platform::ChatPlatform;
use crate::res::colors::EMBED_COLOR_INFO;
use std::sync::Arc;

pub struct BirthStatsUsecase {
    store: Arc<dyn BirthdayStore>,
    platform: Arc<dyn ChatPlatform>,
    clock: BotClock,
}

impl BirthStatsUsecase {
    pub fn new(
        store: Arc<dyn BirthdayStore>,
        platform: Arc<dyn ChatPlatform>,
        clock: BotClock,
    ) -> Self {
        BirthStatsUsecase {
            store,
            platform,
            clock,
        }
    }

    pub async fn invoke(&self) -> anyhow::Result<Reply> {
        let since = self.clock.now() - chrono::Duration::days(RECENT_REGISTRATION_DAYS);
        let stats = self.store.stats(since).await?;

        let top_months = stats
            .popular_months
            .iter()
            .map(|(month, count)| format!("{}: {}", BirthDate::month_name(*month), count))
            .collect::<Vec<_>>();
        let top_months = if top_months.is_empty() {
            "NO DATA".to_string()
        } else {
            top_months.join("\n")
        };

        // ボットが現在も所属しているかをギルドごとに確認
        let mut server_status = Vec::new();
        for config in self.store.all_guild_configs().await? {
            // 確認できなかったギルドは不在と区別する
            let status = match self.platform.is_guild_present(&config.guild_id).await {
                Ok(true) => "✅",
                Ok(false) => "❌",
                Err(err) => {
                    tracing::warn!(guild_id = %config.guild_id, error = %err, "Could not check guild presence");
                    "❔"
                }
            };
            server_status.push(format!("{status} {}", config.display_name()));
        }
        let server_status = if server_status.is_empty() {
            "No servers configured".to_string()
        } else {
            server_status.join("\n")
        };

        Ok(Reply::embed(
            ReplyEmbed::new("Birthday statistics", EMBED_COLOR_INFO)
                .field("Total users", stats.total_members.to_string(), true)
                .field("Configured servers", stats.configured_guilds.to_string(), true)
                .field("Recently registered", stats.recently_registered.to_string(), true)
                .field("Popular months", top_months, false)
                .field("Server Status (✅ = bot present)", server_status, false)
                .timestamp(),
        )
        .ephemeral())
    }
}
