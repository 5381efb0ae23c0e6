use crate::models::reply::{Reply, ReplyEmbed};
use crate::res::colors::EMBED_COLOR_INFO;
use crate::usecase::birth_notify_usecase::BirthNotifyUsecase;
use std::sync::Arc;

/// 管理者による誕生日チェックの手動実行
pub struct BirthCheckUsecase {
    notify_usecase: Arc<BirthNotifyUsecase>,
}

impl BirthCheckUsecase {
    pub fn new(notify_usecase: Arc<BirthNotifyUsecase>) -> Self {
        BirthCheckUsecase { notify_usecase }
    }

    pub async fn invoke(&self) -> anyhow::Result<Reply> {
        let report = self.notify_usecase.invoke().await?;

        let mut embed = ReplyEmbed::new("Checking for birthdays", EMBED_COLOR_INFO)
            .field("Birthdays today", report.matched_members.to_string(), true)
            .field("Messages sent", report.sent.to_string(), true)
            .field("Already sent today", report.already_sent.to_string(), true)
            .timestamp();
        if report.failed_sends > 0 {
            embed = embed.field("Failed to send", report.failed_sends.to_string(), true);
        }
        if !report.unreachable_guilds.is_empty() {
            embed = embed.field(
                "Unreachable servers",
                report.unreachable_guilds.len().to_string(),
                true,
            );
        }
        Ok(Reply::embed(embed))
    }
}
