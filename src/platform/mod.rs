pub mod serenity_platform;

use crate::models::data::{GuildConfig, MemberBirthday};
use crate::models::domain::{ChannelAccess, NotifyTarget};
use poise::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("guild {0} not found - bot may have been removed from this server")]
    GuildNotFound(String),
    #[error("channel {0} not found - channel may have been deleted")]
    ChannelNotFound(String),
    #[error("role {0} not found - role may have been deleted")]
    RoleNotFound(String),
    #[error(transparent)]
    Platform(#[from] anyhow::Error),
}

/// チャットプラットフォームへの問い合わせと送信
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// 設定されたギルド・チャンネル・ロールが現在も存在するか確認する
    async fn resolve_target(&self, config: &GuildConfig) -> Result<NotifyTarget, ResolveError>;

    /// 誕生日のお祝いメッセージを送信する
    async fn send_birthday(
        &self,
        target: &NotifyTarget,
        member: &MemberBirthday,
    ) -> anyhow::Result<()>;

    /// チャンネルでのボット自身の権限
    async fn channel_access(
        &self,
        guild_id: &str,
        channel_id: &str,
    ) -> Result<ChannelAccess, ResolveError>;

    /// ボットがまだギルドに所属しているか。
    /// 所属していないと判断できない失敗はエラーとして返す
    async fn is_guild_present(&self, guild_id: &str) -> anyhow::Result<bool>;
}
