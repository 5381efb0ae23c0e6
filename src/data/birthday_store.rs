use crate::models::data::{BirthdayStats, GuildConfig, MemberBirthday};
use crate::models::domain::BirthDate;
use chrono::{NaiveDate, NaiveDateTime};
use poise::async_trait;

/// 誕生日・ギルド設定・通知ログの永続化
///
/// 日時はすべてボットのタイムゾーンでのローカル時刻として扱う。
#[async_trait]
pub trait BirthdayStore: Send + Sync {
    async fn get_member(&self, user_id: &str) -> anyhow::Result<Option<MemberBirthday>>;

    /// 既に登録済みの場合は名前と誕生日を置き換える
    async fn upsert_member(
        &self,
        user_id: &str,
        username: &str,
        birth: BirthDate,
        now: NaiveDateTime,
    ) -> anyhow::Result<()>;

    /// 削除した行数を返す (未登録なら0)
    async fn delete_member(&self, user_id: &str) -> anyhow::Result<u64>;

    async fn members_born_on(&self, birth: BirthDate) -> anyhow::Result<Vec<MemberBirthday>>;

    /// (月, 日) の昇順
    async fn all_members(&self) -> anyhow::Result<Vec<MemberBirthday>>;

    async fn upsert_guild_config(
        &self,
        config: &GuildConfig,
        now: NaiveDateTime,
    ) -> anyhow::Result<()>;

    async fn get_guild_config(&self, guild_id: &str) -> anyhow::Result<Option<GuildConfig>>;

    async fn all_guild_configs(&self) -> anyhow::Result<Vec<GuildConfig>>;

    async fn append_log(
        &self,
        user_id: &str,
        guild_id: &str,
        sent_at: NaiveDateTime,
    ) -> anyhow::Result<()>;

    /// `date` の日付で既に通知済みかどうか
    async fn has_been_notified_on(
        &self,
        user_id: &str,
        guild_id: &str,
        date: NaiveDate,
    ) -> anyhow::Result<bool>;

    /// `registered_since` 以降の登録を「最近の登録」として集計する
    async fn stats(&self, registered_since: NaiveDateTime) -> anyhow::Result<BirthdayStats>;
}
