// テスト用のプラットフォーム・ストアの代替実装

use crate::data::birthday_store::BirthdayStore;
use crate::models::data::{BirthdayStats, GuildConfig, MemberBirthday};
use crate::models::domain::{BirthDate, ChannelAccess, Invoker, InvokerGuild, NotifyTarget};
use crate::platform::{ChatPlatform, ResolveError};
use chrono::{NaiveDate, NaiveDateTime};
use poise::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

pub fn datetime(raw: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").expect("valid test datetime")
}

/// チャンネルIDはギルドID + "00"、ロールIDはギルドID + "99"
pub fn guild_config(guild_id: &str) -> GuildConfig {
    GuildConfig {
        guild_id: guild_id.to_string(),
        guild_name: Some(format!("guild-{guild_id}")),
        channel_id: format!("{guild_id}00"),
        role_id: format!("{guild_id}99"),
    }
}

pub fn member(user_id: &str, username: &str) -> Invoker {
    Invoker {
        user_id: user_id.to_string(),
        username: username.to_string(),
        guild: Some(InvokerGuild {
            id: "10".to_string(),
            name: Some("guild-10".to_string()),
        }),
        is_admin: false,
    }
}

pub fn admin(user_id: &str) -> Invoker {
    Invoker {
        is_admin: true,
        ..member(user_id, "admin")
    }
}

pub fn direct_message(user_id: &str) -> Invoker {
    Invoker {
        guild: None,
        ..member(user_id, "dm-user")
    }
}

#[derive(Default)]
struct FakeState {
    missing_guilds: HashSet<String>,
    missing_channels: HashSet<String>,
    missing_roles: HashSet<String>,
    failing_users: HashSet<String>,
    failing_lookups: HashSet<String>,
    send_delay: Option<Duration>,
    access: Option<ChannelAccess>,
    sent: Vec<(String, String)>,
}

/// 送信内容を記録するだけのプラットフォーム。既定では全てのギルドが存在する
#[derive(Default)]
pub struct FakePlatform {
    state: Mutex<FakeState>,
}

impl FakePlatform {
    pub fn remove_guild(&self, guild_id: &str) {
        self.state.lock().unwrap().missing_guilds.insert(guild_id.to_string());
    }

    pub fn remove_channel(&self, guild_id: &str) {
        self.state.lock().unwrap().missing_channels.insert(guild_id.to_string());
    }

    pub fn remove_role(&self, guild_id: &str) {
        self.state.lock().unwrap().missing_roles.insert(guild_id.to_string());
    }

    pub fn fail_sends_for(&self, user_id: &str) {
        self.state.lock().unwrap().failing_users.insert(user_id.to_string());
    }

    /// ギルドの存在確認そのものを失敗させる
    pub fn fail_lookups_for(&self, guild_id: &str) {
        self.state.lock().unwrap().failing_lookups.insert(guild_id.to_string());
    }

    /// 送信のたびに待たせる
    pub fn delay_sends(&self, delay: Duration) {
        self.state.lock().unwrap().send_delay = Some(delay);
    }

    pub fn clear_failures(&self) {
        self.state.lock().unwrap().failing_users.clear();
    }

    pub fn set_access(&self, access: ChannelAccess) {
        self.state.lock().unwrap().access = Some(access);
    }

    /// (ギルドID, ユーザーID) の送信履歴
    pub fn sent(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().sent.clone()
    }
}

#[async_trait]
impl ChatPlatform for FakePlatform {
    async fn resolve_target(&self, config: &GuildConfig) -> Result<NotifyTarget, ResolveError> {
        let state = self.state.lock().unwrap();
        if state.missing_guilds.contains(&config.guild_id) {
            return Err(ResolveError::GuildNotFound(config.guild_id.clone()));
        }
        if state.missing_channels.contains(&config.guild_id) {
            return Err(ResolveError::ChannelNotFound(config.channel_id.clone()));
        }
        if state.missing_roles.contains(&config.guild_id) {
            return Err(ResolveError::RoleNotFound(config.role_id.clone()));
        }
        Ok(NotifyTarget {
            guild_id: config.guild_id.clone(),
            guild_name: config.display_name().to_string(),
            channel_id: config.channel_id.clone(),
            channel_name: "birthdays".to_string(),
            role_id: config.role_id.clone(),
        })
    }

    async fn send_birthday(
        &self,
        target: &NotifyTarget,
        member: &MemberBirthday,
    ) -> anyhow::Result<()> {
        let delay = self.state.lock().unwrap().send_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().unwrap();
        if state.failing_users.contains(&member.user_id) {
            anyhow::bail!("send failed for {}", member.user_id);
        }
        state
            .sent
            .push((target.guild_id.clone(), member.user_id.clone()));
        Ok(())
    }

    async fn channel_access(
        &self,
        guild_id: &str,
        _channel_id: &str,
    ) -> Result<ChannelAccess, ResolveError> {
        let state = self.state.lock().unwrap();
        if state.missing_guilds.contains(guild_id) {
            return Err(ResolveError::GuildNotFound(guild_id.to_string()));
        }
        Ok(state.access.unwrap_or(ChannelAccess {
            view_channel: true,
            send_messages: true,
            embed_links: true,
        }))
    }

    async fn is_guild_present(&self, guild_id: &str) -> anyhow::Result<bool> {
        let state = self.state.lock().unwrap();
        if state.failing_lookups.contains(guild_id) {
            anyhow::bail!("lookup failed for {guild_id}");
        }
        Ok(!state.missing_guilds.contains(guild_id))
    }
}

/// 接続できないデータベースの代わり
pub struct FailingStore;

fn unreachable() -> anyhow::Error {
    anyhow::anyhow!("database is unreachable")
}

#[async_trait]
impl BirthdayStore for FailingStore {
    async fn get_member(&self, _user_id: &str) -> anyhow::Result<Option<MemberBirthday>> {
        Err(unreachable())
    }

    async fn upsert_member(
        &self,
        _user_id: &str,
        _username: &str,
        _birth: BirthDate,
        _now: NaiveDateTime,
    ) -> anyhow::Result<()> {
        Err(unreachable())
    }

    async fn delete_member(&self, _user_id: &str) -> anyhow::Result<u64> {
        Err(unreachable())
    }

    async fn members_born_on(&self, _birth: BirthDate) -> anyhow::Result<Vec<MemberBirthday>> {
        Err(unreachable())
    }

    async fn all_members(&self) -> anyhow::Result<Vec<MemberBirthday>> {
        Err(unreachable())
    }

    async fn upsert_guild_config(
        &self,
        _config: &GuildConfig,
        _now: NaiveDateTime,
    ) -> anyhow::Result<()> {
        Err(unreachable())
    }

    async fn get_guild_config(&self, _guild_id: &str) -> anyhow::Result<Option<GuildConfig>> {
        Err(unreachable())
    }

    async fn all_guild_configs(&self) -> anyhow::Result<Vec<GuildConfig>> {
        Err(unreachable())
    }

    async fn append_log(
        &self,
        _user_id: &str,
        _guild_id: &str,
        _sent_at: NaiveDateTime,
    ) -> anyhow::Result<()> {
        Err(unreachable())
    }

    async fn has_been_notified_on(
        &self,
        _user_id: &str,
        _guild_id: &str,
        _date: NaiveDate,
    ) -> anyhow::Result<bool> {
        Err(unreachable())
    }

    async fn stats(&self, _registered_since: NaiveDateTime) -> anyhow::Result<BirthdayStats> {
        Err(unreachable())
    }
}
