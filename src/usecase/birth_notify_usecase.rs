use crate::config::BotClock;
use crate::data::birthday_store::BirthdayStore;
use crate::models::data::{GuildConfig, MemberBirthday};
use crate::models::domain::BirthDate;
use crate::platform::{ChatPlatform, ResolveError};
use chrono::NaiveDateTime;
use std::sync::Arc;
use tokio::sync::Mutex;

/// 1回の誕生日チェックの結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub matched_members: usize,
    pub configured_guilds: usize,
    pub sent: usize,
    pub already_sent: usize,
    pub failed_sends: usize,
    /// ギルド・チャンネル・ロールのいずれかが見つからなかったギルド
    pub unreachable_guilds: Vec<String>,
}

/// 今日が誕生日のメンバーを、設定済みの全ギルドへ通知する
///
/// 定期実行・起動時・管理者による手動実行のすべてがこの処理を通る。
/// 同じ日に同じギルドで同じメンバーへ通知するのは1回だけ。
pub struct BirthNotifyUsecase {
    store: Arc<dyn BirthdayStore>,
    platform: Arc<dyn ChatPlatform>,
    clock: BotClock,
    /// 送信済みの確認からログの記録までを、同時に1つのチェックだけが行う
    sweep_lock: Mutex<()>,
}

impl BirthNotifyUsecase {
    pub fn new(
        store: Arc<dyn BirthdayStore>,
        platform: Arc<dyn ChatPlatform>,
        clock: BotClock,
    ) -> Self {
        BirthNotifyUsecase {
            store,
            platform,
            clock,
            sweep_lock: Mutex::new(()),
        }
    }

    pub async fn invoke(&self) -> anyhow::Result<SweepReport> {
        self.invoke_at(self.clock.now()).await
    }

    /// ストアへのアクセスに失敗した場合はその時点で中断してエラーを返す。
    /// ギルド単位・メンバー単位の失敗はログに残して処理を続ける。
    pub async fn invoke_at(&self, now: NaiveDateTime) -> anyhow::Result<SweepReport> {
        let _guard = self.sweep_lock.lock().await;

        let today = BirthDate::from(now.date());
        tracing::info!(%today, "Checking birthdays");

        let mut report = SweepReport::default();

        let birthdays = self.store.members_born_on(today).await?;
        if birthdays.is_empty() {
            tracing::info!("No birthdays today");
            return Ok(report);
        }
        report.matched_members = birthdays.len();

        let configs = self.store.all_guild_configs().await?;
        report.configured_guilds = configs.len();
        tracing::info!(
            birthdays = birthdays.len(),
            guilds = configs.len(),
            "Birthdays found today"
        );

        for config in &configs {
            self.celebrate_in_guild(config, &birthdays, now, &mut report)
                .await?;
        }

        tracing::info!(
            sent = report.sent,
            already_sent = report.already_sent,
            failed = report.failed_sends,
            unreachable = report.unreachable_guilds.len(),
            "Birthday check finished"
        );
        Ok(report)
    }

    async fn celebrate_in_guild(
        &self,
        config: &GuildConfig,
        birthdays: &[MemberBirthday],
        now: NaiveDateTime,
        report: &mut SweepReport,
    ) -> anyhow::Result<()> {
        tracing::debug!(guild_id = %config.guild_id, guild = config.display_name(), "Processing guild");

        let target = match self.platform.resolve_target(config).await {
            Ok(target) => target,
            Err(err @ ResolveError::Platform(_)) => {
                tracing::error!(guild_id = %config.guild_id, error = %err, "Failed to resolve notification target");
                report.unreachable_guilds.push(config.guild_id.clone());
                return Ok(());
            }
            Err(err) => {
                tracing::warn!(guild_id = %config.guild_id, guild = config.display_name(), "{err}");
                report.unreachable_guilds.push(config.guild_id.clone());
                return Ok(());
            }
        };

        for member in birthdays {
            if self
                .store
                .has_been_notified_on(&member.user_id, &config.guild_id, now.date())
                .await?
            {
                report.already_sent += 1;
                continue;
            }

            if let Err(err) = self.platform.send_birthday(&target, member).await {
                tracing::error!(
                    guild_id = %config.guild_id,
                    user_id = %member.user_id,
                    error = %err,
                    "Failed to send birthday message"
                );
                report.failed_sends += 1;
                continue;
            }

            // 送信済みの通知は必ずログに残す。ここで失敗した場合は処理全体を中断する
            self.store
                .append_log(&member.user_id, &config.guild_id, now)
                .await?;
            report.sent += 1;
            tracing::info!(
                user = %member.username,
                guild = %target.guild_name,
                channel = %target.channel_name,
                "Sent birthday message"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::birthday_database::BirthdayDatabase;
    use crate::test_support::{datetime, guild_config, FailingStore, FakePlatform};

    async fn setup() -> (Arc<BirthdayDatabase>, Arc<FakePlatform>, BirthNotifyUsecase) {
        let store = Arc::new(BirthdayDatabase::connect("sqlite::memory:").await.unwrap());
        let platform = Arc::new(FakePlatform::default());
        let usecase = BirthNotifyUsecase::new(
            store.clone(),
            platform.clone(),
            BotClock::new(chrono_tz::Asia::Tokyo),
        );
        (store, platform, usecase)
    }

    #[tokio::test]
    async fn no_matches_has_no_side_effects() {
        let (store, platform, usecase) = setup().await;
        let now = datetime("2026-04-20 09:00:00");
        store
            .upsert_member("1", "alice", BirthDate { month: 4, day: 21 }, now)
            .await
            .unwrap();
        store.upsert_guild_config(&guild_config("10"), now).await.unwrap();

        let report = usecase.invoke_at(now).await.unwrap();
        assert_eq!(report, SweepReport::default());
        assert!(platform.sent().is_empty());
    }

    #[tokio::test]
    async fn second_run_on_same_day_sends_nothing() {
        let (store, platform, usecase) = setup().await;
        let now = datetime("2026-04-20 09:00:00");
        store
            .upsert_member("1", "alice", BirthDate { month: 4, day: 20 }, now)
            .await
            .unwrap();
        store.upsert_guild_config(&guild_config("10"), now).await.unwrap();

        let first = usecase.invoke_at(now).await.unwrap();
        assert_eq!(first.sent, 1);
        assert_eq!(platform.sent(), vec![("10".to_string(), "1".to_string())]);
        assert!(store
            .has_been_notified_on("1", "10", now.date())
            .await
            .unwrap());

        let later = datetime("2026-04-20 18:30:00");
        let second = usecase.invoke_at(later).await.unwrap();
        assert_eq!(second.sent, 0);
        assert_eq!(second.already_sent, 1);
        assert_eq!(platform.sent().len(), 1);
    }

    #[tokio::test]
    async fn next_year_notifies_again() {
        let (store, platform, usecase) = setup().await;
        let now = datetime("2026-04-20 09:00:00");
        store
            .upsert_member("1", "alice", BirthDate { month: 4, day: 20 }, now)
            .await
            .unwrap();
        store.upsert_guild_config(&guild_config("10"), now).await.unwrap();

        usecase.invoke_at(now).await.unwrap();
        let report = usecase
            .invoke_at(datetime("2027-04-20 09:00:00"))
            .await
            .unwrap();
        assert_eq!(report.sent, 1);
        assert_eq!(platform.sent().len(), 2);
    }

    #[tokio::test]
    async fn every_member_is_notified_in_every_guild() {
        let (store, platform, usecase) = setup().await;
        let now = datetime("2026-12-25 09:00:00");
        for id in ["1", "2"] {
            store
                .upsert_member(id, id, BirthDate { month: 12, day: 25 }, now)
                .await
                .unwrap();
        }
        for guild in ["10", "11"] {
            store.upsert_guild_config(&guild_config(guild), now).await.unwrap();
        }

        let report = usecase.invoke_at(now).await.unwrap();
        assert_eq!(report.matched_members, 2);
        assert_eq!(report.configured_guilds, 2);
        assert_eq!(report.sent, 4);
        let mut sent = platform.sent();
        sent.sort();
        assert_eq!(
            sent,
            vec![
                ("10".to_string(), "1".to_string()),
                ("10".to_string(), "2".to_string()),
                ("11".to_string(), "1".to_string()),
                ("11".to_string(), "2".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn broken_guilds_do_not_stop_the_others() {
        let (store, platform, usecase) = setup().await;
        let now = datetime("2026-04-20 09:00:00");
        store
            .upsert_member("1", "alice", BirthDate { month: 4, day: 20 }, now)
            .await
            .unwrap();
        for guild in ["10", "11", "12", "13"] {
            store.upsert_guild_config(&guild_config(guild), now).await.unwrap();
        }
        platform.remove_channel("11");
        platform.remove_guild("12");
        platform.remove_role("13");

        let report = usecase.invoke_at(now).await.unwrap();
        assert_eq!(report.sent, 1);
        assert_eq!(platform.sent(), vec![("10".to_string(), "1".to_string())]);
        let mut unreachable = report.unreachable_guilds.clone();
        unreachable.sort();
        assert_eq!(unreachable, vec!["11", "12", "13"]);
        assert!(!store
            .has_been_notified_on("1", "11", now.date())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn failed_send_is_not_logged_and_retried_later() {
        let (store, platform, usecase) = setup().await;
        let now = datetime("2026-04-20 09:00:00");
        store
            .upsert_member("1", "alice", BirthDate { month: 4, day: 20 }, now)
            .await
            .unwrap();
        store
            .upsert_member("2", "bob", BirthDate { month: 4, day: 20 }, now)
            .await
            .unwrap();
        store.upsert_guild_config(&guild_config("10"), now).await.unwrap();
        platform.fail_sends_for("1");

        let report = usecase.invoke_at(now).await.unwrap();
        assert_eq!(report.sent, 1);
        assert_eq!(report.failed_sends, 1);
        assert!(!store
            .has_been_notified_on("1", "10", now.date())
            .await
            .unwrap());

        platform.clear_failures();
        let retry = usecase.invoke_at(now).await.unwrap();
        assert_eq!(retry.sent, 1);
        assert_eq!(retry.already_sent, 1);
    }

    #[tokio::test]
    async fn overlapping_runs_notify_only_once() {
        let (store, platform, usecase) = setup().await;
        let now = datetime("2026-04-20 09:00:00");
        store
            .upsert_member("1", "alice", BirthDate { month: 4, day: 20 }, now)
            .await
            .unwrap();
        store.upsert_guild_config(&guild_config("10"), now).await.unwrap();
        platform.delay_sends(std::time::Duration::from_millis(50));

        let (first, second) = tokio::join!(usecase.invoke_at(now), usecase.invoke_at(now));
        let (first, second) = (first.unwrap(), second.unwrap());
        assert_eq!(first.sent + second.sent, 1);
        assert_eq!(first.already_sent + second.already_sent, 1);
        assert_eq!(platform.sent().len(), 1);
        assert!(store
            .has_been_notified_on("1", "10", now.date())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn store_failure_aborts_the_sweep() {
        let platform = Arc::new(FakePlatform::default());
        let usecase = BirthNotifyUsecase::new(
            Arc::new(FailingStore),
            platform.clone(),
            BotClock::new(chrono_tz::Asia::Tokyo),
        );

        let result = usecase.invoke_at(datetime("2026-04-20 09:00:00")).await;
        assert!(result.is_err());
        assert!(platform.sent().is_empty());
    }
}
