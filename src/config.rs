use crate::constants::{DEFAULT_CHECK_TIME, DEFAULT_DATABASE_URL, DEFAULT_TIMEZONE};
use anyhow::Context as _;
use chrono::{DateTime, NaiveDateTime, NaiveTime, SubsecRound, Utc};
use chrono_tz::Tz;
use shuttle_runtime::SecretStore;

/// Secrets.toml から読み込むボットの設定
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    pub database_url: String,
    pub timezone: Tz,
    pub check_time: NaiveTime,
}

impl BotConfig {
    pub fn from_secrets(secrets: &SecretStore) -> anyhow::Result<Self> {
        Self::from_lookup(|key| secrets.get(key))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let discord_token = lookup("DISCORD_TOKEN").context("'DISCORD_TOKEN' was not found")?;

        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let timezone = match lookup("BIRTHDAY_TIMEZONE") {
            Some(raw) => raw
                .trim()
                .parse::<Tz>()
                .map_err(|err| anyhow::anyhow!("invalid BIRTHDAY_TIMEZONE {raw:?}: {err}"))?,
            None => DEFAULT_TIMEZONE,
        };

        let raw_time =
            lookup("BIRTHDAY_CHECK_TIME").unwrap_or_else(|| DEFAULT_CHECK_TIME.to_string());
        let check_time = NaiveTime::parse_from_str(raw_time.trim(), "%H:%M")
            .with_context(|| format!("invalid BIRTHDAY_CHECK_TIME {raw_time:?}, expected HH:MM"))?;

        Ok(BotConfig {
            discord_token,
            database_url,
            timezone,
            check_time,
        })
    }

    pub fn clock(&self) -> BotClock {
        BotClock::new(self.timezone)
    }

    /// ユーザー向けの通知時刻表示
    pub fn check_time_display(&self) -> String {
        format!(
            "Everyday at {} ({})",
            self.check_time.format("%H:%M"),
            self.timezone.name()
        )
    }
}

/// 設定したタイムゾーンでの現在時刻
#[derive(Debug, Clone, Copy)]
pub struct BotClock {
    timezone: Tz,
}

impl BotClock {
    pub fn new(timezone: Tz) -> Self {
        BotClock { timezone }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// タイムゾーン付きの現在時刻。待ち時間の計算に使う
    pub fn now_zoned(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.timezone)
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now_zoned().naive_local().trunc_subsecs(0)
    }
}
