use chrono_tz::Tz;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://birthdays.db?mode=rwc";

pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Tokyo;

pub const DEFAULT_CHECK_TIME: &str = "09:00";

/// 統計で「最近の登録」とみなす日数
pub const RECENT_REGISTRATION_DAYS: i64 = 30;
