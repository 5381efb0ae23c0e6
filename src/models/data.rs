use crate::models::domain::BirthDate;
use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct MemberBirthday {
    pub user_id: String,
    pub username: String,
    pub month: u32,
    pub day: u32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl MemberBirthday {
    pub fn birth_date(&self) -> BirthDate {
        BirthDate {
            month: self.month,
            day: self.day,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct GuildConfig {
    pub guild_id: String,
    pub guild_name: Option<String>,
    pub channel_id: String,
    pub role_id: String,
}

impl GuildConfig {
    /// ログ出力用のギルド名
    pub fn display_name(&self) -> &str {
        self.guild_name.as_deref().unwrap_or("(unknown)")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BirthdayStats {
    pub total_members: i64,
    pub configured_guilds: i64,
    pub recently_registered: i64,
    /// (月, 登録人数) 人数の多い順に最大3件
    pub popular_months: Vec<(u32, i64)>,
}
