// SQLiteへの接続とマイグレーション、各テーブルへのクエリを担当

use crate::data::birthday_store::BirthdayStore;
use crate::models::data::{BirthdayStats, GuildConfig, MemberBirthday};
use crate::models::domain::BirthDate;
use chrono::{NaiveDate, NaiveDateTime, SubsecRound};
use poise::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;

pub struct BirthdayDatabase {
    pool: Arc<SqlitePool>,
}

impl BirthdayDatabase {
    /// 接続を開き、スキーマを最新にする
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // 書き込みは1本の接続に直列化する
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!(database_url, "Database initialized");
        Ok(BirthdayDatabase {
            pool: Arc::new(pool),
        })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl BirthdayStore for BirthdayDatabase {
    async fn get_member(&self, user_id: &str) -> anyhow::Result<Option<MemberBirthday>> {
        let row = sqlx::query_as::<_, MemberBirthday>(
            r#"
        SELECT user_id, username, month, day, created_at, updated_at
        FROM members
        WHERE user_id = ?
        "#,
        )
        .bind(user_id)
        .fetch_optional(&*self.pool)
        .await?;
        Ok(row)
    }

    async fn upsert_member(
        &self,
        user_id: &str,
        username: &str,
        birth: BirthDate,
        now: NaiveDateTime,
    ) -> anyhow::Result<()> {
        let now = now.trunc_subsecs(0);
        sqlx::query(
            r#"
        INSERT INTO members (user_id, username, month, day, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT (user_id) DO UPDATE
        SET username = excluded.username,
            month = excluded.month,
            day = excluded.day,
            updated_at = excluded.updated_at
        "#,
        )
        .bind(user_id)
        .bind(username)
        .bind(birth.month)
        .bind(birth.day)
        .bind(now)
        .bind(now)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    async fn delete_member(&self, user_id: &str) -> anyhow::Result<u64> {
        let result = sqlx::query(
            r#"
        DELETE FROM members
        WHERE user_id = ?
        "#,
        )
        .bind(user_id)
        .execute(&*self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn members_born_on(&self, birth: BirthDate) -> anyhow::Result<Vec<MemberBirthday>> {
        let rows = sqlx::query_as::<_, MemberBirthday>(
            r#"
        SELECT user_id, username, month, day, created_at, updated_at
        FROM members
        WHERE month = ? AND day = ?
        "#,
        )
        .bind(birth.month)
        .bind(birth.day)
        .fetch_all(&*self.pool)
        .await?;
        Ok(rows)
    }

    async fn all_members(&self) -> anyhow::Result<Vec<MemberBirthday>> {
        let rows = sqlx::query_as::<_, MemberBirthday>(
            r#"
        SELECT user_id, username, month, day, created_at, updated_at
        FROM members
        ORDER BY month, day
        "#,
        )
        .fetch_all(&*self.pool)
        .await?;
        Ok(rows)
    }

    async fn upsert_guild_config(
        &self,
        config: &GuildConfig,
        now: NaiveDateTime,
    ) -> anyhow::Result<()> {
        let now = now.trunc_subsecs(0);
        sqlx::query(
            r#"
        INSERT INTO guild_configs (guild_id, guild_name, channel_id, role_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT (guild_id) DO UPDATE
        SET guild_name = excluded.guild_name,
            channel_id = excluded.channel_id,
            role_id = excluded.role_id,
            updated_at = excluded.updated_at
        "#,
        )
        .bind(&config.guild_id)
        .bind(&config.guild_name)
        .bind(&config.channel_id)
        .bind(&config.role_id)
        .bind(now)
        .bind(now)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    async fn get_guild_config(&self, guild_id: &str) -> anyhow::Result<Option<GuildConfig>> {
        let row = sqlx::query_as::<_, GuildConfig>(
            r#"
        SELECT guild_id, guild_name, channel_id, role_id
        FROM guild_configs
        WHERE guild_id = ?
        "#,
        )
        .bind(guild_id)
        .fetch_optional(&*self.pool)
        .await?;
        Ok(row)
    }

    async fn all_guild_configs(&self) -> anyhow::Result<Vec<GuildConfig>> {
        let rows = sqlx::query_as::<_, GuildConfig>(
            r#"
        SELECT guild_id, guild_name, channel_id, role_id
        FROM guild_configs
        "#,
        )
        .fetch_all(&*self.pool)
        .await?;
        Ok(rows)
    }

    async fn append_log(
        &self,
        user_id: &str,
        guild_id: &str,
        sent_at: NaiveDateTime,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
        INSERT INTO birthday_messages (user_id, guild_id, sent_at)
        VALUES (?, ?, ?)
        "#,
        )
        .bind(user_id)
        .bind(guild_id)
        .bind(sent_at.trunc_subsecs(0))
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    async fn has_been_notified_on(
        &self,
        user_id: &str,
        guild_id: &str,
        date: NaiveDate,
    ) -> anyhow::Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
        SELECT COUNT(*)
        FROM birthday_messages
        WHERE user_id = ? AND guild_id = ? AND DATE(sent_at) = ?
        "#,
        )
        .bind(user_id)
        .bind(guild_id)
        .bind(date.format("%Y-%m-%d").to_string())
        .fetch_one(&*self.pool)
        .await?;
        Ok(count > 0)
    }

    async fn stats(&self, registered_since: NaiveDateTime) -> anyhow::Result<BirthdayStats> {
        let total_members: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members")
            .fetch_one(&*self.pool)
            .await?;

        let configured_guilds: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM guild_configs")
            .fetch_one(&*self.pool)
            .await?;

        let recently_registered: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM members WHERE created_at >= ?")
                .bind(registered_since.trunc_subsecs(0))
                .fetch_one(&*self.pool)
                .await?;

        let popular_months = sqlx::query_as::<_, (u32, i64)>(
            r#"
        SELECT month, COUNT(*) AS count
        FROM members
        GROUP BY month
        ORDER BY count DESC, month ASC
        LIMIT 3
        "#,
        )
        .fetch_all(&*self.pool)
        .await?;

        Ok(BirthdayStats {
            total_members,
            configured_guilds,
            recently_registered,
            popular_months,
        })
    }
}
