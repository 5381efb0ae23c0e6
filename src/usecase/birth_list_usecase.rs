use crate::data::birthday_store::BirthdayStore;
use crate::models::reply::{Reply, ReplyEmbed};
use crate::res::colors::EMBED_COLOR_INFO;
use std::sync::Arc;

pub struct BirthListUsecase {
    store: Arc<dyn BirthdayStore>,
}

impl BirthListUsecase {
    pub fn new(store: Arc<dyn BirthdayStore>) -> Self {
        BirthListUsecase { store }
    }

    pub async fn invoke(&self) -> anyhow::Result<Reply> {
        // ストア側で (月, 日) の昇順に並んでいる
        let members = self.store.all_members().await?;

        if members.is_empty() {
            return Ok(Reply::text("No birthdays detected in DB").ephemeral());
        }

        let birth_list = members
            .iter()
            .map(|member| format!("**{}**: {}", member.username, member.birth_date()))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(Reply::embed(
            ReplyEmbed::new("All registered Birthdays", EMBED_COLOR_INFO)
                .description(birth_list)
                .footer(format!("Total: {} birthdays", members.len()))
                .timestamp(),
        )
        .ephemeral())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::birthday_database::BirthdayDatabase;
    use crate::models::domain::BirthDate;
    use crate::test_support::datetime;

    #[tokio::test]
    async fn lists_in_calendar_order_regardless_of_insertion() {
        let store = Arc::new(BirthdayDatabase::connect("sqlite::memory:").await.unwrap());
        let now = datetime("2026-01-01 00:00:00");
        store
            .upsert_member("1", "carol", BirthDate { month: 11, day: 5 }, now)
            .await
            .unwrap();
        store
            .upsert_member("2", "alice", BirthDate { month: 2, day: 29 }, now)
            .await
            .unwrap();
        store
            .upsert_member("3", "bob", BirthDate { month: 2, day: 3 }, now)
            .await
            .unwrap();

        let reply = BirthListUsecase::new(store).invoke().await.unwrap();
        assert!(reply.ephemeral);
        let embed = reply.embed.unwrap();
        assert_eq!(
            embed.description.as_deref(),
            Some("**bob**: 2/3\n**alice**: 2/29\n**carol**: 11/5")
        );
        assert_eq!(embed.footer.as_deref(), Some("Total: 3 birthdays"));
    }

    #[tokio::test]
    async fn empty_store_is_reported_privately() {
        let store = Arc::new(BirthdayDatabase::connect("sqlite::memory:").await.unwrap());
        let reply = BirthListUsecase::new(store).invoke().await.unwrap();
        assert_eq!(reply, Reply::text("No birthdays detected in DB").ephemeral());
    }
}
