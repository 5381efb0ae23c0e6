use crate::data::birthday_store::BirthdayStore;
use crate::models::domain::Invoker;
use crate::models::reply::{Reply, ReplyEmbed};
use crate::res::colors::{EMBED_COLOR_INFO, EMBED_COLOR_WARNING};
use std::sync::Arc;

pub struct BirthShowUsecase {
    store: Arc<dyn BirthdayStore>,
}

impl BirthShowUsecase {
    pub fn new(store: Arc<dyn BirthdayStore>) -> Self {
        BirthShowUsecase { store }
    }

    pub async fn invoke(&self, invoker: &Invoker) -> anyhow::Result<Reply> {
        let reply = match self.store.get_member(&invoker.user_id).await? {
            Some(member) => Reply::embed(
                ReplyEmbed::new("Your birthday", EMBED_COLOR_INFO)
                    .description(format!("Your birthday is {}", member.birth_date()))
                    .timestamp(),
            ),
            None => Reply::embed(
                ReplyEmbed::new("No Birthday found", EMBED_COLOR_WARNING)
                    .description("You may have not set your birthday")
                    .field(
                        "How to add your birthday",
                        "Use `/birthday add` followed by your date in MM/DD format",
                        false,
                    ),
            )
            .ephemeral(),
        };
        Ok(reply)
    }
}
