use crate::config::BotClock;
use crate::data::birthday_store::BirthdayStore;
use crate::models::domain::{BirthDate, Invoker};
use crate::models::reply::{Reply, ReplyEmbed};
use crate::res::colors::{EMBED_COLOR_ERROR, EMBED_COLOR_SUCCESS};
use std::sync::Arc;

const DATE_EXAMPLES: &str = "• 12/25 (December 25th)\n• 7/3 (July 3rd)\n• 04/20 (April 20th)";

pub struct BirthAddUsecase {
    store: Arc<dyn BirthdayStore>,
    clock: BotClock,
}

impl BirthAddUsecase {
    pub fn new(store: Arc<dyn BirthdayStore>, clock: BotClock) -> Self {
        BirthAddUsecase { store, clock }
    }

    pub async fn invoke(&self, invoker: &Invoker, date_input: &str) -> anyhow::Result<Reply> {
        let birth = match BirthDate::parse(date_input) {
            Ok(birth) => birth,
            Err(err) => {
                // 入力ミスはエラーログに残さず、そのままユーザーへ返す
                tracing::debug!(input = date_input, reason = %err, "Rejected birthday input");
                return Ok(Reply::embed(
                    ReplyEmbed::new("Date is invalid", EMBED_COLOR_ERROR)
                        .description(err.to_string())
                        .field("Examples", DATE_EXAMPLES, false),
                )
                .ephemeral());
            }
        };

        self.store
            .upsert_member(&invoker.user_id, &invoker.username, birth, self.clock.now())
            .await?;

        Ok(Reply::embed(
            ReplyEmbed::new("Birthday added!", EMBED_COLOR_SUCCESS)
                .description(format!("Your birthday is now saved as {birth}"))
                .footer("Detected format MM/DD")
                .timestamp(),
        ))
    }
}
