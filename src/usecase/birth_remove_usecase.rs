use crate::data::birthday_store::BirthdayStore;
use crate::models::domain::Invoker;
use crate::models::reply::Reply;
use std::sync::Arc;

pub struct BirthRemoveUsecase {
    store: Arc<dyn BirthdayStore>,
}

impl BirthRemoveUsecase {
    pub fn new(store: Arc<dyn BirthdayStore>) -> Self {
        BirthRemoveUsecase { store }
    }

    pub async fn invoke(&self, invoker: &Invoker) -> anyhow::Result<Reply> {
        let removed = self.store.delete_member(&invoker.user_id).await?;
        if removed > 0 {
            tracing::info!(user_id = %invoker.user_id, "Birthday removed");
            Ok(Reply::text("Your birthday has been removed from the database"))
        } else {
            Ok(Reply::text("Your birthday already is not in the database").ephemeral())
        }
    }
}
