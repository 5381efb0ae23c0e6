use crate::command_router::CommandRouter;

pub struct Data {
    pub router: CommandRouter,
}
pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'c> = poise::Context<'c, Data, Error>;
