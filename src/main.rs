mod command_router;
mod commands;
mod config;
mod constants;
mod data;
mod models;
mod platform;
mod res;
#[cfg(test)]
mod test_support;
mod usecase;
mod worker;

use crate::command_router::CommandRouter;
use crate::commands::birthday::birthday;
use crate::commands::hello::hello;
use crate::config::BotConfig;
use crate::data::birthday_database::BirthdayDatabase;
use crate::data::birthday_store::BirthdayStore;
use crate::models::common::{Data, Error};
use crate::platform::serenity_platform::SerenityPlatform;
use crate::platform::ChatPlatform;
use crate::usecase::birth_notify_usecase::BirthNotifyUsecase;
use crate::worker::daily_birthday_notifier::DailyBirthdayNotifier;
use poise::CreateReply;
use serenity::all::{Client, GatewayIntents};
use shuttle_runtime::SecretStore;
use std::sync::Arc;

#[shuttle_runtime::main]
async fn main(#[shuttle_runtime::Secrets] secrets: SecretStore) -> shuttle_serenity::ShuttleSerenity {
    let config = BotConfig::from_secrets(&secrets)?;
    let token = config.discord_token.clone();

    tracing::info!("Initializing the database");
    let database = Arc::new(BirthdayDatabase::connect(&config.database_url).await?);

    // Ctrl+C でDB接続を閉じてから終了する。送信中の通知は待たない
    let shutdown_database = Arc::clone(&database);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Database shutting down");
            shutdown_database.close().await;
            std::process::exit(0);
        }
    });

    let intents = GatewayIntents::GUILDS // ギルド情報取得権限
        | GatewayIntents::GUILD_MESSAGES; // ギルド内のメッセージ送信

    // コマンドを作成
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                // コマンドはここに追加
                hello(),
                birthday(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                tracing::info!(user = %ready.user.name, "I am online!");

                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                tracing::info!("Successfully registered commands");

                let store: Arc<dyn BirthdayStore> = database;
                let platform: Arc<dyn ChatPlatform> =
                    Arc::new(SerenityPlatform::new(Arc::clone(&ctx.http)));
                let clock = config.clock();

                let birth_notify_usecase = Arc::new(BirthNotifyUsecase::new(
                    Arc::clone(&store),
                    Arc::clone(&platform),
                    clock,
                ));

                // 起動時のチェックと毎日の定期チェック
                let notifier = DailyBirthdayNotifier::new(
                    Arc::clone(&birth_notify_usecase),
                    clock,
                    config.check_time,
                );
                tokio::spawn(notifier.run());

                let router =
                    CommandRouter::new(store, platform, birth_notify_usecase, clock, &config);
                Ok(Data { router })
            })
        })
        .build();

    let client = Client::builder(&token, intents)
        .framework(framework)
        .await
        .map_err(shuttle_runtime::CustomError::new)?;

    Ok(client.into())
}

/// フレームワーク側で発生したエラーをログに残し、ユーザーには再試行を促す
async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            tracing::error!(error = %error, "Error during bot startup");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!(
                command = %ctx.command().qualified_name,
                error = %error,
                "Unhandled command error"
            );
            let reply = CreateReply::default()
                .content("Something went wrong, try again")
                .ephemeral(true);
            if let Err(err) = ctx.send(reply).await {
                tracing::error!(error = %err, "Failed to send error reply");
            }
        }
        other => {
            if let Err(err) = poise::builtins::on_error(other).await {
                tracing::error!(error = %err, "Error while handling error");
            }
        }
    }
}
