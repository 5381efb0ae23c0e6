use crate::config::{BotClock, BotConfig};
use crate::data::birthday_store::BirthdayStore;
use crate::models::domain::Invoker;
use crate::models::reply::Reply;
use crate::platform::ChatPlatform;
use crate::usecase::birth_add_usecase::BirthAddUsecase;
use crate::usecase::birth_check_usecase::BirthCheckUsecase;
use crate::usecase::birth_list_usecase::BirthListUsecase;
use crate::usecase::birth_notify_usecase::BirthNotifyUsecase;
use crate::usecase::birth_remove_usecase::BirthRemoveUsecase;
use crate::usecase::birth_show_usecase::BirthShowUsecase;
use crate::usecase::birth_stats_usecase::BirthStatsUsecase;
use crate::usecase::guild_setup_usecase::GuildSetupUsecase;
use std::sync::Arc;

/// `/birthday` のサブコマンドと、その引数
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BirthdayCommand {
    Add { date: String },
    Show,
    Remove,
    List,
    Check,
    Stats,
    Setup { channel_id: String, role_id: String },
}

impl BirthdayCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BirthdayCommand::Add { .. } => "add",
            BirthdayCommand::Show => "show",
            BirthdayCommand::Remove => "remove",
            BirthdayCommand::List => "list",
            BirthdayCommand::Check => "check",
            BirthdayCommand::Stats => "stats",
            BirthdayCommand::Setup { .. } => "setup",
        }
    }

    /// 管理者専用のコマンドはサーバー内でのみ実行できる
    fn is_admin_only(&self) -> bool {
        matches!(
            self,
            BirthdayCommand::List
                | BirthdayCommand::Check
                | BirthdayCommand::Stats
                | BirthdayCommand::Setup { .. }
        )
    }

    fn permission_denied_message(&self) -> &'static str {
        match self {
            BirthdayCommand::Setup { .. } => {
                "You are not an administrator, and thus cannot set this up"
            }
            _ => "You are not an admin",
        }
    }

    fn failure_message(&self) -> &'static str {
        match self {
            BirthdayCommand::Add { .. } => "Something went wrong, try again",
            BirthdayCommand::Show => "We could not retrieve your birthday at the moment",
            BirthdayCommand::Remove => "We had a problem removing your birthday. Try again",
            BirthdayCommand::List => "Something went wrong while getting the list",
            BirthdayCommand::Check => "Something went wrong while checking birthdays, try again",
            BirthdayCommand::Stats => "Something failed while collecting statistics, try again",
            BirthdayCommand::Setup { .. } => "Sorry something went wrong, try again soon",
        }
    }

    /// check は公開の応答待ちを出した後に返信するので、失敗時も公開のまま返す
    fn failure_reply(&self) -> Reply {
        let reply = Reply::text(self.failure_message());
        match self {
            BirthdayCommand::Check => reply,
            _ => reply.ephemeral(),
        }
    }
}

/// サブコマンドを対応するユースケースへ振り分ける
pub struct CommandRouter {
    add: BirthAddUsecase,
    show: BirthShowUsecase,
    remove: BirthRemoveUsecase,
    list: BirthListUsecase,
    check: BirthCheckUsecase,
    stats: BirthStatsUsecase,
    setup: GuildSetupUsecase,
}

impl CommandRouter {
    pub fn new(
        store: Arc<dyn BirthdayStore>,
        platform: Arc<dyn ChatPlatform>,
        notify_usecase: Arc<BirthNotifyUsecase>,
        clock: BotClock,
        config: &BotConfig,
    ) -> Self {
        CommandRouter {
            add: BirthAddUsecase::new(store.clone(), clock),
            show: BirthShowUsecase::new(store.clone()),
            remove: BirthRemoveUsecase::new(store.clone()),
            list: BirthListUsecase::new(store.clone()),
            check: BirthCheckUsecase::new(notify_usecase),
            stats: BirthStatsUsecase::new(store.clone(), platform.clone(), clock),
            setup: GuildSetupUsecase::new(store, platform, clock, config.check_time_display()),
        }
    }

    /// 権限を確認してからユースケースを実行する。
    /// ユースケースが失敗した場合はログに残し、再試行を促す返信に変換する。
    pub async fn dispatch(&self, command: &BirthdayCommand, invoker: &Invoker) -> Reply {
        if command.is_admin_only() {
            if invoker.guild.is_none() {
                return Reply::text("This command can only be used in a server.").ephemeral();
            }
            if !invoker.is_admin {
                tracing::debug!(
                    command = command.name(),
                    user_id = %invoker.user_id,
                    "Permission denied"
                );
                return Reply::text(command.permission_denied_message()).ephemeral();
            }
        }

        let result = match command {
            BirthdayCommand::Add { date } => self.add.invoke(invoker, date).await,
            BirthdayCommand::Show => self.show.invoke(invoker).await,
            BirthdayCommand::Remove => self.remove.invoke(invoker).await,
            BirthdayCommand::List => self.list.invoke().await,
            BirthdayCommand::Check => self.check.invoke().await,
            BirthdayCommand::Stats => self.stats.invoke().await,
            BirthdayCommand::Setup {
                channel_id,
                role_id,
            } => self.setup.invoke(invoker, channel_id, role_id).await,
        };

        result.unwrap_or_else(|err| {
            tracing::error!(
                command = command.name(),
                user_id = %invoker.user_id,
                error = ?err,
                "Command failed"
            );
            command.failure_reply()
        })
    }
}
