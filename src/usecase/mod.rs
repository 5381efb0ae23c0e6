pub mod birth_add_usecase;
pub mod birth_check_usecase;
pub mod birth_list_usecase;
pub mod birth_notify_usecase;
pub mod birth_remove_usecase;
pub mod birth_show_usecase;
pub mod birth_stats_usecase;
pub mod guild_setup_usecase;
