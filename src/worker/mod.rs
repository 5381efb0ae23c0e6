pub mod daily_birthday_notifier;
