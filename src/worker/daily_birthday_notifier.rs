use crate::config::BotClock;
use crate::usecase::birth_notify_usecase::BirthNotifyUsecase;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use std::sync::Arc;
use std::time::Duration;

/// 起動時に1回、以降は毎日決まった時刻に誕生日チェックを実行する
pub struct DailyBirthdayNotifier {
    birth_notify_usecase: Arc<BirthNotifyUsecase>,
    clock: BotClock,
    check_time: NaiveTime,
}

impl DailyBirthdayNotifier {
    pub fn new(
        birth_notify_usecase: Arc<BirthNotifyUsecase>,
        clock: BotClock,
        check_time: NaiveTime,
    ) -> Self {
        DailyBirthdayNotifier {
            birth_notify_usecase,
            clock,
            check_time,
        }
    }

    /// 終了しない。チェックの失敗はログに残して次回に任せる
    pub async fn run(self) {
        tracing::info!("Checking for birthdays on startup");
        self.check().await;

        loop {
            let wait = duration_until_next(self.clock.now_zoned(), self.check_time);
            tracing::info!(
                wait_secs = wait.as_secs(),
                check_time = %self.check_time,
                timezone = self.clock.timezone().name(),
                "Next birthday check scheduled"
            );
            tokio::time::sleep(wait).await;

            tracing::info!("Running scheduled birthday check");
            self.check().await;
        }
    }

    async fn check(&self) {
        if let Err(err) = self.birth_notify_usecase.invoke().await {
            tracing::error!(error = ?err, "Birthday check failed");
        }
    }
}

/// `now` から次の `at` までの実時間。ちょうど `at` の場合は翌日
fn duration_until_next(now: DateTime<Tz>, at: NaiveTime) -> Duration {
    let today = now.date_naive();
    let today_at = zoned_at(now.timezone(), today, at);
    let next = match today_at {
        Some(today_at) if now < today_at => today_at,
        // 通知チェックの時刻を過ぎていた場合は、チェック時刻を明日に振替
        _ => today
            .succ_opt()
            .and_then(|tomorrow| zoned_at(now.timezone(), tomorrow, at))
            .unwrap_or(now + chrono::Duration::days(1)),
    };
    (next - now).to_std().unwrap_or(Duration::ZERO)
}

/// その日の `at`。夏時間の切り替えで存在しない時刻は1時間後にずらし、
/// 2回ある時刻は早い方を使う
fn zoned_at(tz: Tz, date: NaiveDate, at: NaiveTime) -> Option<DateTime<Tz>> {
    let local = date.and_time(at);
    tz.from_local_datetime(&local)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(local + chrono::Duration::hours(1))).earliest())
}
