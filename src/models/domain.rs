use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// 月ごとの最大日数。2月は閏年を考慮して常に29日まで許可する
const DAYS_IN_EACH_MONTH: [u32; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}/\d{1,2}$").expect("date pattern is valid"));

/// 年を持たない誕生日 (月/日)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BirthDate {
    pub month: u32,
    pub day: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    #[error("Please use the correct MM/DD format. For example, April 20th would be 04/20")]
    Format,
    #[error("Please only use numbers.")]
    NotNumeric,
    #[error("Month {month} doesn't have {day} days! Please recheck and try again")]
    DayOutOfRange { month: u32, day: u32 },
    #[error("Invalid date, please try again")]
    Invalid,
}

impl BirthDate {
    /// `M/D` または `MM/DD` 形式の文字列を検証して誕生日に変換する
    ///
    /// 2月29日は年に関係なく常に有効とする。
    pub fn parse(input: &str) -> Result<Self, DateError> {
        let input = input.trim();
        if !DATE_PATTERN.is_match(input) {
            return Err(DateError::Format);
        }

        let (month, day) = input.split_once('/').ok_or(DateError::Format)?;
        let (Ok(month), Ok(day)) = (month.parse::<u32>(), day.parse::<u32>()) else {
            return Err(DateError::NotNumeric);
        };

        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(DateError::Invalid);
        }
        if day > DAYS_IN_EACH_MONTH[(month - 1) as usize] {
            return Err(DateError::DayOutOfRange { month, day });
        }

        Ok(BirthDate { month, day })
    }

    pub fn month_name(month: u32) -> &'static str {
        month
            .checked_sub(1)
            .and_then(|index| MONTH_NAMES.get(index as usize))
            .copied()
            .unwrap_or("???")
    }
}

impl From<NaiveDate> for BirthDate {
    fn from(date: NaiveDate) -> Self {
        BirthDate {
            month: date.month(),
            day: date.day(),
        }
    }
}

impl fmt::Display for BirthDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.month, self.day)
    }
}

/// コマンドを実行したユーザーの情報
#[derive(Debug, Clone)]
pub struct Invoker {
    pub user_id: String,
    pub username: String,
    pub guild: Option<InvokerGuild>,
    pub is_admin: bool,
}

#[derive(Debug, Clone)]
pub struct InvokerGuild {
    pub id: String,
    pub name: Option<String>,
}

/// チャンネル上でボットが持つ権限のうち、通知に必要なもの
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelAccess {
    pub view_channel: bool,
    pub send_messages: bool,
    pub embed_links: bool,
}

/// 通知先として解決済みのギルド・チャンネル・ロール
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyTarget {
    pub guild_id: String,
    pub guild_name: String,
    pub channel_id: String,
    pub channel_name: String,
    pub role_id: String,
}
