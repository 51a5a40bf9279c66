//! Token usage lookups against the provider's usage endpoint.
//!
//! There are two query modes. [`Client::usage_for_range`] asks for a single
//! total over a range. [`Client::daily_usage`] asks once per day and keeps
//! each day's outcome so a chart can show zero for failed days while the
//! failures are still reported.

use std::future::Future;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{client, Client};

/// Path of the usage endpoint.
pub const USAGE_PATH: &str = "usage";

/// Longest range the per-day mode accepts, in days, inclusive. Each day is
/// one request.
pub const MAX_RANGE_DAYS: u64 = 31;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Response body of the usage endpoint. Other fields are ignored.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[cfg_attr(any(feature = "partial-eq", test), derive(PartialEq))]
pub struct UsageSummary {
    /// Total tokens for the queried date or range, when reported.
    #[serde(default)]
    pub total_usage: Option<u64>,
}

/// Invalid date range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// Start is after end.
    #[error("❌ 시작 날짜는 종료 날짜보다 이전이어야 합니다.")]
    Reversed {
        #[allow(missing_docs)]
        start: NaiveDate,
        #[allow(missing_docs)]
        end: NaiveDate,
    },
    /// More days than the per-day mode allows.
    #[error("❌ 조회 기간은 최대 {max}일입니다. ({days}일 요청)")]
    TooLong {
        #[allow(missing_docs)]
        days: u64,
        #[allow(missing_docs)]
        max: u64,
    },
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Range from `start` to `end`, both inclusive.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::Reversed { start, end });
        }

        Ok(Self { start, end })
    }

    /// This range, if it spans at most `max` days.
    pub fn limit(self, max: u64) -> Result<Self, RangeError> {
        let days = self.len() as u64;
        if days > max {
            return Err(RangeError::TooLong { days, max });
        }

        Ok(self)
    }

    /// The `days` days ending on `end`, inclusive of both ends as the form
    /// does (`end - days ..= end`).
    pub fn ending(end: NaiveDate, days: u64) -> Result<Self, RangeError> {
        let start = end.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN);
        Self::new(start, end)
    }

    /// First day.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days, at least 1.
    pub fn len(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    /// Always false; a range has at least one day.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Days in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(self.len())
    }
}

/// One day's fetch outcome.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum DayOutcome {
    /// Tokens reported for the day.
    Ok(u64),
    /// The fetch failed. `0` is shown for the day; this keeps why.
    FetchError(String),
}

/// A day and its [`DayOutcome`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyUsage {
    #[allow(missing_docs)]
    pub date: NaiveDate,
    #[allow(missing_docs)]
    pub outcome: DayOutcome,
}

/// A single day's reported token consumption, for charting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    #[allow(missing_docs)]
    pub date: NaiveDate,
    /// Tokens used. `0` when the fetch failed.
    pub token_count: u64,
}

/// Per-day results over a [`DateRange`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageReport {
    days: Vec<DailyUsage>,
}

impl UsageReport {
    /// Column headers of the table rendering.
    pub const HEADERS: [&'static str; 2] = ["날짜", "총 사용량 (토큰)"];

    /// Per-day outcomes, in date order.
    pub fn days(&self) -> &[DailyUsage] {
        &self.days
    }

    /// One record per day. Failed days count as `0`.
    pub fn records(&self) -> Vec<UsageRecord> {
        self.days
            .iter()
            .map(|d| UsageRecord {
                date: d.date,
                token_count: match d.outcome {
                    DayOutcome::Ok(count) => count,
                    DayOutcome::FetchError(_) => 0,
                },
            })
            .collect()
    }

    /// One message per failed day.
    pub fn warnings(&self) -> Vec<String> {
        self.days
            .iter()
            .filter_map(|d| match &d.outcome {
                DayOutcome::FetchError(detail) => Some(format!(
                    "{} 사용량 조회 오류: {}",
                    d.date.format(DATE_FORMAT),
                    detail
                )),
                DayOutcome::Ok(_) => None,
            })
            .collect()
    }

    /// Sum over the days that succeeded.
    pub fn total(&self) -> u64 {
        self.records().iter().map(|r| r.token_count).sum()
    }
}

impl std::fmt::Display for UsageReport {
    /// Renders a two-column table.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [date_header, count_header] = Self::HEADERS;
        writeln!(f, "{:<10} | {}", date_header, count_header)?;
        writeln!(f, "{:-<10}-+-{:-<16}", "", "")?;
        for record in self.records() {
            writeln!(
                f,
                "{:<10} | {:>16}",
                record.date.format(DATE_FORMAT),
                record.token_count
            )?;
        }
        Ok(())
    }
}

/// Fetch each day of `range` in order, one at a time, and keep every outcome.
/// A day whose total is missing counts as `0`. Ranges longer than
/// [`MAX_RANGE_DAYS`] are refused before anything is fetched.
pub async fn collect_daily<F, Fut>(
    range: DateRange,
    mut fetch: F,
) -> Result<UsageReport, RangeError>
where
    F: FnMut(NaiveDate) -> Fut,
    Fut: Future<Output = client::Result<UsageSummary>>,
{
    let range = range.limit(MAX_RANGE_DAYS)?;
    let mut days = Vec::with_capacity(range.len());

    for date in range.days() {
        let outcome = match fetch(date).await {
            Ok(summary) => DayOutcome::Ok(summary.total_usage.unwrap_or(0)),
            Err(error) => {
                #[cfg(feature = "log")]
                log::warn!("Usage fetch for {} failed: {}", date, error);
                DayOutcome::FetchError(
                    error
                        .service_message()
                        .map(str::to_string)
                        .unwrap_or_else(|| error.to_string()),
                )
            }
        };
        days.push(DailyUsage { date, outcome });
    }

    Ok(UsageReport { days })
}

impl Client {
    async fn usage<Q>(&self, query: &Q) -> client::Result<UsageSummary>
    where
        Q: Serialize + ?Sized,
    {
        let response = self.get(USAGE_PATH, query).await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // The body is kept as is; callers show it verbatim.
            return Err(client::Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Usage for a single day.
    pub async fn usage_for_date(
        &self,
        date: NaiveDate,
    ) -> client::Result<UsageSummary> {
        let date = date.format(DATE_FORMAT).to_string();
        self.usage(&[("date", date)]).await
    }

    /// Total usage over `range` in one request. Any ordered range is
    /// accepted.
    pub async fn usage_for_range(
        &self,
        range: DateRange,
    ) -> client::Result<UsageSummary> {
        let start = range.start.format(DATE_FORMAT).to_string();
        let end = range.end.format(DATE_FORMAT).to_string();
        self.usage(&[("start_date", start), ("end_date", end)]).await
    }

    /// Per-day usage over `range`, one request per day. See
    /// [`collect_daily`].
    pub async fn daily_usage(
        &self,
        range: DateRange,
    ) -> Result<UsageReport, RangeError> {
        collect_daily(range, |date| self.usage_for_date(date)).await
    }
}
