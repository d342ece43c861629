//! Login attempt rows -> entities

use stakehub_core::entities::{BlockingCounts, DailyLoginStats};

use crate::models::{BlockingCountsRow, DailyStatsRow};

impl From<BlockingCountsRow> for BlockingCounts {
    fn from(row: BlockingCountsRow) -> Self {
        BlockingCounts {
            email_failures: row.email_failures.unwrap_or(0),
            ip_failures: row.ip_failures.unwrap_or(0),
            last_attempt_at: row.last_attempt_at,
        }
    }
}

impl From<DailyStatsRow> for DailyLoginStats {
    fn from(row: DailyStatsRow) -> Self {
        DailyLoginStats {
            date: row.date,
            total_attempts: row.total_attempts,
            successful_attempts: row.successful_attempts,
            failed_attempts: row.failed_attempts,
            unique_ips: row.unique_ips,
            unique_emails: row.unique_emails,
            success_rate: row.success_rate.unwrap_or(0.0),
        }
    }
}
