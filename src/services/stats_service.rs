use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::Result;
use crate::services::enrollment_service::{EnrollmentService, EnrollmentWithDetails};

#[derive(Clone)]
pub struct StatsService {
    pool: PgPool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyStat {
    pub month: String,
    pub revenue: i64,
    pub enrollments: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminStats {
    pub courses: i64,
    pub published_courses: i64,
    pub students: i64,
    pub active_enrollments: i64,
    pub revoked_enrollments: i64,
    pub certificates: i64,
    pub revenue_total: i64,
    pub monthly: Vec<MonthlyStat>,
    pub recent_enrollments: Vec<EnrollmentWithDetails>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicStats {
    pub courses: i64,
    pub students: i64,
    pub certificates: i64,
}

/// The last `n` calendar months as `YYYY-MM` keys, oldest first, ending with
/// the month containing `now`.
pub fn month_keys(now: DateTime<Utc>, n: u32) -> Vec<String> {
    let mut keys = Vec::with_capacity(n as usize);
    let mut year = now.year();
    let mut month = now.month() as i32;

    for _ in 0..n {
        keys.push(format!("{:04}-{:02}", year, month));
        month -= 1;
        if month == 0 {
            month = 12;
            year -= 1;
        }
    }

    keys.reverse();
    keys
}

impl StatsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn public_stats(&self) -> Result<PublicStats> {
        let courses = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM courses WHERE published = TRUE",
        )
        .fetch_one(&self.pool)
        .await?;
        let students =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = 'STUDENT'")
                .fetch_one(&self.pool)
                .await?;
        let certificates = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM certificates")
            .fetch_one(&self.pool)
            .await?;

        Ok(PublicStats {
            courses,
            students,
            certificates,
        })
    }

    pub async fn admin_stats(&self, enrollments: &EnrollmentService) -> Result<AdminStats> {
        let courses = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM courses")
            .fetch_one(&self.pool)
            .await?;
        let published_courses = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM courses WHERE published = TRUE",
        )
        .fetch_one(&self.pool)
        .await?;
        let students =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = 'STUDENT'")
                .fetch_one(&self.pool)
                .await?;
        let active_enrollments = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM enrollments WHERE status = 'ACTIVE'",
        )
        .fetch_one(&self.pool)
        .await?;
        let revoked_enrollments = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM enrollments WHERE status = 'REVOKED'",
        )
        .fetch_one(&self.pool)
        .await?;
        let certificates = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM certificates")
            .fetch_one(&self.pool)
            .await?;
        let revenue_total = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(amount), 0)::BIGINT FROM orders",
        )
        .fetch_one(&self.pool)
        .await?;

        let monthly = self.monthly_series().await?;
        let recent_enrollments = enrollments.recent(10).await?;

        Ok(AdminStats {
            courses,
            published_courses,
            students,
            active_enrollments,
            revoked_enrollments,
            certificates,
            revenue_total,
            monthly,
            recent_enrollments,
        })
    }

    /// Revenue and enrollment counts for the last six calendar months.
    /// Months with no rows appear with zero values.
    async fn monthly_series(&self) -> Result<Vec<MonthlyStat>> {
        let revenue_rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT to_char(created_at, 'YYYY-MM') AS month,
                    COALESCE(SUM(amount), 0)::BIGINT AS revenue
             FROM orders
             WHERE created_at >= date_trunc('month', NOW()) - INTERVAL '5 months'
             GROUP BY 1",
        )
        .fetch_all(&self.pool)
        .await?;

        let enrollment_rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT to_char(created_at, 'YYYY-MM') AS month, COUNT(*) AS enrollments
             FROM enrollments
             WHERE created_at >= date_trunc('month', NOW()) - INTERVAL '5 months'
             GROUP BY 1",
        )
        .fetch_all(&self.pool)
        .await?;

        let series = month_keys(Utc::now(), 6)
            .into_iter()
            .map(|month| {
                let revenue = revenue_rows
                    .iter()
                    .find(|(m, _)| *m == month)
                    .map(|(_, v)| *v)
                    .unwrap_or(0);
                let enrollments = enrollment_rows
                    .iter()
                    .find(|(m, _)| *m == month)
                    .map(|(_, v)| *v)
                    .unwrap_or(0);
                MonthlyStat {
                    month,
                    revenue,
                    enrollments,
                }
            })
            .collect();

        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn six_months_ending_now_oldest_first() {
        let now = Utc.with_ymd_and_hms(2026, 8, 24, 12, 0, 0).unwrap();
        assert_eq!(
            month_keys(now, 6),
            vec!["2026-03", "2026-04", "2026-05", "2026-06", "2026-07", "2026-08"]
        );
    }

    #[test]
    fn series_crosses_year_boundary() {
        let now = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        assert_eq!(
            month_keys(now, 6),
            vec!["2025-09", "2025-10", "2025-11", "2025-12", "2026-01", "2026-02"]
        );
    }
}
