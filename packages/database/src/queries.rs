//! Query functions for the reports table.
//!
//! Uses raw parameterized SQL via `query_raw_params()`/`exec_raw_params()`
//! with `ToValue` row mapping. Report identifier lookups are
//! case-insensitive (`COLLATE NOCASE`), with a numeric primary-key fallback
//! for bare-number identifiers.

use civic_lens_models::{ReportRecord, ReportStatus, ReportType};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use crate::DbError;

/// All columns selected for a [`ReportRecord`].
const REPORT_COLUMNS: &str = "id, report_id, type, title, description, specific_type,
           location, latitude, longitude, status, is_anonymous,
           reporter_name, reporter_email, reporter_phone, reporter_user_id,
           department_id, department_name, created_at, updated_at";

/// Input for creating a new report.
#[derive(Debug, Clone)]
pub struct NewReport {
    /// User-facing identifier; generated (UUIDv4, no hyphens) when absent.
    pub report_id: Option<String>,
    /// Emergency vs. non-emergency.
    pub report_type: ReportType,
    /// Short summary.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Finer-grained issue type.
    pub specific_type: String,
    /// Free-text location description.
    pub location: Option<String>,
    /// Latitude, if geotagged.
    pub latitude: Option<f64>,
    /// Longitude, if geotagged.
    pub longitude: Option<f64>,
    /// Whether the reporter withheld identity.
    pub is_anonymous: bool,
    /// Reporter display name.
    pub reporter_name: Option<String>,
    /// Reporter contact email.
    pub reporter_email: Option<String>,
    /// Reporter contact phone.
    pub reporter_phone: Option<String>,
    /// Reporter account id, if signed in.
    pub reporter_user_id: Option<i64>,
    /// Assigned department id.
    pub department_id: Option<i64>,
    /// Assigned department name.
    pub department_name: Option<String>,
}

/// Optional filters for listing reports.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    /// Filter by lifecycle status.
    pub status: Option<ReportStatus>,
    /// Filter by report type.
    pub report_type: Option<ReportType>,
    /// Filter by reporter account id.
    pub reporter_user_id: Option<i64>,
    /// Filter by reporter email.
    pub reporter_email: Option<String>,
    /// Filter by assigned department name.
    pub department_name: Option<String>,
}

/// Inserts a new report and returns its user-facing identifier.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn create_report(db: &dyn Database, report: &NewReport) -> Result<String, DbError> {
    let report_id = report
        .report_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    db.exec_raw_params(
        "INSERT INTO reports (
            id, report_id, type, title, description, specific_type,
            location, latitude, longitude, status, is_anonymous,
            reporter_name, reporter_email, reporter_phone, reporter_user_id,
            department_id, department_name, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $18)",
        &[
            DatabaseValue::String(id),
            DatabaseValue::String(report_id.clone()),
            DatabaseValue::String(report.report_type.as_ref().to_string()),
            DatabaseValue::String(report.title.clone()),
            DatabaseValue::String(report.description.clone()),
            DatabaseValue::String(report.specific_type.clone()),
            report
                .location
                .as_ref()
                .map_or(DatabaseValue::Null, |l| DatabaseValue::String(l.clone())),
            report
                .latitude
                .map_or(DatabaseValue::Null, DatabaseValue::Real64),
            report
                .longitude
                .map_or(DatabaseValue::Null, DatabaseValue::Real64),
            DatabaseValue::String(ReportStatus::Pending.as_ref().to_string()),
            DatabaseValue::Bool(report.is_anonymous),
            report
                .reporter_name
                .as_ref()
                .map_or(DatabaseValue::Null, |v| DatabaseValue::String(v.clone())),
            report
                .reporter_email
                .as_ref()
                .map_or(DatabaseValue::Null, |v| DatabaseValue::String(v.clone())),
            report
                .reporter_phone
                .as_ref()
                .map_or(DatabaseValue::Null, |v| DatabaseValue::String(v.clone())),
            report
                .reporter_user_id
                .map_or(DatabaseValue::Null, DatabaseValue::Int64),
            report
                .department_id
                .map_or(DatabaseValue::Null, DatabaseValue::Int64),
            report
                .department_name
                .as_ref()
                .map_or(DatabaseValue::Null, |v| DatabaseValue::String(v.clone())),
            DatabaseValue::String(now),
        ],
    )
    .await
    .map_err(|e| {
        log::error!("Failed to insert report {report_id}: {e}");
        DbError::Database(e.to_string())
    })?;

    Ok(report_id)
}

/// Fetches a report by its user-facing identifier.
///
/// The textual lookup is case-insensitive. If no row matches and the
/// identifier is purely numeric, the primary key is tried as a fallback.
/// Returns `None` when nothing matches.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn fetch_report(
    db: &dyn Database,
    report_id: &str,
) -> Result<Option<ReportRecord>, DbError> {
    if report_id.is_empty() {
        return Ok(None);
    }

    let sql = format!(
        "SELECT {REPORT_COLUMNS} FROM reports WHERE report_id = $1 COLLATE NOCASE"
    );
    let rows = db
        .query_raw_params(&sql, &[DatabaseValue::String(report_id.to_string())])
        .await
        .map_err(|e| {
            log::error!("Failed to fetch report {report_id}: {e}");
            DbError::Database(e.to_string())
        })?;

    if let Some(row) = rows.first() {
        return Ok(Some(report_from_row(row)?));
    }

    // Bare numbers may be storage primary keys rather than report ids.
    if report_id.chars().all(|c| c.is_ascii_digit()) {
        let sql = format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1");
        let rows = db
            .query_raw_params(&sql, &[DatabaseValue::String(report_id.to_string())])
            .await
            .map_err(|e| DbError::Database(e.to_string()))?;

        if let Some(row) = rows.first() {
            return Ok(Some(report_from_row(row)?));
        }
    }

    Ok(None)
}

/// Fetches a report whose stored identifier matches `no_dash_id` after
/// stripping hyphens, case-insensitively.
///
/// Covers the case where the stored identifier is hyphenated but the
/// queried one is not (or the reverse) — the same logical report must be
/// retrievable either way.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn fetch_report_hyphen_insensitive(
    db: &dyn Database,
    no_dash_id: &str,
) -> Result<Option<ReportRecord>, DbError> {
    if no_dash_id.is_empty() {
        return Ok(None);
    }

    let sql = format!(
        "SELECT {REPORT_COLUMNS} FROM reports
         WHERE REPLACE(report_id, '-', '') = $1 COLLATE NOCASE"
    );
    let rows = db
        .query_raw_params(&sql, &[DatabaseValue::String(no_dash_id.to_string())])
        .await
        .map_err(|e| DbError::Database(e.to_string()))?;

    rows.first().map(report_from_row).transpose()
}

/// Lists reports matching the filter, newest first.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list_reports(
    db: &dyn Database,
    filter: &ReportFilter,
) -> Result<Vec<ReportRecord>, DbError> {
    let mut sql = format!("SELECT {REPORT_COLUMNS} FROM reports");
    let mut conditions: Vec<String> = Vec::new();
    let mut params: Vec<DatabaseValue> = Vec::new();

    if let Some(status) = filter.status {
        params.push(DatabaseValue::String(status.as_ref().to_string()));
        conditions.push(format!("status = ${}", params.len()));
    }

    if let Some(report_type) = filter.report_type {
        params.push(DatabaseValue::String(report_type.as_ref().to_string()));
        conditions.push(format!("type = ${}", params.len()));
    }

    if let Some(user_id) = filter.reporter_user_id {
        params.push(DatabaseValue::Int64(user_id));
        conditions.push(format!("reporter_user_id = ${}", params.len()));
    }

    if let Some(email) = &filter.reporter_email {
        params.push(DatabaseValue::String(email.clone()));
        conditions.push(format!("reporter_email = ${}", params.len()));
    }

    if let Some(department) = &filter.department_name {
        params.push(DatabaseValue::String(department.clone()));
        conditions.push(format!("department_name = ${}", params.len()));
    }

    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }

    sql.push_str(" ORDER BY created_at DESC");

    let rows = db
        .query_raw_params(&sql, &params)
        .await
        .map_err(|e| {
            log::error!("Failed to list reports: {e}");
            DbError::Database(e.to_string())
        })?;

    let mut reports = Vec::with_capacity(rows.len());
    for row in &rows {
        reports.push(report_from_row(row)?);
    }

    Ok(reports)
}

/// Updates a report's lifecycle status by user-facing identifier.
///
/// Returns `false` when no report matched.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn update_report_status(
    db: &dyn Database,
    report_id: &str,
    status: ReportStatus,
) -> Result<bool, DbError> {
    let now = chrono::Utc::now().to_rfc3339();

    let updated = db
        .exec_raw_params(
            "UPDATE reports SET status = $1, updated_at = $2
             WHERE report_id = $3 COLLATE NOCASE",
            &[
                DatabaseValue::String(status.as_ref().to_string()),
                DatabaseValue::String(now),
                DatabaseValue::String(report_id.to_string()),
            ],
        )
        .await
        .map_err(|e| {
            log::error!("Failed to update status for report {report_id}: {e}");
            DbError::Database(e.to_string())
        })?;

    Ok(updated > 0)
}

/// Returns the total number of stored reports.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn count_reports(db: &dyn Database) -> Result<u64, DbError> {
    let rows = db
        .query_raw_params("SELECT COUNT(*) as cnt FROM reports", &[])
        .await
        .map_err(|e| DbError::Database(e.to_string()))?;

    let count: i64 = rows.first().map_or(0, |r| r.to_value("cnt").unwrap_or(0));

    #[allow(clippy::cast_sign_loss)]
    Ok(count as u64)
}

/// Maps a database row to a [`ReportRecord`].
fn report_from_row(row: &switchy_database::Row) -> Result<ReportRecord, DbError> {
    let status_text: String = row.to_value("status").unwrap_or_default();
    let status = status_text
        .parse::<ReportStatus>()
        .unwrap_or(ReportStatus::Pending);

    let type_text: String = row.to_value("type").unwrap_or_default();
    let report_type = type_text
        .parse::<ReportType>()
        .unwrap_or(ReportType::NonEmergency);

    Ok(ReportRecord {
        id: row.to_value("id").unwrap_or_default(),
        report_id: row.to_value("report_id").map_err(|e| DbError::Conversion {
            message: format!("Failed to read report_id: {e}"),
        })?,
        report_type,
        title: row.to_value("title").unwrap_or_default(),
        description: row.to_value("description").unwrap_or_default(),
        specific_type: row.to_value("specific_type").unwrap_or_default(),
        location: row.to_value("location").unwrap_or(None),
        latitude: row.to_value("latitude").unwrap_or(None),
        longitude: row.to_value("longitude").unwrap_or(None),
        status,
        is_anonymous: row.to_value("is_anonymous").unwrap_or(true),
        reporter_name: row.to_value("reporter_name").unwrap_or(None),
        reporter_email: row.to_value("reporter_email").unwrap_or(None),
        reporter_phone: row.to_value("reporter_phone").unwrap_or(None),
        reporter_user_id: row.to_value("reporter_user_id").unwrap_or(None),
        department_id: row.to_value("department_id").unwrap_or(None),
        department_name: row.to_value("department_name").unwrap_or(None),
        created_at: row.to_value("created_at").unwrap_or_default(),
        updated_at: row.to_value("updated_at").unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use crate::open_in_memory;

    use super::*;

    fn new_report(report_id: Option<&str>, title: &str) -> NewReport {
        NewReport {
            report_id: report_id.map(ToString::to_string),
            report_type: ReportType::NonEmergency,
            title: title.to_string(),
            description: "test description".to_string(),
            specific_type: "POTHOLE".to_string(),
            location: Some("Bhimtal".to_string()),
            latitude: Some(29.3938),
            longitude: Some(79.4538),
            is_anonymous: true,
            reporter_name: None,
            reporter_email: None,
            reporter_phone: None,
            reporter_user_id: None,
            department_id: None,
            department_name: None,
        }
    }

    #[tokio::test]
    async fn create_and_fetch_round_trip() {
        let db = open_in_memory().await.unwrap();
        let report_id = create_report(db.as_ref(), &new_report(None, "Pothole"))
            .await
            .unwrap();

        let fetched = fetch_report(db.as_ref(), &report_id).await.unwrap().unwrap();
        assert_eq!(fetched.report_id, report_id);
        assert_eq!(fetched.title, "Pothole");
        assert_eq!(fetched.status, ReportStatus::Pending);
    }

    #[tokio::test]
    async fn fetch_is_case_insensitive() {
        let db = open_in_memory().await.unwrap();
        create_report(db.as_ref(), &new_report(Some("AbCdEf1234567890"), "Pothole"))
            .await
            .unwrap();

        let fetched = fetch_report(db.as_ref(), "ABCDEF1234567890").await.unwrap();
        assert!(fetched.is_some());
    }

    #[tokio::test]
    async fn hyphen_insensitive_fetch_matches_hyphenated_storage() {
        let db = open_in_memory().await.unwrap();
        create_report(
            db.as_ref(),
            &new_report(Some("4d14ffa4-138d-4bd0-8f1a-5c9b2c7d8e9f"), "Leakage"),
        )
        .await
        .unwrap();

        // Plain equality misses across the hyphen difference.
        let direct = fetch_report(db.as_ref(), "4d14ffa4138d4bd08f1a5c9b2c7d8e9f")
            .await
            .unwrap();
        assert!(direct.is_none());

        let fetched =
            fetch_report_hyphen_insensitive(db.as_ref(), "4D14FFA4138D4BD08F1A5C9B2C7D8E9F")
                .await
                .unwrap();
        assert_eq!(fetched.unwrap().title, "Leakage");
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let db = open_in_memory().await.unwrap();
        let first = create_report(db.as_ref(), &new_report(None, "One")).await.unwrap();
        create_report(db.as_ref(), &new_report(None, "Two")).await.unwrap();

        assert!(
            update_report_status(db.as_ref(), &first, ReportStatus::Resolved)
                .await
                .unwrap()
        );

        let resolved = list_reports(
            db.as_ref(),
            &ReportFilter {
                status: Some(ReportStatus::Resolved),
                ..ReportFilter::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].title, "One");

        assert_eq!(count_reports(db.as_ref()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn update_reports_missing_as_false() {
        let db = open_in_memory().await.unwrap();
        let updated = update_report_status(db.as_ref(), "nope", ReportStatus::Dismissed)
            .await
            .unwrap();
        assert!(!updated);
    }
}
