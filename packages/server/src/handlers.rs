//! HTTP handler functions for the CivicLens API.

use actix_web::{HttpResponse, web};
use civic_lens_assistant::report_lookup;
use civic_lens_database::queries;
use civic_lens_server_models::{
    ApiHealth, ChatRequest, CreateReportRequest, CreateReportResponse, ReportListParams,
    SyncIndexResponse, UpdateStatusRequest,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /api/chat`
///
/// Runs one message through the assistant. Always responds 200 with a
/// response envelope; branch failures are carried inside the envelope.
pub async fn chat(state: web::Data<AppState>, body: web::Json<ChatRequest>) -> HttpResponse {
    let envelope = state
        .assistant
        .process(&body.message, body.location)
        .await;
    HttpResponse::Ok().json(envelope)
}

/// `POST /api/reports/create`
///
/// Stores a new report and indexes it for semantic search. Indexing is
/// best-effort; the report is stored even when the vector index is down.
pub async fn create_report(
    state: web::Data<AppState>,
    body: web::Json<CreateReportRequest>,
) -> HttpResponse {
    let body = body.into_inner();
    let new = queries::NewReport {
        report_id: body.report_id,
        report_type: body.report_type,
        title: body.title,
        description: body.description,
        specific_type: body.specific_type,
        location: body.location,
        latitude: body.latitude,
        longitude: body.longitude,
        is_anonymous: body.is_anonymous,
        reporter_name: body.reporter_name,
        reporter_email: body.reporter_email,
        reporter_phone: body.reporter_phone,
        reporter_user_id: body.reporter_user_id,
        department_id: body.department_id,
        department_name: body.department_name,
    };

    let report_id = match queries::create_report(state.assistant.db(), &new).await {
        Ok(report_id) => report_id,
        Err(e) => {
            log::error!("Failed to create report: {e}");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to create report"
            }));
        }
    };

    let report = match queries::fetch_report(state.assistant.db(), &report_id).await {
        Ok(Some(report)) => report,
        Ok(None) | Err(_) => {
            log::error!("Stored report {report_id} could not be read back");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to create report"
            }));
        }
    };

    if let Err(e) = state.assistant.index_report(&report).await {
        log::warn!("Report {report_id} stored but not indexed: {e}");
    }

    HttpResponse::Ok().json(CreateReportResponse {
        success: true,
        report_id,
        report,
    })
}

/// `GET /api/reports`
///
/// Lists reports, newest first, with optional filters.
pub async fn list_reports(
    state: web::Data<AppState>,
    params: web::Query<ReportListParams>,
) -> HttpResponse {
    let filter = queries::ReportFilter {
        status: params.status,
        report_type: params.report_type,
        reporter_user_id: params.reporter_user_id,
        reporter_email: params.reporter_email.clone(),
        department_name: params.department_name.clone(),
    };

    match queries::list_reports(state.assistant.db(), &filter).await {
        Ok(reports) => HttpResponse::Ok().json(reports),
        Err(e) => {
            log::error!("Failed to list reports: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to list reports"
            }))
        }
    }
}

/// `GET /api/reports/{id}`
///
/// Fetches one report. The identifier match is case-insensitive and
/// hyphen-insensitive.
pub async fn get_report(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let raw_id = path.into_inner();

    match report_lookup::resolve(state.assistant.db(), &raw_id).await {
        Ok(Some(report)) => HttpResponse::Ok().json(report),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Report not found"
        })),
        Err(e) => {
            log::error!("Failed to fetch report {raw_id}: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to fetch report"
            }))
        }
    }
}

/// `PUT /api/reports/{id}`
///
/// Updates a report's lifecycle status.
pub async fn update_report_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateStatusRequest>,
) -> HttpResponse {
    let report_id = path.into_inner();

    match queries::update_report_status(state.assistant.db(), &report_id, body.status).await {
        Ok(true) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "reportId": report_id,
            "status": body.status,
        })),
        Ok(false) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Report not found"
        })),
        Err(e) => {
            log::error!("Failed to update report {report_id}: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to update report status"
            }))
        }
    }
}

/// `POST /api/sync-index`
///
/// Rebuilds the vector index from every stored report.
pub async fn sync_index(state: web::Data<AppState>) -> HttpResponse {
    match state.assistant.sync_index().await {
        Ok(indexed) => HttpResponse::Ok().json(SyncIndexResponse {
            success: true,
            indexed,
        }),
        Err(e) => {
            log::error!("Index sync failed: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to sync index"
            }))
        }
    }
}
