use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::application::{AppError, CreateTransactionInput, LedgerService};
use crate::domain::TransactionId;
use crate::io::Exporter;
use crate::storage::StoreError;

use super::view::TransactionView;

/// Error payload. `details`, `hint`, and `code` are populated from the
/// store's diagnostics when the database provides them.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl ErrorBody {
    fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            hint: None,
            code: None,
        }
    }
}

/// Map an application failure to its HTTP representation. Corrupt-store
/// failures are reported generically so internals never leak.
fn error_response(err: AppError) -> Response {
    if err.is_validation() {
        return (StatusCode::BAD_REQUEST, Json(ErrorBody::message(err.to_string())))
            .into_response();
    }
    if err.is_not_found() {
        return (StatusCode::NOT_FOUND, Json(ErrorBody::message(err.to_string())))
            .into_response();
    }

    match err {
        AppError::Store(StoreError::Database {
            message,
            code,
            details,
            hint,
        }) => {
            tracing::error!(error = %message, code = code.as_deref(), "store failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: message,
                    details,
                    hint,
                    code,
                }),
            )
                .into_response()
        }
        AppError::Store(StoreError::Corrupt(detail)) => {
            tracing::error!(error = %detail, "corrupt ledger row");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::message("Terjadi kesalahan internal")),
            )
                .into_response()
        }
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::message(other.to_string())),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct FeedParams {
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct DeleteParams {
    id: Option<String>,
}

pub fn router(service: Arc<LedgerService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/transactions",
            get(list_transactions)
                .post(create_transaction)
                .delete(delete_transaction),
        )
        .route("/transactions/export", get(export_transactions))
        .with_state(service)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_transactions(
    State(service): State<Arc<LedgerService>>,
    Query(params): Query<FeedParams>,
) -> Response {
    match service.list_transactions(params.limit).await {
        Ok(rows) => {
            let feed: Vec<TransactionView> = rows.into_iter().map(TransactionView::from).collect();
            Json(feed).into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn create_transaction(
    State(service): State<Arc<LedgerService>>,
    Json(input): Json<CreateTransactionInput>,
) -> Response {
    match service.record_transaction(&input).await {
        Ok(recorded) => {
            let message = if recorded.duplicate {
                "Transaksi sudah pernah dicatat"
            } else {
                "Transaksi berhasil dicatat"
            };
            Json(json!({
                "success": true,
                "message": message,
                "data": { "id": recorded.id },
            }))
            .into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn delete_transaction(
    State(service): State<Arc<LedgerService>>,
    Query(params): Query<DeleteParams>,
) -> Response {
    let Some(raw_id) = params.id else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::message("Parameter id wajib diisi")),
        )
            .into_response();
    };

    // An id that cannot name an existing transaction is not found.
    let Ok(id) = raw_id.parse::<TransactionId>() else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorBody::message(format!(
                "Transaksi tidak ditemukan: {}",
                raw_id
            ))),
        )
            .into_response();
    };

    match service.delete_transaction(id).await {
        Ok(()) => Json(json!({
            "success": true,
            "message": "Transaksi berhasil dihapus",
        }))
        .into_response(),
        Err(err) => error_response(err),
    }
}

async fn export_transactions(State(service): State<Arc<LedgerService>>) -> Response {
    let exporter = Exporter::new(&service);
    let mut buffer = Vec::new();

    match exporter.export_transactions_csv(&mut buffer).await {
        Ok(count) => {
            tracing::debug!(rows = count, "exported transaction feed");
            (
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"transaksi.csv\"",
                    ),
                ],
                buffer,
            )
                .into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, "csv export failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::message(err.to_string())),
            )
                .into_response()
        }
    }
}
