// Facebook page info endpoint
// POST {facebookUrl, websiteUrl?} -> {success, data | error}

use std::net::SocketAddr;

use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::AppState;
use crate::error::ResolveError;
use crate::models::attempt_log::ResolutionAttemptLog;
use crate::models::page_info::{PageInfo, ResolveMethod};

/// Request body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfoRequest {
    #[serde(default)]
    pub facebook_url: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
}

/// Response envelope
#[derive(Debug, Serialize)]
pub struct PageInfoResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PageInfo>,
    /// Set only for domain fallback results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<ResolveMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageInfoResponse {
    fn ok(info: PageInfo) -> Self {
        let method = (info.method == ResolveMethod::DomainFallback).then_some(info.method);
        Self {
            success: true,
            data: Some(info),
            method,
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            method: None,
            error: Some(message.into()),
        }
    }
}

/// Resolve a page for the creative builder
pub async fn resolve_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    payload: Result<Json<PageInfoRequest>, JsonRejection>,
) -> Response {
    let ip = client_ip(&headers, connect_info.map(|ConnectInfo(addr)| addr));

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            info!("Rejected page info request: {}", rejection.body_text());
            state.audit.record(ResolutionAttemptLog::failure(
                "",
                "Invalid JSON payload",
                None,
                &ip,
            ));
            return (
                StatusCode::BAD_REQUEST,
                Json(PageInfoResponse::err("Invalid JSON payload")),
            )
                .into_response();
        }
    };

    let page_url = request.facebook_url.unwrap_or_default();
    let website_url = request.website_url;

    match state.resolver.resolve(&page_url, website_url.as_deref()).await {
        Ok(resolution) => {
            state.audit.record(ResolutionAttemptLog::success(
                &resolution.info,
                resolution.context,
                &ip,
            ));
            (StatusCode::OK, Json(PageInfoResponse::ok(resolution.info))).into_response()
        }
        Err(e) => {
            error!("Page info error for {:?}: {}", page_url, e);
            let url = if page_url.trim().is_empty() {
                website_url.as_deref().unwrap_or_default()
            } else {
                page_url.as_str()
            };
            state
                .audit
                .record(ResolutionAttemptLog::failure(url, &e.to_string(), None, &ip));

            (status_for(&e), Json(PageInfoResponse::err(e.to_string()))).into_response()
        }
    }
}

/// Any non-POST method on the page info route
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(PageInfoResponse::err("Method not allowed")),
    )
        .into_response()
}

fn status_for(err: &ResolveError) -> StatusCode {
    match err {
        ResolveError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ResolveError::AllStrategiesExhausted(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// First X-Forwarded-For hop, else the socket peer
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}
