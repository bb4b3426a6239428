use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use np_core::{
    types::validate_rate, Action, Article, AuthorCount, AuthorPayout, Category, DashboardState, FilterPatch,
    Filters, NewsQuery, QueryParams, RateSet, UserRecord,
};
use np_export::ExportFormat;
use np_sources::SourceManager;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Stateless proxy: one upstream search narrowed by author and type.
pub async fn search_news(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryParams>,
) -> ApiResult<Response> {
    let query = NewsQuery::from_params(&params)?;
    let outcome = state.sources.fetch(&query).await;
    let status = if outcome.is_ok() { StatusCode::OK } else { StatusCode::BAD_GATEWAY };
    Ok((status, Json(outcome)).into_response())
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub authenticated: bool,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    pub user: Option<UserRecord>,
}

fn session_view(dashboard: &DashboardState) -> SessionView {
    SessionView {
        authenticated: dashboard.session.is_authenticated(),
        display_name: dashboard.session.display_name().map(str::to_string),
        user: dashboard.session.user.clone(),
    }
}

pub async fn get_session(State(state): State<Arc<AppState>>) -> Json<SessionView> {
    Json(session_view(&*state.dashboard.read().await))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub name: String,
    pub email: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<SessionView>> {
    let Json(request) = payload?;
    let email = request.email.trim();
    if email.is_empty() {
        return Err(ApiError::BadRequest("email is required".to_string()));
    }
    let user = UserRecord {
        name: request.name.trim().to_string(),
        email: email.to_string(),
    };
    np_storage::save_user(state.storage.as_ref(), &user).await?;

    let mut dashboard = state.dashboard.write().await;
    *dashboard = std::mem::take(&mut *dashboard).reduce(Action::LoggedIn(user));
    info!("👤 Logged in as {}", dashboard.session.display_name().unwrap_or_default());
    Ok(Json(session_view(&dashboard)))
}

pub async fn logout(State(state): State<Arc<AppState>>) -> ApiResult<Json<SessionView>> {
    np_storage::clear_user(state.storage.as_ref()).await?;
    let mut dashboard = state.dashboard.write().await;
    *dashboard = std::mem::take(&mut *dashboard).reduce(Action::LoggedOut);
    Ok(Json(session_view(&dashboard)))
}

fn require_login(dashboard: &DashboardState) -> ApiResult<()> {
    if dashboard.session.is_authenticated() {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub user: Option<String>,
    pub filters: Filters,
    pub articles: Vec<Article>,
    pub total_articles: usize,
    pub rates: RateSet,
    pub loading: bool,
    pub error: Option<String>,
}

fn dashboard_view(dashboard: &DashboardState) -> DashboardView {
    DashboardView {
        user: dashboard.session.display_name().map(str::to_string),
        filters: dashboard.filters.clone(),
        articles: dashboard.filtered_articles.clone(),
        total_articles: dashboard.articles.len(),
        rates: dashboard.rates.clone(),
        loading: dashboard.loading,
        error: dashboard.error.clone(),
    }
}

pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> ApiResult<Json<DashboardView>> {
    let dashboard = state.dashboard.read().await;
    require_login(&dashboard)?;
    Ok(Json(dashboard_view(&dashboard)))
}

/// Applies a filter patch and re-queries the source with the merged filters.
pub async fn search_dashboard(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FilterPatch>, JsonRejection>,
) -> ApiResult<Json<DashboardView>> {
    let Json(patch) = payload?;
    let query = {
        let mut dashboard = state.dashboard.write().await;
        require_login(&dashboard)?;
        *dashboard = std::mem::take(&mut *dashboard)
            .reduce(Action::SetFilters(patch))
            .reduce(Action::FetchStarted);
        dashboard.filters.to_query()
    };

    let outcome = state.sources.fetch(&query).await;

    let mut dashboard = state.dashboard.write().await;
    *dashboard = SourceManager::complete(std::mem::take(&mut *dashboard), outcome);
    Ok(Json(dashboard_view(&dashboard)))
}

pub async fn get_payouts(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<AuthorPayout>>> {
    let dashboard = state.dashboard.read().await;
    require_login(&dashboard)?;
    Ok(Json(dashboard.author_payouts()))
}

pub async fn get_author_analytics(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<AuthorCount>>> {
    let dashboard = state.dashboard.read().await;
    require_login(&dashboard)?;
    Ok(Json(dashboard.author_counts()))
}

pub async fn get_rates(State(state): State<Arc<AppState>>) -> ApiResult<Json<RateSet>> {
    let dashboard = state.dashboard.read().await;
    require_login(&dashboard)?;
    Ok(Json(dashboard.rates.clone()))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRateRequest {
    pub rate: f64,
}

pub async fn update_rate(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
    payload: Result<Json<UpdateRateRequest>, JsonRejection>,
) -> ApiResult<Json<RateSet>> {
    // Held across the write so concurrent updates persist in order.
    let mut dashboard = state.dashboard.write().await;
    require_login(&dashboard)?;

    let Json(request) = payload?;
    let category: Category = category.parse()?;
    let rate = validate_rate(request.rate)?;

    let mut rates = dashboard.rates.clone();
    rates.update_rate(category, rate);
    // Live state only changes once the new rates are stored.
    np_storage::save_rates(state.storage.as_ref(), &rates).await?;
    *dashboard = std::mem::take(&mut *dashboard).reduce(Action::SetRates(rates.clone()));
    info!("💵 {} rate set to {}", category, rate);
    Ok(Json(rates))
}

pub async fn export_report(
    State(state): State<Arc<AppState>>,
    Path(format): Path<String>,
) -> ApiResult<Response> {
    let format: ExportFormat = format.parse()?;
    let payouts = {
        let dashboard = state.dashboard.read().await;
        require_login(&dashboard)?;
        dashboard.author_payouts()
    };

    let bytes = np_export::export(format, &payouts)?;
    info!("📤 Exported {} authors as {}", payouts.len(), format);
    let disposition = format!("attachment; filename=\"{}\"", format.file_name());
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
