use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Extension,
};
use serde_json::Value;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use tracing::{info, instrument};

use super::{
    descriptions::random_description,
    queries::{Mutation, QueryKey},
    types::{
        AddSwearRequest, CreateJarRequest, JarQuery, SearchQuery, StatsQuery, SwearBody,
        TrendQuery, UpdateJarRequest,
    },
};
use crate::backend::UpstreamRequest;
use crate::proxy::{cached_get, forward, ProxyResponse};
use crate::session::Session;
use crate::shared::{AppError, AppState};
use crate::validation::{ValidJson, ValidQuery};

// Characters that cannot appear raw inside one path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn path_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

/// Backend request behind a cached read
pub fn request_for(key: &QueryKey) -> UpstreamRequest {
    match key {
        QueryKey::Jars => UpstreamRequest::get("/swearjar"),
        QueryKey::Jar(id) => UpstreamRequest::get("/swearjar").query("id", id),
        QueryKey::Stats(id) => UpstreamRequest::get(format!("/swearjar/{}/stats", path_segment(id))),
        QueryKey::Trend(id, period) => {
            UpstreamRequest::get(format!("/swearjar/{}/trend", path_segment(id)))
                .query("period", period.to_string())
        }
    }
}

/// Reads `key` for the caller through the query cache
pub async fn fetch_query(
    state: &AppState,
    headers: &HeaderMap,
    session: &Session,
    key: QueryKey,
) -> Result<ProxyResponse, AppError> {
    cached_get(state, headers, &session.user_id, &key.to_string(), request_for(&key)).await
}

async fn invalidate(state: &AppState, mutation: Mutation) {
    state.query_cache.invalidate(mutation.invalidated_keys()).await;
}

/// GET /api/swearjar[?id=]
#[instrument(name = "get_swear_jars", skip(state, session, headers), fields(user_id = %session.user_id))]
pub async fn get_swear_jars(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    Query(query): Query<JarQuery>,
) -> Result<ProxyResponse, AppError> {
    let key = match query.id.filter(|id| !id.is_empty()) {
        Some(id) => QueryKey::Jar(id),
        None => QueryKey::Jars,
    };

    fetch_query(&state, &headers, &session, key).await
}

/// POST /api/swearjar
#[instrument(name = "create_swear_jar", skip_all, fields(user_id = %session.user_id))]
pub async fn create_swear_jar(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    ValidJson(request): ValidJson<CreateJarRequest>,
) -> Result<ProxyResponse, AppError> {
    let body = request.into_body(&session.user_id);
    info!(owners = body.owners.len(), "Creating swear jar");

    let response = forward(&state, &headers, UpstreamRequest::post("/swearjar").json(&body)?).await?;
    invalidate(&state, Mutation::CreateJar).await;
    Ok(response)
}

/// PUT /api/swearjar
#[instrument(name = "update_swear_jar", skip_all, fields(user_id = %session.user_id))]
pub async fn update_swear_jar(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    ValidJson(body): ValidJson<Value>,
) -> Result<ProxyResponse, AppError> {
    let request = UpdateJarRequest::parse(&body, &session.user_id)?;
    let jar_id = request.swear_jar_id.clone();
    info!(jar_id = %jar_id, "Updating swear jar");

    let body = request.into_body();
    let response = forward(&state, &headers, UpstreamRequest::put("/swearjar").json(&body)?).await?;
    invalidate(&state, Mutation::UpdateJar { jar_id }).await;
    Ok(response)
}

/// GET /api/swearjar/stats?id=
#[instrument(name = "get_swear_jar_stats", skip_all, fields(jar_id = %query.id))]
pub async fn get_swear_jar_stats(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    ValidQuery(query): ValidQuery<StatsQuery>,
) -> Result<ProxyResponse, AppError> {
    fetch_query(&state, &headers, &session, QueryKey::Stats(query.id)).await
}

/// GET /api/swearjar/trend?id=&period=
#[instrument(name = "get_swear_jar_trend", skip_all, fields(jar_id = %query.id, period = %query.period))]
pub async fn get_swear_jar_trend(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    ValidQuery(query): ValidQuery<TrendQuery>,
) -> Result<ProxyResponse, AppError> {
    fetch_query(&state, &headers, &session, QueryKey::Trend(query.id, query.period)).await
}

/// POST /api/swear
#[instrument(name = "add_swear", skip_all, fields(jar_id = %request.swear_jar_id))]
pub async fn add_swear(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    ValidJson(request): ValidJson<AddSwearRequest>,
) -> Result<ProxyResponse, AppError> {
    let body = SwearBody {
        swear_jar_id: request.swear_jar_id.clone(),
        swear_description: random_description().to_string(),
    };
    info!(user_id = %session.user_id, description = %body.swear_description, "Adding swear");

    let response = forward(&state, &headers, UpstreamRequest::post("/swear").json(&body)?).await?;
    invalidate(
        &state,
        Mutation::AddSwear {
            jar_id: request.swear_jar_id,
        },
    )
    .await;
    Ok(response)
}

/// GET /api/search/user?query=
///
/// Only the backend's `results` field is relayed.
#[instrument(name = "search_users", skip(state, headers))]
pub async fn search_users(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Result<ProxyResponse, AppError> {
    let term = query
        .query
        .filter(|term| !term.is_empty())
        .ok_or_else(|| AppError::BadRequest("Query parameter is required".to_string()))?;

    let response = forward(
        &state,
        &headers,
        UpstreamRequest::get("/search/user").query("query", term),
    )
    .await?;

    Ok(response.map_body(|body| body.get("results").cloned().unwrap_or(Value::Null)))
}
