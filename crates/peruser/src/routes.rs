//! The resource exposure layer: five CRUD routes over user records, each
//! behind its guard, plus the optional service descriptor.
//!
//! | Route | Guard | Store call |
//! |---|---|---|
//! | `POST /users` | admin | `create` |
//! | `GET /user/{index}` | self or admin | `read_by_index` |
//! | `GET /users` | admin | `read_all` |
//! | `PUT /user/{index}` | admin | `update_by_index` |
//! | `DELETE /user/{index}` | admin | `delete_by_index` |
//! | `GET /service` | enabled | none |
//!
//! Anything else reaches the pipeline end, which admits `OPTIONS` and
//! denies the rest.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use peruser_core::{NewUser, User, UserIndex, UserUpdate};

use crate::config::ServiceDescriptor;
use crate::error::ApiError;
use crate::guard;
use crate::state::AppState;

const ALLOW_METHODS: &str = "POST, GET, PUT, DELETE";
const ALLOW_HEADERS: &str = "Content-Type, X-API-Key";

/// Build the router. Guards and handlers share the state passed in here and
/// nothing else.
pub fn router(state: AppState) -> Router {
    let gate = state.gate.clone();
    let admin = || middleware::from_fn_with_state(gate.clone(), guard::require_admin);

    let mut router = Router::new()
        .route(
            "/users",
            post(create_user).get(read_users).route_layer(admin()),
        )
        .route(
            "/user/{index}",
            get(read_user).route_layer(middleware::from_fn_with_state(
                gate.clone(),
                guard::require_self_or_admin,
            )),
        )
        .route(
            "/user/{index}",
            put(update_user).delete(delete_user).route_layer(admin()),
        );

    if state.service.is_some() {
        router = router.route(
            "/service",
            get(read_service).route_layer(middleware::from_fn_with_state(
                gate.clone(),
                guard::require_enabled,
            )),
        );
    }

    router
        .fallback(pipeline_end)
        .method_not_allowed_fallback(pipeline_end)
        .layer(middleware::from_fn(cors))
        .with_state(state)
}

/// End of the pipeline for requests no route admitted. Preflight passes,
/// everything else is denied.
async fn pipeline_end(method: Method) -> StatusCode {
    if method == Method::OPTIONS {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::FORBIDDEN
    }
}

/// Permissive cross-origin headers on every response.
async fn cors(req: Request, next: Next) -> Response {
    let mut res = next.run(req).await;
    let headers = res.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    res
}

async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let Json(new) = body?;
    let user = state.store.create(new).await?;
    tracing::info!(index = %user.index, admin = user.admin, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

async fn read_user(
    State(state): State<AppState>,
    Path(index): Path<UserIndex>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.store.read_by_index(&index).await?))
}

async fn read_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.store.read_all().await?))
}

async fn update_user(
    State(state): State<AppState>,
    Path(index): Path<UserIndex>,
    body: Result<Json<UserUpdate>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Json(update) = body?;
    let touches_privileges = update.touches_privileges();
    let user = state.store.update_by_index(&index, update).await?;
    if touches_privileges {
        tracing::info!(
            index = %user.index,
            admin = user.admin,
            enabled = user.enabled,
            "user privileges changed"
        );
    }
    Ok(Json(user))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(index): Path<UserIndex>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_by_index(&index).await?;
    tracing::info!(%index, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn read_service(State(state): State<AppState>) -> Result<Json<ServiceDescriptor>, ApiError> {
    state
        .service
        .as_deref()
        .cloned()
        .map(Json)
        .ok_or(ApiError::NotFound)
}
