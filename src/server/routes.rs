use std::collections::BTreeMap;

use axum::{
    handler::Handler,
    http::Method,
    middleware,
    routing::{delete, get, patch, post, MethodRouter},
    Router,
};

use crate::server::auth::require_bearer;
use crate::server::catches::{create_catch_handler, delete_catch_handler, update_catch_handler};
use crate::server::handlers::{endpoint_not_found, AppState};
use crate::server::logging::request_logging_middleware;
use crate::server::pokemon::{get_pokemon_handler, list_pokemon_handler};
use crate::server::trainer::{
    create_trainer_handler, delete_trainer_handler, get_trainer_handler, list_trainers_handler,
};
use crate::server::users::{create_user_handler, delete_user_handler, list_users_handler};

/// Who may call a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Requires `Authorization: Bearer <token>`
    Bearer,
}

/// One entry of the route table.
pub struct Route {
    pub method: Method,
    pub path: &'static str,
    pub access: Access,
    endpoint: MethodRouter<AppState>,
}

impl Route {
    fn new(method: Method, path: &'static str, endpoint: MethodRouter<AppState>) -> Self {
        Self {
            method,
            path,
            access: Access::Public,
            endpoint,
        }
    }

    fn get<H, T>(path: &'static str, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        Self::new(Method::GET, path, get(handler))
    }

    fn post<H, T>(path: &'static str, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        Self::new(Method::POST, path, post(handler))
    }

    fn patch<H, T>(path: &'static str, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        Self::new(Method::PATCH, path, patch(handler))
    }

    fn delete<H, T>(path: &'static str, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        Self::new(Method::DELETE, path, delete(handler))
    }

    fn bearer(mut self) -> Self {
        self.access = Access::Bearer;
        self
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("access", &self.access)
            .finish()
    }
}

/// Every endpoint of the API.
///
/// ## Pokemon
/// - `GET /pokemon/:id` - Get a species by number
/// - `GET /pokemon?limit=N` - List species
///
/// ## Trainers
/// - `GET /trainer/:id` - Get a trainer with their caught Pokemon
/// - `GET /trainer?limit=N` - List trainers
/// - `POST /trainer` - Create a trainer
/// - `DELETE /trainer` - Delete a trainer
///
/// ## Catches
/// - `POST /catch` - Record a catch
/// - `PATCH /catch` - Update a catch
/// - `DELETE /catch` - Delete a catch
///
/// ## Users
/// - `GET /user` - List users (bearer)
/// - `POST /user` - Create a user
/// - `DELETE /user/:id` - Delete a user (bearer)
pub fn route_table() -> Vec<Route> {
    vec![
        Route::get("/pokemon/:id", get_pokemon_handler),
        Route::get("/pokemon", list_pokemon_handler),
        Route::get("/trainer/:id", get_trainer_handler),
        Route::get("/trainer", list_trainers_handler),
        Route::post("/trainer", create_trainer_handler),
        Route::delete("/trainer", delete_trainer_handler),
        Route::post("/catch", create_catch_handler),
        Route::patch("/catch", update_catch_handler),
        Route::delete("/catch", delete_catch_handler),
        Route::get("/user", list_users_handler).bearer(),
        Route::post("/user", create_user_handler),
        Route::delete("/user/:id", delete_user_handler).bearer(),
    ]
}

/// Build the application router from [`route_table`].
///
/// Bearer routes get [`require_bearer`] as a route layer. Unknown paths
/// and unsupported methods on known paths both answer with the
/// `endpoint don't exists` 404. Every request passes through the request
/// logging middleware.
pub fn build_router(state: AppState) -> Router {
    let mut paths: BTreeMap<&'static str, MethodRouter<AppState>> = BTreeMap::new();

    for route in route_table() {
        let endpoint = match route.access {
            Access::Public => route.endpoint,
            Access::Bearer => route.endpoint.route_layer(middleware::from_fn_with_state(
                state.auth.clone(),
                require_bearer,
            )),
        };

        let merged = match paths.remove(route.path) {
            Some(existing) => existing.merge(endpoint),
            None => endpoint,
        };
        paths.insert(route.path, merged);
    }

    let router = paths
        .into_iter()
        .fold(Router::new(), |router, (path, endpoint)| {
            router.route(path, endpoint.fallback(endpoint_not_found))
        });

    router
        .fallback(endpoint_not_found)
        .layer(middleware::from_fn(request_logging_middleware))
        .with_state(state)
}
