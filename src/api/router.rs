use crate::AppState;
use crate::api::auth::{AuthGate, AuthPolicy, basic_auth};
use crate::api::handlers::{self, cluster, nodes, reroute};
use crate::api::logging;
use axum::{
    Router,
    http::Method,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

// Gates are route layers: unsupported methods get 405 before any credential check.
pub fn build(state: Arc<AppState>) -> Router {
    let gate = |policy: AuthPolicy| {
        middleware::from_fn_with_state(AuthGate::new(state.credentials.clone(), policy), basic_auth)
    };
    let writes = gate(AuthPolicy::only([Method::POST, Method::DELETE]));
    let always = gate(AuthPolicy::AllMethods);
    let posts = gate(AuthPolicy::only([Method::POST]));

    Router::new()
        .route("/", get(handlers::root))
        .route("/cluster", get(cluster::health).route_layer(writes.clone()))
        .route(
            "/cluster/{indices}",
            get(cluster::indices_health)
                .post(cluster::create_indices)
                .delete(cluster::delete_indices)
                .route_layer(writes.clone()),
        )
        .route(
            "/cluster/{indices}/shards",
            get(cluster::shards_health).route_layer(writes),
        )
        .route("/nodes", get(nodes::info).route_layer(always))
        .route(
            "/allocate/{index}/{shard}/{node}",
            post(reroute::allocate).route_layer(posts.clone()),
        )
        .route(
            "/move/{index}/{shard}/{from_node}/{to_node}",
            post(reroute::move_shard).route_layer(posts),
        )
        .layer(middleware::from_fn(logging::debug_log))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
