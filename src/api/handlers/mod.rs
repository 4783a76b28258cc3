pub mod cluster;
pub mod nodes;
pub mod reroute;

pub const GREETING: &str = "Hello from the cluster gateway.";

pub async fn root() -> &'static str {
    GREETING
}

#[cfg(test)]
fn setup_state(
    backend: crate::backend::memory::MemoryBackend,
) -> (
    std::sync::Arc<crate::AppState>,
    std::sync::Arc<crate::backend::memory::MemoryBackend>,
) {
    let backend = std::sync::Arc::new(backend);
    let state = std::sync::Arc::new(crate::AppState {
        backend: backend.clone(),
        credentials: std::sync::Arc::new(crate::api::auth::StaticCredentials::defaults()),
    });
    (state, backend)
}
