pub mod auth;
pub mod handlers;
pub mod logging;
pub mod responses;
pub mod router;
