use axum::{
    body::{Body, Bytes},
    http::{Request, Response, StatusCode},
    middleware::Next,
};
use http_body_util::BodyExt;
use tracing::{Level, debug};

pub async fn debug_log(req: Request<Body>, next: Next) -> Result<Response<Body>, StatusCode> {
    if !tracing::enabled!(Level::DEBUG) {
        return Ok(next.run(req).await);
    }

    let (parts, body) = req.into_parts();
    let bytes = buffer_body(body).await?;
    debug!(
        method = %parts.method,
        path = %parts.uri,
        body = %String::from_utf8_lossy(&bytes),
        "request"
    );

    let req = Request::from_parts(parts, Body::from(bytes));
    let res = next.run(req).await;

    let (parts, body) = res.into_parts();
    let res_bytes = buffer_body(body).await?;
    debug!(
        status = %parts.status,
        body = %String::from_utf8_lossy(&res_bytes),
        "response"
    );

    Ok(Response::from_parts(parts, Body::from(res_bytes)))
}

async fn buffer_body(body: Body) -> Result<Bytes, StatusCode> {
    body.collect()
        .await
        .map(|c| c.to_bytes())
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
