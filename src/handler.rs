//! Handler and middleware-chain model.
//!
//! # Responsibilities
//! - Define the callable shape a route endpoint resolves to
//! - Model middleware chains (ordered callables terminated by a handler)
//! - Execute a chain against a request
//!
//! # Design Decisions
//! - Handlers are `Arc`-shared closures over Axum request/response types
//! - A chain element either passes the (possibly modified) request on
//!   (`Step::Next`) or terminates with a response (`Step::Done`)
//! - A chain that falls through past its last element yields 404; the
//!   discovery engine never dispatches requests itself

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;

/// Boxed future used by dynamically dispatched callables.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Outcome of one element of a middleware chain.
pub enum Step {
    /// Continue with the next element, carrying the request forward.
    Next(Request<Body>),
    /// Terminate the chain with a response.
    Done(Response),
}

/// A single callable backing a route.
pub type HandlerFn = Arc<dyn Fn(Request<Body>) -> BoxFuture<Step> + Send + Sync + 'static>;

/// The handler value of a resolved route: one callable or a non-empty chain.
#[derive(Clone)]
pub enum Handler {
    Single(HandlerFn),
    Chain(Vec<HandlerFn>),
}

impl Handler {
    /// True for a chain with no elements. Such a handler is rejected at
    /// resolution time.
    pub fn is_empty(&self) -> bool {
        match self {
            Handler::Single(_) => false,
            Handler::Chain(chain) => chain.is_empty(),
        }
    }

    /// Number of callables in this handler.
    pub fn len(&self) -> usize {
        match self {
            Handler::Single(_) => 1,
            Handler::Chain(chain) => chain.len(),
        }
    }

    /// Run the request through the chain until an element terminates.
    pub async fn execute(&self, request: Request<Body>) -> Response {
        let chain: &[HandlerFn] = match self {
            Handler::Single(f) => std::slice::from_ref(f),
            Handler::Chain(chain) => chain,
        };

        let mut request = request;
        for f in chain {
            match f(request).await {
                Step::Next(next) => request = next,
                Step::Done(response) => return response,
            }
        }

        fallthrough_response()
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Single(_) => write!(f, "Handler::Single"),
            Handler::Chain(chain) => write!(f, "Handler::Chain({})", chain.len()),
        }
    }
}

/// Wrap a plain request → response function as a terminating handler.
pub fn handler_fn<F, Fut>(f: F) -> HandlerFn
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |request| {
        let fut = f(request);
        Box::pin(async move { Step::Done(fut.await) })
    })
}

/// Wrap a function returning a [`Step`] as a chain element.
pub fn middleware_fn<F, Fut>(f: F) -> HandlerFn
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Step> + Send + 'static,
{
    Arc::new(move |request| Box::pin(f(request)))
}

fn fallthrough_response() -> Response {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .body(Body::empty())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_response(body: &'static str) -> Response {
        Response::builder()
            .status(StatusCode::OK)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_single_handler_terminates() {
        let handler = Handler::Single(handler_fn(|_req| async { text_response("ok") }));

        let response = handler.execute(Request::new(Body::empty())).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_chain_runs_in_order_and_forwards_request() {
        let chain = Handler::Chain(vec![
            middleware_fn(|mut req| async move {
                req.headers_mut()
                    .insert("x-seen", "middleware".parse().unwrap());
                Step::Next(req)
            }),
            handler_fn(|req| async move {
                let seen = req
                    .headers()
                    .get("x-seen")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("")
                    .to_string();
                Response::builder()
                    .status(StatusCode::OK)
                    .body(Body::from(seen))
                    .unwrap()
            }),
        ]);

        let response = chain.execute(Request::new(Body::empty())).await;
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&bytes[..], b"middleware");
    }

    #[tokio::test]
    async fn test_chain_short_circuits_on_done() {
        let chain = Handler::Chain(vec![
            middleware_fn(|_req| async { Step::Done(text_response("early")) }),
            handler_fn(|_req| async { text_response("late") }),
        ]);

        let response = chain.execute(Request::new(Body::empty())).await;
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&bytes[..], b"early");
    }

    #[tokio::test]
    async fn test_exhausted_chain_falls_through_to_not_found() {
        let chain = Handler::Chain(vec![middleware_fn(|req| async { Step::Next(req) })]);

        let response = chain.execute(Request::new(Body::empty())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_empty_chain_is_flagged() {
        assert!(Handler::Chain(Vec::new()).is_empty());
        assert!(!Handler::Single(handler_fn(|_req| async { text_response("") })).is_empty());
    }
}
