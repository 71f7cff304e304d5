//! Axum integration: a [`PayWall`] can be used directly as a `tower` layer.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/resource", get(handler))
//!     .layer(paywall);
//! ```

use std::{
    convert::Infallible,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use axum::{
    extract::Request,
    response::{IntoResponse, Response},
};
use lnwall_core::{client::InvoiceClient, store::ReplayStore};
use tower::{Layer, Service};

use crate::paywall::PayWall;

impl<C, S, Inner> Layer<Inner> for PayWall<C, S>
where
    C: InvoiceClient + Clone,
    S: ReplayStore + Clone,
{
    type Service = PayWallService<C, S, Inner>;

    fn layer(&self, inner: Inner) -> Self::Service {
        PayWallService {
            paywall: Arc::new(self.clone()),
            inner,
        }
    }
}

/// The service produced by layering a [`PayWall`] over an inner service.
pub struct PayWallService<C: InvoiceClient, S: ReplayStore, Inner> {
    paywall: Arc<PayWall<C, S>>,
    inner: Inner,
}

impl<C: InvoiceClient, S: ReplayStore, Inner: Clone> Clone for PayWallService<C, S, Inner> {
    fn clone(&self) -> Self {
        PayWallService {
            paywall: Arc::clone(&self.paywall),
            inner: self.inner.clone(),
        }
    }
}

impl<C, S, Inner> Service<Request> for PayWallService<C, S, Inner>
where
    C: InvoiceClient + 'static,
    S: ReplayStore + 'static,
    Inner: Service<Request, Response = Response, Error = Infallible> + Clone + Send + 'static,
    Inner::Future: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let paywall = Arc::clone(&self.paywall);
        // The clone may not be ready; keep the service `poll_ready` was called on.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let response = paywall
                .handle_payment(request, move |req| async move {
                    match inner.call(req).await {
                        Ok(response) => response,
                        Err(never) => match never {},
                    }
                })
                .await
                .unwrap_or_else(|err| err.into_response());

            Ok(response)
        })
    }
}
