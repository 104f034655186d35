use crate::error::GateError;
use crate::throttle::{Decision, StateStore, SubmissionThrottle};
use futures::future::BoxFuture;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower_layer::Layer;
use tower_service::Service;

/// A layer that gates requests through a [`SubmissionThrottle`].
#[derive(Clone, Debug)]
pub struct ThrottleLayer<S> {
    throttle: Arc<SubmissionThrottle<S>>,
}

impl<S> ThrottleLayer<S> {
    /// Create a new throttle layer.
    pub fn new(throttle: SubmissionThrottle<S>) -> Self {
        Self { throttle: Arc::new(throttle) }
    }
}

impl<Svc, S> Layer<Svc> for ThrottleLayer<S>
where
    S: StateStore + 'static,
{
    type Service = ThrottleService<Svc, S>;

    fn layer(&self, service: Svc) -> Self::Service {
        ThrottleService { inner: service, throttle: self.throttle.clone() }
    }
}

/// Middleware service that enforces the submission throttle.
///
/// Denials surface as [`GateError::Throttled`] and state-store failures as
/// [`GateError::Storage`], so the caller can tell "try again later" apart
/// from "something broke".
#[derive(Clone, Debug)]
pub struct ThrottleService<Svc, S> {
    inner: Svc,
    throttle: Arc<SubmissionThrottle<S>>,
}

impl<Svc, S, Req> Service<Req> for ThrottleService<Svc, S>
where
    Svc: Service<Req> + Clone + Send + 'static,
    Svc::Future: Send + 'static,
    Svc::Error: std::error::Error + Send + Sync + 'static,
    S: StateStore + 'static,
    Req: Send + 'static,
{
    type Response = Svc::Response;
    type Error = GateError<Svc::Error>;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(GateError::Inner)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let throttle = self.throttle.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            match throttle.try_consume().await {
                Ok(Decision::Allowed { .. }) => inner.call(req).await.map_err(GateError::Inner),
                Ok(Decision::Denied { retry_after }) => Err(GateError::Throttled { retry_after }),
                Err(e) => Err(GateError::Storage(Box::new(e))),
            }
        })
    }
}
