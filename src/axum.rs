//! Axum integration utilities.
//!
//! Middleware gating is advisory UI-level plumbing over the same compiled
//! snapshots; the authoritative check for any action belongs next to the
//! action handler itself.

use std::future::poll_fn;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use crate::cache::SnapshotCache;
use crate::permission::Permission;
use crate::session::Loader;
use crate::store::SnapshotStore;
use crate::types::{OrganizationId, SubjectId};

use ::axum::body::Body;
use ::axum::http::{Request, StatusCode};
use ::axum::response::{IntoResponse, Response};
use ::tower::{Layer, Service};
use tracing::debug;

/// Authentication context extracted from a request.
///
/// The application's auth stack is expected to insert this into request
/// extensions before any gating layer runs.
#[derive(Debug, Clone)]
pub struct AccessContext {
    /// Organization the request operates on.
    pub organization: OrganizationId,
    /// Authenticated subject.
    pub subject: SubjectId,
}

impl AccessContext {
    /// Creates a new access context.
    pub fn new(organization: OrganizationId, subject: SubjectId) -> Self {
        Self {
            organization,
            subject,
        }
    }
}

/// Middleware layer that gates a request on a permission slug.
#[derive(Debug, Clone)]
pub struct RequirePermissionLayer<S, C> {
    loader: Arc<Loader<S, C>>,
    permission: Permission,
}

impl<S, C> RequirePermissionLayer<S, C> {
    /// Creates a new permission-gating layer.
    pub fn new(loader: Arc<Loader<S, C>>, permission: Permission) -> Self {
        Self { loader, permission }
    }
}

impl<S, C, Inner> Layer<Inner> for RequirePermissionLayer<S, C>
where
    S: SnapshotStore,
    C: SnapshotCache,
{
    type Service = RequirePermissionService<Inner, S, C>;

    fn layer(&self, inner: Inner) -> Self::Service {
        RequirePermissionService {
            inner,
            loader: self.loader.clone(),
            permission: self.permission.clone(),
        }
    }
}

/// Middleware service that enforces a permission check.
#[derive(Debug, Clone)]
pub struct RequirePermissionService<Inner, S, C> {
    inner: Inner,
    loader: Arc<Loader<S, C>>,
    permission: Permission,
}

impl<Inner, S, C> Service<Request<Body>> for RequirePermissionService<Inner, S, C>
where
    Inner: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    Inner::Future: Send + 'static,
    S: SnapshotStore + 'static,
    C: SnapshotCache + 'static,
{
    type Response = Response;
    type Error = Inner::Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let mut inner = self.inner.clone();
        let loader = self.loader.clone();
        let permission = self.permission.clone();

        Box::pin(async move {
            let context = req.extensions().get::<AccessContext>().cloned();
            let Some(context) = context else {
                return Ok((StatusCode::UNAUTHORIZED, "missing access context").into_response());
            };

            match loader
                .load_permissions(&context.organization, &context.subject)
                .await
            {
                Ok(evaluator) if evaluator.can(&permission) => {
                    poll_fn(|cx| inner.poll_ready(cx)).await?;
                    inner.call(req).await
                }
                Ok(_) => {
                    debug!(
                        organization = %context.organization,
                        subject = %context.subject,
                        permission = %permission,
                        "permission denied"
                    );
                    Ok((StatusCode::FORBIDDEN, "forbidden").into_response())
                }
                Err(_) => {
                    Ok((StatusCode::INTERNAL_SERVER_ERROR, "snapshot load error").into_response())
                }
            }
        })
    }
}

/// Middleware layer that gates a request on an enabled module.
#[derive(Debug, Clone)]
pub struct RequireModuleLayer<S, C> {
    loader: Arc<Loader<S, C>>,
    module: String,
}

impl<S, C> RequireModuleLayer<S, C> {
    /// Creates a new module-gating layer.
    pub fn new(loader: Arc<Loader<S, C>>, module: impl Into<String>) -> Self {
        Self {
            loader,
            module: module.into(),
        }
    }
}

impl<S, C, Inner> Layer<Inner> for RequireModuleLayer<S, C>
where
    S: SnapshotStore,
    C: SnapshotCache,
{
    type Service = RequireModuleService<Inner, S, C>;

    fn layer(&self, inner: Inner) -> Self::Service {
        RequireModuleService {
            inner,
            loader: self.loader.clone(),
            module: self.module.clone(),
        }
    }
}

/// Middleware service that enforces a module entitlement check.
#[derive(Debug, Clone)]
pub struct RequireModuleService<Inner, S, C> {
    inner: Inner,
    loader: Arc<Loader<S, C>>,
    module: String,
}

impl<Inner, S, C> Service<Request<Body>> for RequireModuleService<Inner, S, C>
where
    Inner: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    Inner::Future: Send + 'static,
    S: SnapshotStore + 'static,
    C: SnapshotCache + 'static,
{
    type Response = Response;
    type Error = Inner::Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let mut inner = self.inner.clone();
        let loader = self.loader.clone();
        let module = self.module.clone();

        Box::pin(async move {
            let context = req.extensions().get::<AccessContext>().cloned();
            let Some(context) = context else {
                return Ok((StatusCode::UNAUTHORIZED, "missing access context").into_response());
            };

            match loader.load_entitlements(&context.organization).await {
                Ok(evaluator) if evaluator.has_module(&module) => {
                    poll_fn(|cx| inner.poll_ready(cx)).await?;
                    inner.call(req).await
                }
                Ok(_) => {
                    debug!(
                        organization = %context.organization,
                        module = %module,
                        "module not enabled"
                    );
                    Ok((StatusCode::FORBIDDEN, "module not enabled").into_response())
                }
                Err(_) => {
                    Ok((StatusCode::INTERNAL_SERVER_ERROR, "snapshot load error").into_response())
                }
            }
        })
    }
}
