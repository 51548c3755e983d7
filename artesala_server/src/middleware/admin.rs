//! Admin-gate middleware for Actix Web.
//!
//! The server sits behind an auth proxy that authenticates users and forwards the verified email address in the
//! `X-Auth-Email` header. This middleware compares that header against the configured administrator address and
//! rejects everything else, so the `/api` routes are reachable by exactly one account.
//!
//! The comparison is case-insensitive, since mail addresses are.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorForbidden,
    Error,
};
use futures::future::LocalBoxFuture;
use log::{trace, warn};

const AUTH_EMAIL_HEADER: &str = "X-Auth-Email";

pub struct AdminGateMiddlewareFactory {
    admin_email: String,
}

impl AdminGateMiddlewareFactory {
    pub fn new(admin_email: &str) -> Self {
        AdminGateMiddlewareFactory { admin_email: admin_email.trim().to_lowercase() }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AdminGateMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = AdminGateMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminGateMiddlewareService { admin_email: self.admin_email.clone(), service: Rc::new(service) }))
    }
}

pub struct AdminGateMiddlewareService<S> {
    admin_email: String,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AdminGateMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let admin_email = self.admin_email.clone();
        Box::pin(async move {
            trace!("🔐️ Checking admin gate for request");
            if admin_email.is_empty() {
                warn!("🔐️ No admin email is configured. Denying access to the admin surface.");
                return Err(ErrorForbidden("Admin access is not configured."));
            }
            let presented = req
                .headers()
                .get(AUTH_EMAIL_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.trim().to_lowercase())
                .ok_or_else(|| {
                    warn!("🔐️ No authenticated email found in request. Denying access.");
                    ErrorForbidden("No authenticated email found.")
                })?;
            if presented == admin_email {
                trace!("🔐️ Admin gate check for request ✅️");
                service.call(req).await
            } else {
                warn!("🔐️ Authenticated email {presented} is not the administrator. Denying access.");
                Err(ErrorForbidden("Insufficient permissions."))
            }
        })
    }
}
