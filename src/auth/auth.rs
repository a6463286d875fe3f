use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, error::ErrorUnauthorized, web::Data};
use futures::future::{Ready, ready};
use serde_json::json;

use crate::access::{self, AccessRule, Actor, Decision, DenyReason};
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::model::role::Role;
use crate::models::Claims;

/// Authenticated identity extracted from the bearer token. The embedded
/// [`Actor`] is what the access evaluator consumes.
#[derive(Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub email: String,
    pub actor: Actor,
}

impl AuthUser {
    /// Build from verified claims. Unknown permission tags in the token are
    /// dropped; only the closed tag set participates in evaluation.
    pub fn from_claims(claims: &Claims) -> Result<Self, String> {
        let role: Role = claims
            .role
            .parse()
            .map_err(|_| format!("unknown role `{}`", claims.role))?;

        Ok(AuthUser {
            user_id: claims.user_id,
            email: claims.sub.clone(),
            actor: Actor {
                role,
                permissions: claims
                    .permissions
                    .iter()
                    .filter_map(|p| p.parse().ok())
                    .collect(),
                employee_id: claims.employee_id,
            },
        })
    }

    /// Gate an operation on its rule; 403 with a machine-readable reason
    /// code on denial.
    pub fn require(&self, rule: &AccessRule) -> actix_web::Result<()> {
        match access::evaluate(&self.actor, rule) {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(deny_error(reason)),
        }
    }

    /// Gate a self-scoped operation: rule first, then resource ownership.
    pub fn require_owned(&self, rule: &AccessRule, owner_employee_id: u64) -> actix_web::Result<()> {
        match access::evaluate_owned(&self.actor, rule, owner_employee_id) {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(deny_error(reason)),
        }
    }

    /// The actor's own employee link, required by all self-service routes.
    pub fn employee_id(&self) -> actix_web::Result<u64> {
        self.actor
            .employee_id
            .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))
    }
}

/// 403 response carrying the structured deny reason.
pub fn deny_error(reason: DenyReason) -> actix_web::Error {
    let body = json!({
        "code": reason.code(),
        "message": reason.to_string(),
    });
    actix_web::error::InternalError::from_response(reason, HttpResponse::Forbidden().json(body))
        .into()
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )));
            }
        };

        let claims = match verify_token(token, &config.jwt_secret) {
            Ok(c) => c,
            Err(_) => return ready(Err(ErrorUnauthorized("Invalid token"))),
        };

        ready(AuthUser::from_claims(&claims).map_err(ErrorUnauthorized))
    }
}
