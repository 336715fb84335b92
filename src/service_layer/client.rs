use async_trait::async_trait;
use reqwest::header::{COOKIE, SET_COOKIE};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppError, AppResult, AuthError, UpdateError};
use crate::reconcile::calculator::InstallmentField;
use crate::reconcile::traits::CorrectionGateway;
use crate::service_layer::session::TenantSession;

/// HTTP client for the business API. One login per tenant per run; an update
/// is only expressible against a session obtained from `login`, so the
/// unauthenticated-update state is unrepresentable.
pub struct ServiceLayerClient {
    client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl ServiceLayerClient {
    pub fn new(config: &Config) -> AppResult<Self> {
        // The endpoint ships with a self-signed certificate.
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.service_layer_url.clone(),
            username: config.service_layer_username.clone(),
            password: config.service_layer_password.clone(),
        })
    }
}

#[async_trait]
impl CorrectionGateway for ServiceLayerClient {
    async fn login(&self, tenant: &str) -> Result<TenantSession, AuthError> {
        let url = format!("{}/Login", self.base_url);
        debug!(tenant, %url, "logging in to business API");

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "CompanyDB": tenant,
                "UserName": self.username,
                "Password": self.password,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let mut session_id = None;
        let mut route_id = None;
        for value in response.headers().get_all(SET_COOKIE) {
            let Ok(raw) = value.to_str() else { continue };
            if let Some(v) = cookie_value(raw, "B1SESSION") {
                session_id = Some(v);
            }
            if let Some(v) = cookie_value(raw, "ROUTEID") {
                route_id = Some(v);
            }
        }

        let session_id = session_id.ok_or(AuthError::MissingSessionCookie)?;
        info!(tenant, "business API login succeeded");

        Ok(TenantSession {
            session_id,
            route_id,
        })
    }

    async fn apply_correction(
        &self,
        session: &TenantSession,
        doc_entry: i64,
        field: InstallmentField,
        value: Decimal,
    ) -> Result<(), UpdateError> {
        let url = format!("{}/Orders({})", self.base_url, doc_entry);

        let mut body = serde_json::Map::new();
        body.insert(field.wire_name().to_string(), json!(value));

        let response = self
            .client
            .patch(&url)
            .header(COOKIE, session.cookie_header())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(UpdateError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        debug!(doc_entry, field = field.wire_name(), "order updated");
        Ok(())
    }
}

/// Extracts a cookie's value from a raw `Set-Cookie` line: locate `name=`
/// and take the substring up to the next `;`.
fn cookie_value(raw: &str, name: &str) -> Option<String> {
    let key = format!("{}=", name);
    let start = raw.find(&key)? + key.len();
    let rest = &raw[start..];
    let end = rest.find(';').unwrap_or(rest.len());
    Some(rest[..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_value_stops_at_semicolon() {
        let raw = "B1SESSION=0d7c31a2-8f5e; HttpOnly; Path=/b1s/v1";
        assert_eq!(cookie_value(raw, "B1SESSION").as_deref(), Some("0d7c31a2-8f5e"));
    }

    #[test]
    fn cookie_value_reads_to_end_without_attributes() {
        assert_eq!(cookie_value("ROUTEID=.node2", "ROUTEID").as_deref(), Some(".node2"));
    }

    #[test]
    fn cookie_value_is_none_for_other_cookies() {
        assert_eq!(cookie_value("SESSIONID=xyz; Path=/", "B1SESSION"), None);
    }

    #[test]
    fn cookie_value_keeps_embedded_equals_signs() {
        let raw = "B1SESSION=a2V5PXZhbHVl==; Secure";
        assert_eq!(cookie_value(raw, "B1SESSION").as_deref(), Some("a2V5PXZhbHVl=="));
    }
}
