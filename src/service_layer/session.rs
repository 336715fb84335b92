/// Authentication context for one tenant, valid for one run. Obtained from
/// the login response's session cookies and dropped when the tenant's batch
/// is done; never shared or reused across tenants.
#[derive(Debug, Clone)]
pub struct TenantSession {
    /// Value of the `B1SESSION` cookie.
    pub session_id: String,
    /// Value of the `ROUTEID` cookie, when the endpoint is load-balanced.
    pub route_id: Option<String>,
}

impl TenantSession {
    /// `Cookie` header value for authenticated calls.
    pub fn cookie_header(&self) -> String {
        match &self.route_id {
            Some(route) => format!("B1SESSION={}; ROUTEID={}", self.session_id, route),
            None => format!("B1SESSION={}", self.session_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_header_carries_both_tokens() {
        let session = TenantSession {
            session_id: "abc123".to_string(),
            route_id: Some(".node1".to_string()),
        };
        assert_eq!(session.cookie_header(), "B1SESSION=abc123; ROUTEID=.node1");
    }

    #[test]
    fn cookie_header_omits_missing_route() {
        let session = TenantSession {
            session_id: "abc123".to_string(),
            route_id: None,
        };
        assert_eq!(session.cookie_header(), "B1SESSION=abc123");
    }
}
