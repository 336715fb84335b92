use chrono::NaiveDate;
use config::ConfigError;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub service_layer_url: String,
    pub service_layer_username: String,
    pub service_layer_password: String,
    /// Company databases to reconcile, in processing order.
    pub tenants: Vec<String>,
    /// Documents dated before this day are never touched.
    pub cutoff_date: NaiveDate,
    /// Business-partner installment type codes excluded from reconciliation.
    pub excluded_installment_types: Vec<i32>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let tenants = parse_tenant_list(&require("TENANT_DBS")?)?;

        let cutoff_date = parse_cutoff_date(
            &std::env::var("RECON_CUTOFF_DATE").unwrap_or_else(|_| "2025-11-25".to_string()),
        )?;

        let excluded_installment_types = match std::env::var("EXCLUDED_INSTALLMENT_TYPES") {
            Ok(raw) => parse_type_codes(&raw)?,
            Err(_) => vec![5],
        };

        Ok(Self {
            database_url: require("DATABASE_URL")?,
            bind_address: std::env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            service_layer_url: require("SERVICE_LAYER_URL")?
                .trim_end_matches('/')
                .to_string(),
            service_layer_username: require("SERVICE_LAYER_USERNAME")?,
            service_layer_password: require("SERVICE_LAYER_PASSWORD")?,
            tenants,
            cutoff_date,
            excluded_installment_types,
        })
    }
}

fn require(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::NotFound(key.to_string()))
}

/// The tenant list arrives as one JSON array, e.g. `["TENANT_A","TENANT_B"]`.
fn parse_tenant_list(raw: &str) -> Result<Vec<String>, ConfigError> {
    let tenants: Vec<String> = serde_json::from_str(raw).map_err(|e| {
        ConfigError::Message(format!("TENANT_DBS must be a JSON array of tenant names: {}", e))
    })?;
    if tenants.is_empty() {
        return Err(ConfigError::Message(
            "TENANT_DBS must name at least one tenant".to_string(),
        ));
    }
    Ok(tenants)
}

fn parse_cutoff_date(raw: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
        ConfigError::Message(format!("RECON_CUTOFF_DATE must be YYYY-MM-DD: {}", e))
    })
}

fn parse_type_codes(raw: &str) -> Result<Vec<i32>, ConfigError> {
    serde_json::from_str(raw).map_err(|e| {
        ConfigError::Message(format!(
            "EXCLUDED_INSTALLMENT_TYPES must be a JSON array of integers: {}",
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_list_parses_json_array() {
        let tenants = parse_tenant_list(r#"["TENANT_A", "TENANT_B"]"#).unwrap();
        assert_eq!(tenants, vec!["TENANT_A", "TENANT_B"]);
    }

    #[test]
    fn tenant_list_rejects_empty_and_malformed() {
        assert!(parse_tenant_list("[]").is_err());
        assert!(parse_tenant_list("TENANT_A,TENANT_B").is_err());
    }

    #[test]
    fn cutoff_date_parses_iso_days() {
        let date = parse_cutoff_date("2025-11-25").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 11, 25).unwrap());
        assert!(parse_cutoff_date("25/11/2025").is_err());
    }

    #[test]
    fn type_codes_parse_json_array() {
        assert_eq!(parse_type_codes("[5]").unwrap(), vec![5]);
        assert_eq!(parse_type_codes("[5, 9]").unwrap(), vec![5, 9]);
        assert!(parse_type_codes("5").is_err());
    }
}
