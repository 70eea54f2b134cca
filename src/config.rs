use crate::compiler::RowLimits;
use crate::handlers::ServiceIdentity;
use crate::resolver::StaticStudyResolver;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "variantq")]
#[command(about = "Variant filter to Solr query compiler service")]
pub struct Config {
    /// Host address to bind to
    #[arg(long, env = "VARIANTQ_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "VARIANTQ_PORT", default_value = "8080")]
    pub port: u16,

    /// Enable CORS for all origins
    #[arg(long, env = "VARIANTQ_CORS", default_value = "true")]
    pub cors: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Rows returned when a query sets no limit
    #[arg(long, env = "VARIANTQ_DEFAULT_LIMIT", default_value = "2000")]
    pub default_limit: usize,

    /// Maximum rows a query may request
    #[arg(long, env = "VARIANTQ_MAX_LIMIT", default_value = "5000")]
    pub max_limit: usize,

    /// Fully-qualified study ids of the catalog (e.g. user@project:study)
    #[arg(long, env = "VARIANTQ_STUDIES", value_delimiter = ',')]
    pub studies: Vec<String>,

    /// Service id reported by service-info
    #[arg(long, env = "VARIANTQ_SERVICE_ID", default_value = "variantq")]
    pub service_id: String,

    /// Organization reported by service-info
    #[arg(long, env = "VARIANTQ_ORGANIZATION", default_value = "variantq")]
    pub organization: String,

    /// Organization URL reported by service-info
    #[arg(long, env = "VARIANTQ_ORGANIZATION_URL")]
    pub organization_url: Option<String>,
}

impl Config {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Row limits, with the default capped by the maximum.
    pub fn row_limits(&self) -> RowLimits {
        RowLimits {
            default: self.default_limit.min(self.max_limit),
            max: self.max_limit,
        }
    }

    pub fn service_identity(&self) -> ServiceIdentity {
        ServiceIdentity {
            id: self.service_id.clone(),
            organization: self.organization.clone(),
            organization_url: self.organization_url.clone(),
        }
    }

    pub fn study_resolver(&self) -> StaticStudyResolver {
        StaticStudyResolver::new(
            self.studies
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::StudyResolver;

    fn config() -> Config {
        Config {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors: true,
            log_level: "info".to_string(),
            default_limit: 2000,
            max_limit: 5000,
            studies: Vec::new(),
            service_id: "variantq".to_string(),
            organization: "variantq".to_string(),
            organization_url: None,
        }
    }

    #[test]
    fn test_bind_address() {
        let config = Config {
            host: "localhost".to_string(),
            port: 3000,
            ..config()
        };
        assert_eq!(config.bind_address(), "localhost:3000");
    }

    #[test]
    fn test_row_limits() {
        assert_eq!(config().row_limits(), RowLimits::default());

        let config = Config {
            default_limit: 9000,
            max_limit: 100,
            ..config()
        };
        assert_eq!(
            config.row_limits(),
            RowLimits {
                default: 100,
                max: 100
            }
        );
    }

    #[test]
    fn test_study_resolver() {
        let resolver = config().study_resolver();
        assert_eq!(resolver.study_count(), 0);

        let config = Config {
            studies: vec!["user@p:S1".to_string(), " ".to_string(), "user@p:S2".to_string()],
            ..config()
        };
        let resolver = config.study_resolver();
        assert_eq!(resolver.study_count(), 2);
        assert_eq!(resolver.resolve("S2").unwrap(), "user@p:S2");
    }

    #[test]
    fn test_service_identity() {
        assert_eq!(config().service_identity(), ServiceIdentity::default());

        let config = Config::try_parse_from([
            "variantq",
            "--service-id",
            "org.acme.variantq",
            "--organization",
            "ACME Genomics",
            "--organization-url",
            "https://genomics.acme.test",
        ])
        .unwrap();
        let identity = config.service_identity();
        assert_eq!(identity.id, "org.acme.variantq");
        assert_eq!(identity.organization, "ACME Genomics");
        assert_eq!(identity.organization_url.as_deref(), Some("https://genomics.acme.test"));
    }

    #[test]
    fn test_parse_args() {
        let config = Config::try_parse_from([
            "variantq",
            "--port",
            "9000",
            "--max-limit",
            "100",
            "--studies",
            "user@p:S1,user@p:S2",
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.max_limit, 100);
        assert_eq!(config.studies, vec!["user@p:S1", "user@p:S2"]);
    }
}
