//! Shared constants

pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_SAFETY_MARGIN_SECS: u64 = 0;

pub const DEFAULT_SCHEME: &str = "https";

// Issuer routes
pub const TOKEN_ROUTE: &str = "/api/auth/token";
pub const REFRESH_ROUTE: &str = "/api/auth/refresh";
pub const GRAPHQL_ROUTE: &str = "/api/graphql-engine/v1/graphql";

pub const TOKEN_QUERY_PARAM: &str = "token";

// Environment used when no config file is given
pub const ENV_ENDPOINT: &str = "CAMPUS_ENDPOINT";
pub const ENV_CREDENTIAL: &str = "API01_GITEA_TOKEN";
