use std::env;

/// Origins allowed to make cross-origin requests.
///
/// `CORS_TRUSTED_ORIGINS` accepts a space or comma separated list. An empty
/// list disables CORS headers entirely.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CorsConfig {
    pub trusted_origins: Vec<String>,
}

impl CorsConfig {
    pub fn from_env() -> Self {
        Self::parse(&env::var("CORS_TRUSTED_ORIGINS").unwrap_or_default())
    }

    pub fn parse(raw: &str) -> Self {
        let trusted_origins = raw
            .split(|c: char| c == ',' || c.is_whitespace())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Self { trusted_origins }
    }
}
