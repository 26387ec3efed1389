use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub database_url: Option<String>,
    /// HMAC secret for access tokens. Required.
    pub jwt_secret: String,
    /// Shared secret the payment provider sends as `Authorization: ApiKey ...`.
    /// When unset the webhook rejects every call.
    pub polka_key: Option<String>,
    /// `dev` enables destructive admin endpoints.
    pub platform: String,
    /// Directory served under `/app/`.
    pub filepath_root: String,
}

impl Config {
    pub fn is_dev(&self) -> bool {
        self.platform == "dev"
    }

    /// Build a config from any variable source. `load()` feeds it the process
    /// environment; tests feed it a map.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = non_empty("JWT_SECRET").ok_or_else(|| {
            anyhow::anyhow!("JWT_SECRET must be set to sign access tokens")
        })?;

        Ok(Config {
            port: non_empty("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            database_url: non_empty("DB_URL").or_else(|| non_empty("DATABASE_URL")),
            jwt_secret,
            polka_key: non_empty("POLKA_KEY"),
            platform: non_empty("PLATFORM").unwrap_or_else(|| "prod".into()),
            filepath_root: non_empty("FILEPATH_ROOT").unwrap_or_else(|| ".".into()),
        })
    }
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let cfg = Config::from_lookup(|key| std::env::var(key).ok())?;
    if cfg.polka_key.is_none() {
        eprintln!("⚠️  POLKA_KEY is not set; the payment webhook will reject every request.");
    }
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::from_lookup(lookup(&[("JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.platform, "prod");
        assert_eq!(cfg.filepath_root, ".");
        assert!(cfg.database_url.is_none());
        assert!(cfg.polka_key.is_none());
        assert!(!cfg.is_dev());
    }

    #[test]
    fn test_missing_or_blank_secret_is_an_error() {
        assert!(Config::from_lookup(lookup(&[])).is_err());
        assert!(Config::from_lookup(lookup(&[("JWT_SECRET", "  ")])).is_err());
    }

    #[test]
    fn test_db_url_precedence() {
        let cfg = Config::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("DB_URL", "postgres://primary"),
            ("DATABASE_URL", "postgres://fallback"),
        ]))
        .unwrap();
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://primary"));

        let cfg = Config::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("DATABASE_URL", "postgres://fallback"),
        ]))
        .unwrap();
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://fallback"));
    }

    #[test]
    fn test_overrides() {
        let cfg = Config::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("PORT", "9000"),
            ("PLATFORM", "dev"),
            ("POLKA_KEY", "f271c81ff7084ee5b99a5091b42d486e"),
            ("FILEPATH_ROOT", "./public"),
        ]))
        .unwrap();
        assert_eq!(cfg.port, 9000);
        assert!(cfg.is_dev());
        assert_eq!(cfg.polka_key.as_deref(), Some("f271c81ff7084ee5b99a5091b42d486e"));
        assert_eq!(cfg.filepath_root, "./public");
    }

    #[test]
    fn test_bad_port_falls_back() {
        let cfg = Config::from_lookup(lookup(&[("JWT_SECRET", "s"), ("PORT", "http")])).unwrap();
        assert_eq!(cfg.port, 8080);
    }
}
