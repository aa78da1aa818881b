use anyhow::{Context, Result, anyhow};
use axum_extra::extract::cookie::Key;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use products_hr::{DEFAULT_PER_PAGE, MAX_PER_PAGE, PageLimits};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub cookie_key: Key,
    pub cors_allowed_origins: Vec<String>,
    pub page_limits: PageLimits,
    pub session_ttl_days: i64,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let cookie_secret = lookup("COOKIE_SECRET_BASE64").context("COOKIE_SECRET_BASE64 missing")?;
        let secret_bytes = STANDARD
            .decode(cookie_secret.trim())
            .context("invalid COOKIE_SECRET_BASE64")?;
        if secret_bytes.len() < 32 {
            return Err(anyhow!(
                "COOKIE_SECRET_BASE64 must decode to at least 32 bytes"
            ));
        }
        let cookie_key = derive_key(&secret_bytes);

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>();

        let max_per_page = parse_number(&lookup, "MAX_PAGE_SIZE", MAX_PER_PAGE)?.max(1);
        let default_per_page =
            parse_number(&lookup, "DEFAULT_PAGE_SIZE", DEFAULT_PER_PAGE)?.clamp(1, max_per_page);
        let session_ttl_days = parse_number(&lookup, "SESSION_TTL_DAYS", 30)?;

        Ok(Self {
            cookie_key,
            cors_allowed_origins,
            page_limits: PageLimits {
                default_per_page,
                max_per_page,
            },
            session_ttl_days,
        })
    }
}

/// `Key::from` wants 64 bytes; shorter secrets are stretched by `Key::derive_from`.
fn derive_key(secret: &[u8]) -> Key {
    if secret.len() >= 64 {
        Key::from(&secret[..64])
    } else {
        Key::derive_from(secret)
    }
}

fn parse_number<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number")),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    fn secret() -> String {
        STANDARD.encode([7u8; 32])
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[("COOKIE_SECRET_BASE64", &secret())]).unwrap();
        assert_eq!(config.cors_allowed_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.page_limits.default_per_page, 20);
        assert_eq!(config.page_limits.max_per_page, 100);
        assert_eq!(config.session_ttl_days, 30);
    }

    #[test]
    fn short_secret_is_rejected() {
        let err = load(&[("COOKIE_SECRET_BASE64", &STANDARD.encode([1u8; 16]))]).unwrap_err();
        assert!(err.to_string().contains("at least 32 bytes"));
        assert!(load(&[]).is_err());
    }

    #[test]
    fn default_page_size_never_exceeds_max() {
        let config = load(&[
            ("COOKIE_SECRET_BASE64", &secret()),
            ("DEFAULT_PAGE_SIZE", "80"),
            ("MAX_PAGE_SIZE", "50"),
            ("CORS_ALLOWED_ORIGINS", "https://hr.example.test, ,https://admin.example.test"),
        ])
        .unwrap();
        assert_eq!(config.page_limits.default_per_page, 50);
        assert_eq!(config.cors_allowed_origins.len(), 2);
        assert!(load(&[("COOKIE_SECRET_BASE64", &secret()), ("MAX_PAGE_SIZE", "lots")]).is_err());
    }
}
