use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

/// Directories mounted as static file roots.
#[derive(Debug, Clone, Deserialize)]
pub struct StaticDirs {
    pub dist: String,   // bundled client build output, served at /dist
    pub assets: String, // public assets, served at /assets
    pub sw: String,     // service worker and friends, served at the root
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub static_dirs: StaticDirs,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "routinely".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "routinely-users".into()),
        };
        let static_dirs = StaticDirs {
            dist: std::env::var("DIST_DIR").unwrap_or_else(|_| "dist".into()),
            assets: std::env::var("ASSETS_DIR").unwrap_or_else(|_| "client/assets".into()),
            sw: std::env::var("SW_DIR").unwrap_or_else(|_| "sw".into()),
        };
        Ok(Self {
            database_url,
            jwt,
            static_dirs,
        })
    }
}
