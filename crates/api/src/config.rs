use crate::auth::jwt::JwtConfig;

/// Origins allowed when `CORS_ORIGINS` is unset outside production.
const DEV_CORS_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:8000",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:8000",
];

const APPLE_VERIFY_RECEIPT_URL: &str = "https://buy.itunes.apple.com/verifyReceipt";
const APPLE_SANDBOX_VERIFY_RECEIPT_URL: &str = "https://sandbox.itunes.apple.com/verifyReceipt";

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except
/// `JWT_SECRET`, which is always required.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Deployment environment name (default: `development`).
    pub environment: String,
    /// Public base URL used to build local media URLs.
    pub app_url: String,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// Image storage settings.
    pub storage: StorageConfig,
    /// Gemini model settings. Disabled when no API key is set.
    pub gemini: GeminiConfig,
    /// OAuth audiences and store credentials.
    pub oauth: OAuthConfig,
    /// Requests per minute per client IP on ordinary routes.
    pub rate_limit_per_minute: u32,
    /// Whether to attach the security header set to every response.
    pub enable_security_headers: bool,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub local_path: String,
    pub max_file_size_mb: usize,
    /// Present only when the bucket and both AWS keys are configured.
    pub s3: Option<S3Config>,
}

impl StorageConfig {
    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_mb * 1024 * 1024
    }
}

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub cloudfront_domain: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub google_client_id: Option<String>,
    pub apple_client_id: Option<String>,
    pub apple_shared_secret: Option<String>,
    pub apple_verify_url: String,
    pub apple_sandbox_verify_url: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                              |
    /// |---------------------------|--------------------------------------|
    /// | `HOST`                    | `0.0.0.0`                            |
    /// | `PORT`                    | `8000`                               |
    /// | `ENV`                     | `development`                        |
    /// | `APP_URL`                 | `http://localhost:8000`              |
    /// | `CORS_ORIGINS`            | localhost ports 3000/8000 (dev only) |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                                 |
    /// | `LOCAL_STORAGE_PATH`      | `./media`                            |
    /// | `MAX_FILE_SIZE_MB`        | `10`                                 |
    /// | `AWS_REGION`              | `us-east-1`                          |
    /// | `AWS_S3_BUCKET`           | unset (local storage)                |
    /// | `GEMINI_MODEL`            | `gemini-2.0-flash`                   |
    /// | `GEMINI_BASE_URL`         | Google Generative Language API       |
    /// | `RATE_LIMIT_PER_MINUTE`   | `60`                                 |
    /// | `ENABLE_SECURITY_HEADERS` | `true`                               |
    ///
    /// # Panics
    ///
    /// Panics on unparsable numbers, and in production when `CORS_ORIGINS`
    /// is unset.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let environment = std::env::var("ENV").unwrap_or_else(|_| "development".into());
        let is_production = environment == "production";

        let app_url = std::env::var("APP_URL")
            .unwrap_or_else(|_| "http://localhost:8000".into())
            .trim_end_matches('/')
            .to_string();

        let cors_origins: Vec<String> = match std::env::var("CORS_ORIGINS") {
            Ok(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => {
                assert!(!is_production, "CORS_ORIGINS must be set in production");
                DEV_CORS_ORIGINS.iter().map(|s| s.to_string()).collect()
            }
        };

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let max_file_size_mb: usize = std::env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("MAX_FILE_SIZE_MB must be a valid usize");

        let s3 = match (
            non_empty_var("AWS_S3_BUCKET"),
            non_empty_var("AWS_ACCESS_KEY_ID"),
            non_empty_var("AWS_SECRET_ACCESS_KEY"),
        ) {
            (Some(bucket), Some(access_key_id), Some(secret_access_key)) => Some(S3Config {
                bucket,
                region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".into()),
                access_key_id,
                secret_access_key,
                cloudfront_domain: non_empty_var("CLOUDFRONT_DOMAIN"),
            }),
            _ => None,
        };

        let storage = StorageConfig {
            local_path: std::env::var("LOCAL_STORAGE_PATH").unwrap_or_else(|_| "./media".into()),
            max_file_size_mb,
            s3,
        };

        let gemini = GeminiConfig {
            api_key: non_empty_var("GEMINI_API_KEY"),
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".into()),
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".into()),
        };

        let oauth = OAuthConfig {
            google_client_id: non_empty_var("GOOGLE_CLIENT_ID"),
            apple_client_id: non_empty_var("APPLE_CLIENT_ID"),
            apple_shared_secret: non_empty_var("APPLE_SHARED_SECRET"),
            apple_verify_url: std::env::var("APPLE_VERIFY_RECEIPT_URL")
                .unwrap_or_else(|_| APPLE_VERIFY_RECEIPT_URL.into()),
            apple_sandbox_verify_url: std::env::var("APPLE_SANDBOX_VERIFY_RECEIPT_URL")
                .unwrap_or_else(|_| APPLE_SANDBOX_VERIFY_RECEIPT_URL.into()),
        };

        let rate_limit_per_minute: u32 = std::env::var("RATE_LIMIT_PER_MINUTE")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("RATE_LIMIT_PER_MINUTE must be a valid u32");

        let enable_security_headers: bool = std::env::var("ENABLE_SECURITY_HEADERS")
            .unwrap_or_else(|_| "true".into())
            .parse()
            .expect("ENABLE_SECURITY_HEADERS must be true or false");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            environment,
            app_url,
            cors_origins,
            request_timeout_secs,
            jwt,
            storage,
            gemini,
            oauth,
            rate_limit_per_minute,
            enable_security_headers,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
