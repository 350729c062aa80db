use clap::builder::TypedValueParser as _;
use clap::{Parser, ValueEnum};
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;

/// Path of the OAuth callback, appended to the public base URL to form the redirect URI.
pub const CALLBACK_PATH: &str = "/api/auth/callback";

/// Deployment environment the process runs in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RustEnv {
    Development,
    Staging,
    Production,
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            RustEnv::Development => "development",
            RustEnv::Staging => "staging",
            RustEnv::Production => "production",
        };
        f.write_str(name)
    }
}

/// Where the authorization code is exchanged for tokens.
///
/// `Server` keeps the verifier in a signed, http-only cookie and exchanges the
/// code inside the callback handler. `Browser` keeps the verifier in the
/// browser's localStorage and returns a page that performs the exchange itself
/// before posting the tokens to the store-tokens endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExchangeMode {
    Server,
    Browser,
}

impl fmt::Display for ExchangeMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            ExchangeMode::Server => "server",
            ExchangeMode::Browser => "browser",
        })
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Origins allowed to make cross-origin requests, comma separated.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:4000,https://localhost:4000"
    )]
    pub allowed_origins: Vec<String>,

    /// The Descope project identifier. Long project ids select a regional API host.
    #[arg(long, env)]
    descope_project_id: Option<String>,

    /// The OAuth client id registered for this application. Defaults to the project id.
    #[arg(long, env)]
    oidc_client_id: Option<String>,

    /// Override the Descope API base URL derived from the project id.
    /// Override in tests to point at a mock server.
    #[arg(long, env)]
    descope_base_url: Option<String>,

    /// Externally visible base URL of this application (scheme, host and port).
    #[arg(long, env, default_value = "http://localhost:4000")]
    public_base_url: String,

    /// Space separated scopes requested from the provider.
    #[arg(long, env, default_value = "openid")]
    oidc_scope: String,

    /// The Descope flow run by the authorization endpoint. Set to an empty string to omit.
    #[arg(long, env, default_value = "sign-in-magic-link")]
    oidc_flow_id: String,

    /// Where the authorization code is exchanged for tokens.
    #[arg(long, env, value_enum, ignore_case = true, default_value_t = ExchangeMode::Server)]
    pub exchange_mode: ExchangeMode,

    /// Length of generated PKCE code verifiers.
    #[arg(long, env, default_value_t = 64, value_parser = clap::value_parser!(u16).range(64..=128))]
    verifier_length: u16,

    /// Lifetime in seconds of the signed cookies holding an in-flight login attempt.
    #[arg(long, env, default_value_t = 600)]
    pub transient_cookie_max_age_secs: i64,

    /// Secret (at least 64 bytes) used to sign transient cookies. A random key is
    /// generated at startup when unset, which abandons in-flight logins on restart.
    #[arg(long, env)]
    cookie_secret: Option<String>,

    /// Mark every cookie set by this application as Secure.
    #[arg(long, env, default_value_t = true, action = clap::ArgAction::Set)]
    pub cookie_secure: bool,

    /// Redirect page requests based on the expiry of the access token cookie.
    #[arg(long, env, default_value_t = true, action = clap::ArgAction::Set)]
    pub enforce_session_gate: bool,

    /// Timeout in seconds for requests to the identity provider.
    #[arg(long, env, default_value_t = 30)]
    pub http_timeout_secs: u64,

    /// Directory of static assets served for unmatched paths.
    #[arg(long, env, default_value = "static")]
    pub static_dir: String,

    /// Address of the interface the HTTP listener binds to.
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// TCP port the HTTP listener binds to.
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Most verbose log level written to the console.
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|level| level.parse::<LevelFilter>().unwrap_or(LevelFilter::Info)),
    )]
    pub log_level_filter: LevelFilter,

    /// Deployment environment. Production refuses to start without a cookie secret.
    #[arg(short, long, env, value_enum, ignore_case = true, default_value_t = RustEnv::Development)]
    pub runtime_env: RustEnv,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Read `.env` into the environment, then parse flags and variables.
    pub fn new() -> Self {
        dotenv().ok();
        Config::parse()
    }

    pub fn set_descope_base_url(mut self, descope_base_url: String) -> Self {
        self.descope_base_url = Some(descope_base_url);
        self
    }

    pub fn descope_project_id(&self) -> Option<String> {
        self.descope_project_id.clone()
    }

    /// Returns the OAuth client id, falling back to the project id.
    pub fn oidc_client_id(&self) -> Option<String> {
        self.oidc_client_id
            .clone()
            .or_else(|| self.descope_project_id.clone())
    }

    /// Returns the explicit Descope API base URL, if one was configured.
    pub fn descope_base_url(&self) -> Option<String> {
        self.descope_base_url.clone()
    }

    pub fn public_base_url(&self) -> &str {
        self.public_base_url.trim_end_matches('/')
    }

    /// Returns the redirect URI registered with the provider.
    pub fn redirect_uri(&self) -> String {
        format!("{}{}", self.public_base_url(), CALLBACK_PATH)
    }

    pub fn oidc_scope(&self) -> String {
        self.oidc_scope.clone()
    }

    /// Returns the flow selector, or `None` when configured as empty.
    pub fn oidc_flow_id(&self) -> Option<String> {
        Some(self.oidc_flow_id.trim())
            .filter(|flow_id| !flow_id.is_empty())
            .map(str::to_string)
    }

    pub fn verifier_length(&self) -> usize {
        usize::from(self.verifier_length)
    }

    pub fn cookie_secret(&self) -> Option<String> {
        self.cookie_secret.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env == RustEnv::Production
    }
}
