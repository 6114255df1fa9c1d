//! HTTP handler
//!
//! Each record is sent to a web server as URL-encoded fields, in the query
//! string for `GET` or as a form body for `POST`.

use crate::core::{Formatter, Handler, HandlerKind, LogLevel, LogRecord, LoggerError, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            _ => Err(LoggerError::config(
                "HttpHandler",
                format!("method must be GET or POST, got '{}'", s),
            )),
        }
    }
}

/// TLS settings for `https` endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsOptions {
    /// Extra trusted root certificate, PEM encoded
    pub root_certificate_pem: Option<Vec<u8>>,
    pub accept_invalid_certs: bool,
}

/// Options for [`HttpHandler`]
///
/// # Examples
///
/// ```
/// use logger_config::handlers::{HttpMethod, HttpOptions};
///
/// let options = HttpOptions::new()
///     .with_method(HttpMethod::Post)
///     .with_secure(true)
///     .with_credentials("collector", "s3cret");
/// assert_eq!(options.scheme(), "https");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpOptions {
    pub method: HttpMethod,
    pub secure: bool,
    pub credentials: Option<(String, String)>,
    pub tls: TlsOptions,
    pub timeout: Duration,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            method: HttpMethod::default(),
            secure: false,
            credentials: None,
            tls: TlsOptions::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl HttpOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_tls(mut self, tls: TlsOptions) -> Self {
        self.tls = tls;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn scheme(&self) -> &'static str {
        if self.secure {
            "https"
        } else {
            "http"
        }
    }
}

/// Handler that delivers records to an HTTP endpoint
///
/// # Examples
///
/// ```no_run
/// use logger_config::core::{Formatter, LogLevel};
/// use logger_config::handlers::{HttpHandler, HttpMethod, HttpOptions};
///
/// let handler = HttpHandler::new(
///     LogLevel::Error,
///     Formatter::default(),
///     "logs.example.com:8080",
///     "/ingest",
///     HttpOptions::new().with_method(HttpMethod::Post),
/// )
/// .unwrap();
/// assert_eq!(handler.endpoint(), "http://logs.example.com:8080/ingest");
/// ```
pub struct HttpHandler {
    level: LogLevel,
    formatter: Formatter,
    endpoint: String,
    options: HttpOptions,
    client: Client,
}

impl HttpHandler {
    /// # Errors
    ///
    /// Returns [`LoggerError::InvalidConfiguration`] for an empty host or
    /// url, and [`LoggerError::HttpError`] if the TLS certificate cannot be
    /// parsed or the client cannot be built.
    pub fn new(
        level: LogLevel,
        formatter: Formatter,
        host: &str,
        url: &str,
        options: HttpOptions,
    ) -> Result<Self> {
        let endpoint = Self::endpoint_for(host, url, &options)?;

        let mut builder = Client::builder()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.tls.accept_invalid_certs);
        if let Some(pem) = &options.tls.root_certificate_pem {
            let certificate = reqwest::Certificate::from_pem(pem).map_err(|e| {
                LoggerError::http(&endpoint, format!("invalid root certificate: {}", e))
            })?;
            builder = builder.add_root_certificate(certificate);
        }
        let client = builder
            .build()
            .map_err(|e| LoggerError::http(&endpoint, format!("cannot build client: {}", e)))?;

        Ok(Self {
            level,
            formatter,
            endpoint,
            options,
            client,
        })
    }

    fn endpoint_for(host: &str, url: &str, options: &HttpOptions) -> Result<String> {
        if url.starts_with("http://") || url.starts_with("https://") {
            return Ok(url.to_string());
        }
        if host.trim().is_empty() {
            return Err(LoggerError::config("HttpHandler", "host must not be empty"));
        }
        if url.trim().is_empty() {
            return Err(LoggerError::config("HttpHandler", "url must not be empty"));
        }

        let path = if url.starts_with('/') {
            url.to_string()
        } else {
            format!("/{}", url)
        };
        Ok(format!("{}://{}{}", options.scheme(), host.trim(), path))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn options(&self) -> &HttpOptions {
        &self.options
    }

    /// Fields sent for one record
    fn fields(&self, record: &LogRecord) -> Vec<(&'static str, String)> {
        let created = record.timestamp.timestamp_millis() as f64 / 1000.0;
        vec![
            ("name", record.name.clone()),
            ("levelname", record.level.to_str().to_string()),
            ("levelno", record.level.as_u8().to_string()),
            ("pathname", record.pathname.clone().unwrap_or_default()),
            ("lineno", record.lineno.map(|l| l.to_string()).unwrap_or_default()),
            ("msg", record.message.clone()),
            ("message", self.formatter.render(record)),
            ("created", format!("{:.3}", created)),
        ]
    }
}

impl fmt::Debug for HttpHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpHandler")
            .field("level", &self.level)
            .field("endpoint", &self.endpoint)
            .field("method", &self.options.method)
            .field("authenticated", &self.options.credentials.is_some())
            .finish()
    }
}

impl Handler for HttpHandler {
    fn emit(&mut self, record: &LogRecord) -> Result<()> {
        let fields = self.fields(record);
        let request = match self.options.method {
            HttpMethod::Get => self.client.get(&self.endpoint).query(&fields),
            HttpMethod::Post => self.client.post(&self.endpoint).form(&fields),
        };
        let request = match &self.options.credentials {
            Some((username, password)) => request.basic_auth(username, Some(password)),
            None => request,
        };

        let response = request
            .send()
            .map_err(|e| LoggerError::http(&self.endpoint, format!("request failed: {}", e)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoggerError::http(
                &self.endpoint,
                format!("server responded with {}", status),
            ));
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn kind(&self) -> HandlerKind {
        HandlerKind::Http
    }

    fn level(&self) -> LogLevel {
        self.level
    }

    fn set_level(&mut self, level: LogLevel) {
        self.level = level;
    }

    fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    fn set_formatter(&mut self, formatter: Formatter) {
        self.formatter = formatter;
    }
}
