//! HTTP transport for block API requests.
//!
//! Requests are POSTs: form-encoded for ordinary operations, multipart when
//! a file goes along (video uploads). [`CurlTransport`] performs them with
//! libcurl; tests substitute their own [`Transport`].

mod form;

use std::path::PathBuf;
use std::time::Duration;

use curl::easy::{Easy, Form, List};

use crate::config::BlockApiConfig;
use crate::retry::RequestError;

pub use form::encode_form;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u32,
    pub body: String,
}

/// A local file sent as one part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Form field name, e.g. `video_file`.
    pub field: String,
    pub path: PathBuf,
}

/// Sends a form to a URL and returns the reply.
///
/// Implementations must return `RequestError::Http` for non-2xx statuses so
/// the retry policy can classify them.
pub trait Transport {
    fn post_form(&self, url: &str, fields: &[(String, String)]) -> Result<HttpReply, RequestError>;

    /// Sends `fields` and the contents of `files` as `multipart/form-data`.
    fn post_multipart(
        &self,
        url: &str,
        fields: &[(String, String)],
        files: &[FilePart],
    ) -> Result<HttpReply, RequestError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn post_form(&self, url: &str, fields: &[(String, String)]) -> Result<HttpReply, RequestError> {
        (**self).post_form(url, fields)
    }

    fn post_multipart(
        &self,
        url: &str,
        fields: &[(String, String)],
        files: &[FilePart],
    ) -> Result<HttpReply, RequestError> {
        (**self).post_multipart(url, fields, files)
    }
}

/// Blocking libcurl transport. Runs in the current thread; call from
/// `spawn_blocking` if used from async code.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    connect_timeout: Duration,
    timeout: Duration,
    headers: Vec<(String, String)>,
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(30),
            headers: Vec::new(),
        }
    }
}

impl CurlTransport {
    pub fn from_config(cfg: &BlockApiConfig) -> Self {
        let mut transport = Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            timeout: Duration::from_secs(cfg.timeout_secs),
            headers: Vec::new(),
        };
        if let Some(ua) = &cfg.user_agent {
            transport = transport.with_header("User-Agent", ua);
        }
        transport
    }

    /// Adds a header sent with every request (e.g. a session cookie).
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .push((name.trim().to_string(), value.trim().to_string()));
        self
    }

    fn easy(&self, url: &str) -> Result<Easy, RequestError> {
        let mut easy = Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;
        Ok(easy)
    }

    /// `fixed` headers first, then the configured ones.
    fn header_list(&self, fixed: &[&str]) -> Result<List, RequestError> {
        let mut list = List::new();
        for line in fixed {
            list.append(line)?;
        }
        list.append("X-Requested-With: XMLHttpRequest")?;
        for (k, v) in &self.headers {
            if k.is_empty() || k.contains(':') {
                return Err(RequestError::Setup(format!("invalid header name '{k}'")));
            }
            list.append(&format!("{}: {}", k, v))?;
        }
        Ok(list)
    }

    fn perform(&self, mut easy: Easy, url: &str) -> Result<HttpReply, RequestError> {
        let mut response: Vec<u8> = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                response.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        if !(200..300).contains(&status) {
            tracing::debug!(url, status, "non-success status");
            return Err(RequestError::Http(status));
        }

        Ok(HttpReply {
            status,
            body: String::from_utf8_lossy(&response).into_owned(),
        })
    }
}

impl Transport for CurlTransport {
    fn post_form(&self, url: &str, fields: &[(String, String)]) -> Result<HttpReply, RequestError> {
        let body = encode_form(fields);
        let mut easy = self.easy(url)?;
        easy.post(true)?;
        easy.post_fields_copy(body.as_bytes())?;
        easy.http_headers(self.header_list(&["Content-Type: application/x-www-form-urlencoded"])?)?;

        tracing::debug!(url, fields = fields.len(), "POST");
        self.perform(easy, url)
    }

    fn post_multipart(
        &self,
        url: &str,
        fields: &[(String, String)],
        files: &[FilePart],
    ) -> Result<HttpReply, RequestError> {
        let mut form = Form::new();
        for (name, value) in fields {
            form.part(name).contents(value.as_bytes()).add()?;
        }
        for file in files {
            if !file.path.is_file() {
                return Err(RequestError::Setup(format!(
                    "cannot upload {}: not a readable file",
                    file.path.display()
                )));
            }
            form.part(&file.field).file(&file.path).add()?;
        }

        let mut easy = self.easy(url)?;
        easy.httppost(form)?;
        // An empty `Expect:` stops libcurl waiting for `100 Continue`.
        easy.http_headers(self.header_list(&["Expect:"])?)?;

        tracing::debug!(url, fields = fields.len(), files = files.len(), "POST multipart");
        self.perform(easy, url)
    }
}
