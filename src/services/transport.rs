use crate::model::NameValue;
use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, SET_COOKIE, WWW_AUTHENTICATE};
use reqwest::{Method, StatusCode, Url};
use std::fmt::Display;
use std::net::ToSocketAddrs;
use std::sync::mpsc::Sender;
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("invalid method {0:?}")]
    Method(String),
    #[error("invalid header {0:?}")]
    Header(String),
    #[error("http: {0}")]
    Client(#[from] reqwest::Error),
    #[error("digest auth: {0}")]
    Digest(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPlan {
    None,
    Basic { username: String, password: String },
    Digest { username: String, password: String },
    /// Literal `Authorization` header value.
    Header(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingBody {
    pub content_type: &'static str,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingRequest {
    pub request_id: i64,
    pub method: String,
    pub url: String,
    pub query: Vec<NameValue>,
    pub headers: Vec<NameValue>,
    pub auth: AuthPlan,
    pub body: Option<OutgoingBody>,
}

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: String,
    pub headers: Vec<NameValue>,
    pub cookies: Vec<NameValue>,
    pub body: String,
    pub size: String,
    pub duration: String,
    pub response_at: DateTime<Utc>,
    pub trace_logs: String,
}

/// Completion delivered back to the event loop, tagged with the request it belongs to.
pub struct TransportMsg {
    pub request_id: i64,
    pub method: String,
    pub url: String,
    pub outcome: Result<TransportResponse, TransportError>,
}

impl OutgoingRequest {
    /// URL with query pairs appended; pairs without a name are skipped.
    pub fn full_url(&self) -> Result<Url, TransportError> {
        let mut url = Url::parse(self.url.trim()).map_err(|e| TransportError::InvalidUrl {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;
        let extra: Vec<&NameValue> = self.query.iter().filter(|p| !p.name.is_empty()).collect();
        if !extra.is_empty() {
            let mut qp = url.query_pairs_mut();
            for p in extra {
                qp.append_pair(&p.name, &p.value);
            }
        }
        Ok(url)
    }

    fn sendable_headers(&self) -> impl Iterator<Item = &NameValue> {
        self.headers
            .iter()
            .filter(|h| !h.name.is_empty() && !h.value.is_empty())
    }

    fn has_user_content_type(&self) -> bool {
        self.sendable_headers()
            .any(|h| h.name.eq_ignore_ascii_case("content-type"))
    }

    pub fn to_curl(&self) -> String {
        let url = self
            .full_url()
            .map(|u| u.to_string())
            .unwrap_or_else(|_| self.url.clone());
        let mut parts = vec!["curl".to_string(), "-X".to_string(), quote(&self.method), quote(&url)];
        for h in self.sendable_headers() {
            parts.push("-H".into());
            parts.push(quote(&format!("{}: {}", h.name, h.value)));
        }
        match &self.auth {
            AuthPlan::None => {}
            AuthPlan::Basic { username, password } => {
                parts.push("-u".into());
                parts.push(quote(&format!("{username}:{password}")));
            }
            AuthPlan::Digest { username, password } => {
                parts.push("--digest".into());
                parts.push("-u".into());
                parts.push(quote(&format!("{username}:{password}")));
            }
            AuthPlan::Header(v) => {
                parts.push("-H".into());
                parts.push(quote(&format!("Authorization: {v}")));
            }
        }
        if let Some(body) = &self.body {
            if !self.has_user_content_type() {
                parts.push("-H".into());
                parts.push(quote(&format!("Content-Type: {}", body.content_type)));
            }
            parts.push("--data-raw".into());
            parts.push(quote(&body.text));
        }
        parts.join(" ")
    }
}

fn quote(s: &str) -> String {
    shlex::try_quote(s)
        .map(|c| c.into_owned())
        .unwrap_or_else(|_| format!("'{}'", s.replace(['\0', '\''], "")))
}

struct Trace {
    t0: Instant,
    buf: String,
}

impl Trace {
    fn start() -> Self {
        Self {
            t0: Instant::now(),
            buf: String::new(),
        }
    }

    fn mark(&mut self, what: impl Display) {
        let ms = self.t0.elapsed().as_millis();
        self.buf.push_str(&format!("{what} {ms} ms\n"));
    }
}

/// `123ms` below one second, `1.234s` above, rounded to the millisecond.
pub fn format_duration(d: Duration) -> String {
    let ms = d.as_millis();
    if ms < 1000 {
        format!("{ms}ms")
    } else {
        let s = format!("{:.3}", ms as f64 / 1000.0);
        let s = s.trim_end_matches('0').trim_end_matches('.');
        format!("{s}s")
    }
}

pub fn spawn_send(req: OutgoingRequest, timeout: Duration, tx: Sender<TransportMsg>) {
    std::thread::spawn(move || {
        tracing::info!(request_id = req.request_id, method = %req.method, url = %req.url, "sending request");
        let outcome = execute(&req, timeout);
        match &outcome {
            Ok(res) => tracing::info!(request_id = req.request_id, status = %res.status, duration = %res.duration, "request completed"),
            Err(e) => tracing::error!(request_id = req.request_id, error = %e, "request failed"),
        }
        let _ = tx.send(TransportMsg {
            request_id: req.request_id,
            method: req.method.clone(),
            url: req.url.clone(),
            outcome,
        });
    });
}

pub fn execute(req: &OutgoingRequest, timeout: Duration) -> Result<TransportResponse, TransportError> {
    let mut trace = Trace::start();
    let url = req.full_url()?;
    let method = Method::from_bytes(req.method.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| TransportError::Method(req.method.clone()))?;
    let client = Client::builder().timeout(timeout).build()?;

    resolve_for_trace(&url, &mut trace);

    let started = Instant::now();
    trace.mark(format_args!("send {method} {url}"));
    let mut res = build(&client, req, &method, &url, None)?.send()?;
    trace.mark(format_args!("first byte {}", res.status()));

    if let AuthPlan::Digest { username, password } = &req.auth {
        if res.status() == StatusCode::UNAUTHORIZED {
            let challenge = res
                .headers()
                .get(WWW_AUTHENTICATE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .ok_or_else(|| TransportError::Digest("401 without a challenge".into()))?;
            let header = digest_authorization(&challenge, username, password, method.as_str(), &url)?;
            trace.mark("digest challenge received, retrying");
            res = build(&client, req, &method, &url, Some(header))?.send()?;
            trace.mark(format_args!("first byte {}", res.status()));
        }
    }

    collect(res, started, trace)
}

/// Separate lookup for the trace only; reqwest resolves the host itself.
fn resolve_for_trace(url: &Url, trace: &mut Trace) {
    let Some(host) = url.host_str() else {
        return;
    };
    let port = url.port_or_known_default().unwrap_or(80);
    trace.mark(format_args!("pre-resolve {host}:{port}"));
    match (host, port).to_socket_addrs() {
        Ok(addrs) => {
            let addrs: Vec<String> = addrs.map(|a| a.to_string()).collect();
            trace.mark(format_args!(
                "pre-resolved [{}] (client resolves again)",
                addrs.join(", ")
            ));
        }
        Err(e) => trace.mark(format_args!("pre-resolve failed: {e}")),
    }
}

fn build(
    client: &Client,
    req: &OutgoingRequest,
    method: &Method,
    url: &Url,
    digest: Option<String>,
) -> Result<RequestBuilder, TransportError> {
    let mut rb = client.request(method.clone(), url.clone());
    for h in req.sendable_headers() {
        let name = HeaderName::from_bytes(h.name.trim().as_bytes())
            .map_err(|_| TransportError::Header(h.name.clone()))?;
        let value = HeaderValue::from_str(&h.value)
            .map_err(|_| TransportError::Header(h.name.clone()))?;
        rb = rb.header(name, value);
    }
    match &req.auth {
        AuthPlan::None => {}
        AuthPlan::Basic { username, password } => {
            rb = rb.basic_auth(username, Some(password));
        }
        AuthPlan::Digest { .. } => {
            if let Some(h) = digest {
                rb = rb.header(AUTHORIZATION, h);
            }
        }
        AuthPlan::Header(v) => {
            let value = HeaderValue::from_str(v)
                .map_err(|_| TransportError::Header("Authorization".into()))?;
            rb = rb.header(AUTHORIZATION, value);
        }
    }
    if let Some(body) = &req.body {
        if !req.has_user_content_type() {
            rb = rb.header(CONTENT_TYPE, body.content_type);
        }
        rb = rb.body(body.text.clone());
    }
    Ok(rb)
}

fn collect(res: Response, started: Instant, mut trace: Trace) -> Result<TransportResponse, TransportError> {
    let status = res.status().to_string();
    let size = res
        .content_length()
        .map(|n| n.to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    let mut headers: Vec<NameValue> = Vec::new();
    for name in res.headers().keys() {
        let joined = res
            .headers()
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join(",");
        headers.push(NameValue::new(name.as_str(), joined));
    }
    let cookies = res
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(parse_set_cookie)
        .collect();

    let body = res.text()?;
    trace.mark(format_args!("body read {} bytes", body.len()));
    let duration = format_duration(started.elapsed());

    Ok(TransportResponse {
        status,
        headers,
        cookies,
        body,
        size,
        duration,
        response_at: Utc::now(),
        trace_logs: trace.buf,
    })
}

pub fn parse_set_cookie(raw: &str) -> Option<NameValue> {
    let first = raw.split(';').next()?.trim();
    let (name, value) = first.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some(NameValue::new(name, value.trim().trim_matches('"')))
}

fn challenge_params(challenge: &str) -> Vec<(String, String)> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    let Some(re) = RE
        .get_or_init(|| Regex::new(r#"(\w+)=(?:"([^"]*)"|([^,\s]*))"#).ok())
        .as_ref()
    else {
        return Vec::new();
    };
    re.captures_iter(challenge)
        .map(|c| {
            let key = c[1].to_ascii_lowercase();
            let val = c
                .get(2)
                .or_else(|| c.get(3))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            (key, val)
        })
        .collect()
}

fn md5_hex(s: &str) -> String {
    format!("{:x}", md5::compute(s.as_bytes()))
}

/// RFC 2617 MD5 response for a `WWW-Authenticate: Digest ...` challenge.
pub fn digest_authorization(
    challenge: &str,
    username: &str,
    password: &str,
    method: &str,
    url: &Url,
) -> Result<String, TransportError> {
    let trimmed = challenge.trim_start();
    if !trimmed
        .get(..6)
        .is_some_and(|s| s.eq_ignore_ascii_case("digest"))
    {
        return Err(TransportError::Digest(format!("unsupported scheme in {challenge:?}")));
    }
    let params = challenge_params(&trimmed[6..]);
    let get = |k: &str| {
        params
            .iter()
            .find(|(key, _)| key == k)
            .map(|(_, v)| v.clone())
    };
    let realm = get("realm").unwrap_or_default();
    let nonce = get("nonce").ok_or_else(|| TransportError::Digest("challenge without nonce".into()))?;
    let opaque = get("opaque");
    let qop_auth = get("qop")
        .map(|q| q.split(',').any(|v| v.trim() == "auth"))
        .unwrap_or(false);

    let uri = match url.query() {
        Some(q) => format!("{}?{}", url.path(), q),
        None => url.path().to_string(),
    };
    let ha1 = md5_hex(&format!("{username}:{realm}:{password}"));
    let ha2 = md5_hex(&format!("{method}:{uri}"));

    let mut header = format!(
        r#"Digest username="{username}", realm="{realm}", nonce="{nonce}", uri="{uri}", algorithm=MD5"#
    );
    if qop_auth {
        let nc = "00000001";
        let cnonce = md5_hex(&format!("{nonce}:{}", Utc::now().timestamp_nanos_opt().unwrap_or_default()))[..16].to_string();
        let response = md5_hex(&format!("{ha1}:{nonce}:{nc}:{cnonce}:auth:{ha2}"));
        header.push_str(&format!(
            r#", qop=auth, nc={nc}, cnonce="{cnonce}", response="{response}""#
        ));
    } else {
        let response = md5_hex(&format!("{ha1}:{nonce}:{ha2}"));
        header.push_str(&format!(r#", response="{response}""#));
    }
    if let Some(op) = opaque {
        header.push_str(&format!(r#", opaque="{op}""#));
    }
    Ok(header)
}
