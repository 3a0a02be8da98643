//! Blocking HTTP implementation of [`Transport`].
//!
//! Runs on the background fetch threads, never on the GUI thread.

use reqwest::blocking::{multipart, Client};
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;

use crate::query::QueryParams;
use crate::transport::{ApiError, ApiRequest, BaseUrl, Body, Method, ResponseFormat, Transport};

/// Default timeout applied to every request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP transport parameterized by the API and root base URLs.
pub struct HttpTransport {
    client: Client,
    api_base: Url,
    root_base: Url,
}

impl HttpTransport {
    pub fn new(api_base: &str, root_base: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            api_base: parse_base(api_base)?,
            root_base: parse_base(root_base)?,
        })
    }

    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Full URL of a request, including its query string. Each entry of
    /// `segments` becomes exactly one percent-encoded path segment.
    pub fn endpoint_url(
        &self,
        base: BaseUrl,
        path: &str,
        segments: &[String],
        params: &QueryParams,
    ) -> Result<Url, ApiError> {
        let base = match base {
            BaseUrl::Api => &self.api_base,
            BaseUrl::Root => &self.root_base,
        };
        let joined = format!(
            "{}/{}",
            base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut url = Url::parse(&joined).map_err(|_| ApiError::InvalidUrl(joined.clone()))?;
        if !segments.is_empty() {
            url.path_segments_mut()
                .map_err(|_| ApiError::InvalidUrl(joined.clone()))?
                .pop_if_empty()
                .extend(segments);
        }
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url)
    }
}

fn parse_base(base: &str) -> Result<Url, ApiError> {
    let url = Url::parse(base).map_err(|_| ApiError::InvalidUrl(base.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidUrl(base.to_string()));
    }
    Ok(url)
}

impl Transport for HttpTransport {
    fn execute(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        let url = self.endpoint_url(request.base, &request.path, &request.segments, &request.params)?;
        tracing::debug!(method = ?request.method, %url, "api request");

        let builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Delete => self.client.delete(url),
        };
        let builder = match &request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(value),
            Body::File { field, path } => {
                let form = multipart::Form::new()
                    .file(field.clone(), path)
                    .map_err(|source| ApiError::Io {
                        path: path.clone(),
                        source,
                    })?;
                builder.multipart(form)
            }
        };

        let response = builder
            .send()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::Status {
                code: status.as_u16(),
                message: ApiError::message_from_body(&text),
            });
        }
        if request.response == ResponseFormat::Text {
            return Ok(Value::String(text));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc::{channel, Receiver};
    use std::thread;

    /// Serves one canned response and reports the raw request it received.
    fn serve_once(response: String) -> (String, Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = channel();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 8192];
                let n = stream.read(&mut buf).unwrap_or(0);
                let _ = tx.send(String::from_utf8_lossy(&buf[..n]).to_string());
                let _ = stream.write_all(response.as_bytes());
            }
        });
        (format!("http://{addr}"), rx)
    }

    fn json_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    #[test]
    fn endpoint_url_joins_paths_and_encodes_params() {
        let transport =
            HttpTransport::new("http://localhost:8000/api/", "http://localhost:8000", DEFAULT_TIMEOUT)
                .unwrap();
        let params = vec![
            ("search".to_string(), "a b&c".to_string()),
            ("page".to_string(), "1".to_string()),
        ];
        let url = transport
            .endpoint_url(BaseUrl::Api, "/trajectories", &[], &params)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/trajectories?search=a+b%26c&page=1"
        );
        let root = transport
            .endpoint_url(BaseUrl::Root, "stats", &[], &QueryParams::new())
            .unwrap();
        assert_eq!(root.as_str(), "http://localhost:8000/stats");
    }

    #[test]
    fn free_form_segments_are_percent_encoded() {
        let transport =
            HttpTransport::new("http://localhost:8000/api", "http://localhost:8000", DEFAULT_TIMEOUT)
                .unwrap();
        let url = transport
            .endpoint_url(
                BaseUrl::Api,
                "/trajectories/t1/tags",
                &["needs review/retry?".to_string()],
                &QueryParams::new(),
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/trajectories/t1/tags/needs%20review%2Fretry%3F"
        );
    }

    #[test]
    fn text_response_is_returned_verbatim() {
        let csv = "trajectory_id,reward\nt1,1.0\n";
        let (base, requests) = serve_once(format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{csv}",
            csv.len()
        ));
        let transport = HttpTransport::new(&base, &base, DEFAULT_TIMEOUT).unwrap();
        let value = transport
            .execute(&ApiRequest::get("/export/csv").text_response())
            .unwrap();
        assert_eq!(value, Value::String(csv.to_string()));
        assert!(requests.recv().unwrap().starts_with("GET /export/csv "));
    }

    #[test]
    fn rejects_invalid_base() {
        assert!(matches!(
            HttpTransport::new("not a url", "http://x", DEFAULT_TIMEOUT),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn decodes_success_body_and_sends_query() {
        let (base, requests) = serve_once(json_response("200 OK", r#"{"data": [], "total": 0}"#));
        let transport = HttpTransport::new(&base, &base, DEFAULT_TIMEOUT).unwrap();
        let value = transport
            .execute(&ApiRequest::get("/trajectories").param("page", 1))
            .unwrap();
        assert_eq!(value["total"], 0);
        let raw = requests.recv().unwrap();
        assert!(raw.starts_with("GET /trajectories?page=1 "), "{raw}");
    }

    #[test]
    fn non_success_status_carries_server_detail() {
        let (base, _requests) = serve_once(json_response(
            "500 Internal Server Error",
            r#"{"detail": "database locked"}"#,
        ));
        let transport = HttpTransport::new(&base, &base, DEFAULT_TIMEOUT).unwrap();
        let err = transport.execute(&ApiRequest::get("/stats")).unwrap_err();
        match err {
            ApiError::Status { code, message } => {
                assert_eq!(code, 500);
                assert_eq!(message, "database locked");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let (base, _requests) = serve_once(json_response("200 OK", "{not json"));
        let transport = HttpTransport::new(&base, &base, DEFAULT_TIMEOUT).unwrap();
        assert!(matches!(
            transport.execute(&ApiRequest::get("/stats")),
            Err(ApiError::Decode(_))
        ));
    }

    #[test]
    fn unreachable_server_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let base = format!("http://{addr}");
        let transport = HttpTransport::new(&base, &base, Duration::from_secs(2)).unwrap();
        assert!(matches!(
            transport.execute(&ApiRequest::get("/stats")),
            Err(ApiError::Transport(_))
        ));
    }

    #[test]
    fn missing_upload_file_is_reported_before_sending() {
        let transport =
            HttpTransport::new("http://127.0.0.1:9", "http://127.0.0.1:9", DEFAULT_TIMEOUT).unwrap();
        let request = ApiRequest::upload("/import/json", "file", "/definitely/missing.json".into());
        assert!(matches!(transport.execute(&request), Err(ApiError::Io { .. })));
    }
}
