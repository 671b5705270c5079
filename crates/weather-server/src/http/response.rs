use crate::error::ApiError;
use bytes::Bytes;

const SERVER_NAME: &str = "weather-server/0.1";

/// A response ready to be written back to the client.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Response {
    pub fn json(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Serialize to wire form: status line, content headers, connection-close,
    /// any extra headers, blank line, body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = format!(
            "HTTP/1.1 {} {}\r\n\
             Content-Type: application/json; charset=utf-8\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\
             Server: {}\r\n",
            self.status,
            reason_phrase(self.status),
            self.body.len(),
            SERVER_NAME,
        )
        .into_bytes();

        for (name, value) in &self.headers {
            out.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
        }
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.body);
        out
    }
}

/// Standard error envelope: `{ "error": true, "code": ..., "message": ... }`.
pub fn error_response(err: &ApiError) -> Response {
    let status = err.status();
    let body = serde_json::json!({
        "error": true,
        "code": status,
        "message": err.to_string(),
    });
    Response::json(status, body.to_string())
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format() {
        let wire = Response::json(200, r#"{"ok":true}"#).to_bytes();
        let text = String::from_utf8(wire).unwrap();

        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Type: application/json; charset=utf-8\r\n"));
        assert!(text.contains("Content-Length: 11\r\n"));
        assert!(text.contains("Connection: close\r\n"));
        assert!(text.ends_with("\r\n\r\n{\"ok\":true}"));
    }

    #[test]
    fn extra_headers_land_before_blank_line() {
        let wire = Response::json(200, "{}").with_header("X-Cache", "HIT").to_bytes();
        let text = String::from_utf8(wire).unwrap();

        let (head, body) = text.split_once("\r\n\r\n").unwrap();
        assert!(head.contains("X-Cache: HIT"));
        assert_eq!(body, "{}");
    }

    #[test]
    fn error_envelope() {
        let resp = error_response(&ApiError::CityNotFound("Nowhereland".into()));
        assert_eq!(resp.status, 404);

        let body: serde_json::Value = serde_json::from_slice(&resp.body).unwrap();
        assert_eq!(body["error"], true);
        assert_eq!(body["code"], 404);
        assert!(body["message"].as_str().unwrap().contains("Nowhereland"));
    }
}
