use anyhow::Result;
use http_body_util::{BodyExt, Full};
use hyper::{body::Bytes, Method, Request, Response, StatusCode};
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde_json::Value;
use std::collections::HashMap;

const BOUNDARY: &str = "pdf2tts-test-boundary-7MA4YWxkTrZu0gW";

/// One part of a multipart/form-data body
pub enum Part {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: Option<String>,
        content_type: Option<String>,
        data: Vec<u8>,
    },
}

impl Part {
    pub fn text(name: &str, value: impl ToString) -> Self {
        Part::Text {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    /// A PDF upload as a browser would send it
    pub fn pdf(file_name: &str, data: Vec<u8>) -> Self {
        Part::File {
            name: "pdf".to_string(),
            file_name: Some(file_name.to_string()),
            content_type: Some("application/pdf".to_string()),
            data,
        }
    }

    pub fn file(name: &str, file_name: &str, content_type: Option<&str>, data: Vec<u8>) -> Self {
        Part::File {
            name: name.to_string(),
            file_name: Some(file_name.to_string()),
            content_type: content_type.map(str::to_string),
            data,
        }
    }
}

fn encode_multipart(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                file_name,
                content_type,
                data,
            } => {
                let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", name);
                if let Some(file_name) = file_name {
                    disposition.push_str(&format!("; filename=\"{}\"", file_name));
                }
                body.extend_from_slice(disposition.as_bytes());
                body.extend_from_slice(b"\r\n");
                if let Some(content_type) = content_type {
                    body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
                }
                body.extend_from_slice(b"\r\n");
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

#[derive(Clone)]
pub struct TestClient {
    base_url: String,
    client: Client<hyper_util::client::legacy::connect::HttpConnector, Full<Bytes>>,
}

impl TestClient {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder(TokioExecutor::new()).build_http();
        Self {
            base_url: base_url.to_string(),
            client,
        }
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(format!("{}{}", self.base_url, path))
            .body(Full::new(Bytes::new()))?;
        self.send(request).await
    }

    pub async fn post_multipart(&self, path: &str, parts: &[Part]) -> Result<ApiResponse> {
        self.post_multipart_with_headers(path, parts, &[]).await
    }

    pub async fn post_multipart_with_headers(
        &self,
        path: &str,
        parts: &[Part],
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse> {
        let mut req_builder = Request::builder()
            .method(Method::POST)
            .uri(format!("{}{}", self.base_url, path))
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            );
        for (name, value) in headers {
            req_builder = req_builder.header(*name, *value);
        }

        let request = req_builder.body(Full::new(Bytes::from(encode_multipart(parts))))?;
        self.send(request).await
    }

    async fn send(&self, request: Request<Full<Bytes>>) -> Result<ApiResponse> {
        let response = self.client.request(request).await?;
        ApiResponse::from_response(response).await
    }
}

pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Option<Value>,
    pub body_bytes: Vec<u8>,
    pub headers: HashMap<String, String>,
}

impl ApiResponse {
    async fn from_response(response: Response<hyper::body::Incoming>) -> Result<Self> {
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();

        let body_bytes = response.into_body().collect().await?.to_bytes().to_vec();

        let body = if !body_bytes.is_empty() {
            serde_json::from_slice(&body_bytes).ok()
        } else {
            None
        };

        Ok(Self {
            status,
            body,
            body_bytes,
            headers,
        })
    }

    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status, expected,
            "Expected status {} but got {}. Body: {:?}",
            expected, self.status, self.body
        );
        self
    }

    /// Assert that the error response contains the expected message
    pub fn assert_error_message(&self, expected_message: &str) -> &Self {
        let message = self
            .body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(|m| m.as_str())
            .expect("Missing message field in error response");

        assert!(
            message.contains(expected_message),
            "Expected error message to contain '{}', but got '{}'",
            expected_message,
            message
        );
        self
    }

    pub fn header(&self, name: &str) -> Option<&String> {
        self.headers.get(name)
    }

    pub fn assert_header(&self, name: &str, value: &str) -> &Self {
        let actual = self
            .headers
            .get(name)
            .unwrap_or_else(|| panic!("Header '{}' not found", name));
        assert_eq!(actual, value, "Header '{}' value mismatch", name);
        self
    }

    pub fn assert_header_exists(&self, name: &str) -> &Self {
        assert!(
            self.headers.contains_key(name),
            "Header '{}' not found",
            name
        );
        self
    }
}
