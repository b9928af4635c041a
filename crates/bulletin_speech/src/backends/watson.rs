use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bulletin_core::{Error, Result, Script, ScriptMode, SpeechSynthesizer};

use super::partial_path;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

pub const DEFAULT_VOICE: &str = "en-US_AllisonV3Voice";
const ACCEPT: &str = "audio/mp3";

#[derive(Serialize)]
struct SynthesizeRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct ServiceError {
    error: Option<String>,
}

/// IBM Watson Text to Speech over its REST API.
pub struct WatsonSynthesizer {
    client: Arc<Client>,
    api_key: String,
    endpoint: Url,
    output: PathBuf,
}

impl WatsonSynthesizer {
    pub fn new(
        api_key: impl Into<String>,
        service_url: &str,
        voice: &str,
        output: impl Into<PathBuf>,
    ) -> Result<Self> {
        Ok(Self {
            client: Arc::new(Client::new()),
            api_key: api_key.into(),
            endpoint: synthesize_url(service_url, voice)?,
            output: output.into(),
        })
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = Arc::new(client);
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn output(&self) -> &Path {
        &self.output
    }
}

impl fmt::Debug for WatsonSynthesizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatsonSynthesizer")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint.as_str())
            .field("output", &self.output)
            .finish()
    }
}

fn synthesize_url(service_url: &str, voice: &str) -> Result<Url> {
    let base = format!("{}/v1/synthesize", service_url.trim_end_matches('/'));
    let mut url = Url::parse(&base)
        .map_err(|e| Error::Config(format!("invalid service_url '{}': {}", service_url, e)))?;
    url.query_pairs_mut().append_pair("voice", voice);
    Ok(url)
}

#[async_trait]
impl SpeechSynthesizer for WatsonSynthesizer {
    fn name(&self) -> &str {
        "watson"
    }

    fn script_mode(&self) -> ScriptMode {
        ScriptMode::Markup
    }

    async fn synthesize(&self, script: &Script) -> Result<PathBuf> {
        let text = script.join();
        info!("📝 Final script:\n {}", text);

        let response = self
            .client
            .post(self.endpoint.clone())
            .basic_auth("apikey", Some(&self.api_key))
            .header("Accept", ACCEPT)
            .json(&SynthesizeRequest { text: &text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ServiceError>(&body)
                .ok()
                .and_then(|e| e.error)
                .unwrap_or(body);
            return Err(Error::Speech {
                status: Some(status.as_u16()),
                message,
            });
        }

        let audio = response.bytes().await?;
        let partial = partial_path(&self.output);
        if let Err(e) = tokio::fs::write(&partial, &audio).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }
        tokio::fs::rename(&partial, &self.output).await?;

        info!("🔊 News bulletin created with filename {}", self.output.display());
        Ok(self.output.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response and hand back the raw request.
    async fn serve_once(response: Vec<u8>) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request_complete(&request) {
                    break;
                }
            }
            socket.write_all(&response).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).to_string()
        });
        (format!("http://{}/instances/abc", addr), handle)
    }

    fn local_client() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(split) = text.find("\r\n\r\n") else {
            return false;
        };
        let length = text[..split]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        request.len() >= split + 4 + length
    }

    fn http_response(status: &str, content_type: &str, body: &[u8]) -> Vec<u8> {
        let mut response = format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status,
            content_type,
            body.len()
        )
        .into_bytes();
        response.extend_from_slice(body);
        response
    }

    #[test]
    fn test_synthesize_url() {
        let url = synthesize_url("https://api.example.com/instances/1/", DEFAULT_VOICE).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/instances/1/v1/synthesize?voice=en-US_AllisonV3Voice"
        );
        assert!(matches!(synthesize_url("not a url", DEFAULT_VOICE), Err(Error::Config(_))));
    }

    #[test]
    fn test_debug_redacts_key() {
        let synth = WatsonSynthesizer::new("secret", "https://example.com", DEFAULT_VOICE, "a.mp3").unwrap();
        assert!(!format!("{:?}", synth).contains("secret"));
    }

    #[tokio::test]
    async fn test_successful_synthesis_writes_audio() {
        let (url, server) = serve_once(http_response("200 OK", "audio/mp3", b"ID3fake")).await;
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("bulletin.mp3");
        let synth = WatsonSynthesizer::new("secret", &url, DEFAULT_VOICE, &output)
            .unwrap()
            .with_client(local_client());

        let script = Script::new(vec!["<speak>".into(), "Hello".into(), "</speak>".into()]);
        let path = synth.synthesize(&script).await.unwrap();
        assert_eq!(path, output);
        assert_eq!(std::fs::read(&output).unwrap(), b"ID3fake");
        assert!(!partial_path(&output).exists());

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /instances/abc/v1/synthesize?voice=en-US_AllisonV3Voice"));
        assert!(request.contains(r#"{"text":"<speak> Hello </speak>"}"#));
        assert!(request.to_ascii_lowercase().contains("accept: audio/mp3"));
    }

    #[tokio::test]
    async fn test_service_error_is_reported_and_nothing_written() {
        let body = br#"{"code":401,"error":"Unauthorized"}"#;
        let (url, server) = serve_once(http_response("401 Unauthorized", "application/json", body)).await;
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("bulletin.mp3");
        let synth = WatsonSynthesizer::new("bad", &url, DEFAULT_VOICE, &output)
            .unwrap()
            .with_client(local_client());

        let err = synth.synthesize(&Script::new(vec!["Hello".into()])).await.unwrap_err();
        match err {
            Error::Speech { status, message } => {
                assert_eq!(status, Some(401));
                assert_eq!(message, "Unauthorized");
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(!output.exists());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unwritable_output_leaves_no_file() {
        let (url, server) = serve_once(http_response("200 OK", "audio/mp3", b"ID3fake")).await;
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("missing").join("bulletin.mp3");
        let synth = WatsonSynthesizer::new("secret", &url, DEFAULT_VOICE, &output)
            .unwrap()
            .with_client(local_client());

        let err = synth.synthesize(&Script::new(vec!["Hello".into()])).await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(!output.exists());
        assert!(!partial_path(&output).exists());
        server.await.unwrap();
    }
}
