//! Minimal Chrome DevTools Protocol client.
//!
//! Just enough of the protocol to load a document into a fresh page and
//! print it: commands are JSON messages with an incrementing `id`, replies
//! carry the same `id`, and everything without a matching `id` (events,
//! replies to other commands) is skipped.

use base64::Engine as _;
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::RenderError;
use crate::pdf::PrintParams;

/// Marker Chromium writes to stderr once its DevTools endpoint is up:
/// `DevTools listening on ws://127.0.0.1:<port>/devtools/browser/<id>`.
pub(crate) const DEVTOOLS_BANNER: &str = "DevTools listening on ";

/// Extract the browser websocket URL from a stderr line, if it announces one.
pub(crate) fn endpoint_from_line(line: &str) -> Option<&str> {
    let idx = line.find(DEVTOOLS_BANNER)?;
    let url = line[idx + DEVTOOLS_BANNER.len()..].trim();
    url.starts_with("ws://").then_some(url)
}

/// A connection to the browser-level DevTools endpoint.
pub(crate) struct DevTools {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    next_id: u64,
    /// Set once a page target is attached; page commands are routed to it.
    session_id: Option<String>,
}

impl DevTools {
    pub async fn connect(endpoint: &str) -> Result<Self, RenderError> {
        let (ws, _) = connect_async(endpoint)
            .await
            .map_err(|e| RenderError::DevTools(format!("failed to connect to {endpoint}: {e}")))?;
        tracing::debug!(%endpoint, "Connected to DevTools");

        Ok(Self {
            ws,
            next_id: 1,
            session_id: None,
        })
    }

    /// Load `html` into a new page and print it with `params`.
    pub async fn print_html(
        &mut self,
        html: &str,
        params: &PrintParams,
    ) -> Result<Vec<u8>, RenderError> {
        let target = self
            .call("Target.createTarget", json!({ "url": "about:blank" }))
            .await?;
        let target_id = string_field(&target, "/targetId", "Target.createTarget")?;

        let attached = self
            .call(
                "Target.attachToTarget",
                json!({ "targetId": target_id, "flatten": true }),
            )
            .await?;
        self.session_id = Some(string_field(&attached, "/sessionId", "Target.attachToTarget")?);

        self.call("Page.enable", json!({})).await?;
        let tree = self.call("Page.getFrameTree", json!({})).await?;
        let frame_id = string_field(&tree, "/frameTree/frame/id", "Page.getFrameTree")?;

        self.call(
            "Page.setDocumentContent",
            json!({ "frameId": frame_id, "html": html }),
        )
        .await?;
        self.call(
            "Runtime.evaluate",
            json!({ "expression": "document.fonts.ready.then(() => true)", "awaitPromise": true }),
        )
        .await?;

        let params = serde_json::to_value(params)
            .map_err(|e| RenderError::DevTools(format!("invalid print parameters: {e}")))?;
        let printed = self.call("Page.printToPDF", params).await?;
        let data = string_field(&printed, "/data", "Page.printToPDF")?;

        base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|_| RenderError::InvalidOutput)
    }

    /// Ask the browser to exit. Failures are ignored; the caller kills the
    /// process regardless.
    pub async fn close_browser(&mut self) {
        self.session_id = None;
        if let Err(e) = self.call("Browser.close", json!({})).await {
            tracing::debug!(error = %e, "Browser.close failed");
        }
    }

    async fn call(&mut self, method: &str, params: Value) -> Result<Value, RenderError> {
        let id = self.next_id;
        self.next_id += 1;

        let mut command = json!({ "id": id, "method": method, "params": params });
        if let Some(session_id) = &self.session_id {
            command["sessionId"] = json!(session_id);
        }
        self.ws
            .send(Message::Text(command.to_string()))
            .await
            .map_err(|e| RenderError::DevTools(format!("{method}: send failed: {e}")))?;

        while let Some(frame) = self.ws.next().await {
            let text = match frame {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(e) => return Err(RenderError::DevTools(format!("{method}: {e}"))),
            };
            let reply: Value = serde_json::from_str(&text)
                .map_err(|e| RenderError::DevTools(format!("{method}: malformed reply: {e}")))?;
            if reply.get("id").and_then(Value::as_u64) != Some(id) {
                continue;
            }
            if let Some(error) = reply.get("error") {
                let message = error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error");
                return Err(RenderError::DevTools(format!("{method} failed: {message}")));
            }
            return Ok(reply.get("result").cloned().unwrap_or(Value::Null));
        }

        Err(RenderError::DevTools(format!(
            "{method}: connection closed before reply"
        )))
    }
}

fn string_field(result: &Value, pointer: &str, method: &str) -> Result<String, RenderError> {
    result
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| RenderError::DevTools(format!("{method}: reply has no {pointer}")))
}
