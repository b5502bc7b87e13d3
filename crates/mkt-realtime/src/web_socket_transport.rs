use crate::{
    ConnectRequest, HEARTBEAT_EOL, RealtimeError, Result as RealtimeErrorResult, SockJsFrame,
    Transport, TransportLink, sockjs,
};

use std::panic::Location;

use async_trait::async_trait;
use error_location::ErrorLocation;
use futures::{SinkExt, StreamExt};
use log::{debug, warn};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

/// Transport over a real websocket (tokio-tungstenite)
#[derive(Debug, Clone, Default)]
pub struct WebSocketTransport;

impl WebSocketTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn open(&self, request: ConnectRequest) -> RealtimeErrorResult<TransportLink> {
        debug!("Opening websocket to {}", redacted(&request));

        let mut ws_request = request.url.as_str().into_client_request()?;
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                RealtimeError::ConnectFailed {
                    message: format!("invalid header name '{name}': {e}"),
                    location: ErrorLocation::from(Location::caller()),
                }
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| RealtimeError::ConnectFailed {
                message: format!("invalid value for header '{name}': {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;
            ws_request.headers_mut().insert(name, value);
        }

        let (stream, _response) = match connect_async(ws_request).await {
            Ok(pair) => pair,
            Err(WsError::Http(response)) => {
                let status = response.status().as_u16();
                let message = match status {
                    401 => "unauthorized: realtime endpoint requires a valid token".to_string(),
                    403 => "forbidden: realtime endpoint denied access".to_string(),
                    code => format!("HTTP {code} during websocket upgrade"),
                };
                return Err(if matches!(status, 401 | 403) {
                    RealtimeError::HandshakeRejected {
                        message,
                        location: ErrorLocation::from(Location::caller()),
                    }
                } else {
                    RealtimeError::ConnectFailed {
                        message,
                        location: ErrorLocation::from(Location::caller()),
                    }
                });
            }
            Err(e) => return Err(e.into()),
        };

        let (mut sink, mut source) = stream.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
        let (in_tx, in_rx) = mpsc::channel::<String>(request.buffer_size.max(1));
        let sockjs_framing = request.sockjs;

        // Writer: drains outbound payloads until every sender is dropped
        let writer = tokio::spawn(async move {
            while let Some(payload) = out_rx.recv().await {
                let text = if sockjs_framing {
                    match sockjs::encode_message(&payload) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!("Dropping unencodable outbound payload: {e}");
                            continue;
                        }
                    }
                } else {
                    payload
                };

                if let Err(e) = sink.send(Message::Text(text.into())).await {
                    debug!("Websocket write failed: {e}");
                    break;
                }
            }
            let _ = sink.close().await;
            debug!("Websocket writer stopped");
        });

        // Reader: forwards STOMP text until the socket or the receiver closes
        tokio::spawn(async move {
            loop {
                let message = tokio::select! {
                    message = source.next() => message,
                    _ = in_tx.closed() => break,
                };

                let payloads = match message {
                    Some(Ok(Message::Text(text))) => {
                        if sockjs_framing {
                            match SockJsFrame::decode(text.as_str()) {
                                Ok(SockJsFrame::Open) => Vec::new(),
                                // SockJS heartbeats surface as STOMP EOL heart-beats
                                Ok(SockJsFrame::Heartbeat) => vec![HEARTBEAT_EOL.to_string()],
                                Ok(SockJsFrame::Messages(messages)) => messages,
                                Ok(SockJsFrame::Close { code, reason }) => {
                                    debug!("SockJS close {code}: {reason}");
                                    break;
                                }
                                Err(e) => {
                                    warn!("Dropping malformed SockJS frame: {e}");
                                    Vec::new()
                                }
                            }
                        } else {
                            vec![text.to_string()]
                        }
                    }
                    Some(Ok(Message::Binary(data))) => {
                        vec![String::from_utf8_lossy(&data).into_owned()]
                    }
                    Some(Ok(Message::Close(frame))) => {
                        debug!("Websocket closed by peer: {frame:?}");
                        break;
                    }
                    Some(Ok(_)) => Vec::new(),
                    Some(Err(e)) => {
                        debug!("Websocket read failed: {e}");
                        break;
                    }
                    None => break,
                };

                for payload in payloads {
                    if in_tx.send(payload).await.is_err() {
                        return;
                    }
                }
            }
            debug!("Websocket reader stopped");
        });

        Ok(TransportLink {
            outbound: out_tx,
            inbound: in_rx,
            writer: Some(writer),
        })
    }
}

/// URL without the token query parameter, for logs
fn redacted(request: &ConnectRequest) -> String {
    let mut url = request.url.clone();
    url.set_query(None);
    url.to_string()
}
