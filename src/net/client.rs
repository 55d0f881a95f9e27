use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::runtime::Handle;
use tokio::sync::{mpsc as async_mpsc, watch};
use tokio_tungstenite::tungstenite::Message;

use crate::logging;
use crate::net::protocol::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
	Connecting,
	Open,
	Closed,
	Errored,
}

impl ConnectionStatus {
	pub fn is_terminal(&self) -> bool {
		matches!(self, Self::Closed | Self::Errored)
	}

	pub fn label(&self) -> &'static str {
		match self {
			Self::Connecting => "connecting",
			Self::Open => "open",
			Self::Closed => "closed",
			Self::Errored => "error",
		}
	}
}

#[derive(Debug)]
pub enum ConnectionError {
	NotOpen,
	Address(url::ParseError),
	Encode(serde_json::Error),
}

impl fmt::Display for ConnectionError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::NotOpen => write!(f, "connection is not open"),
			Self::Address(e) => write!(f, "invalid table address: {}", e),
			Self::Encode(e) => write!(f, "failed to encode frame: {}", e),
		}
	}
}

impl std::error::Error for ConnectionError {}

impl From<url::ParseError> for ConnectionError {
	fn from(e: url::ParseError) -> Self {
		Self::Address(e)
	}
}

impl From<serde_json::Error> for ConnectionError {
	fn from(e: serde_json::Error) -> Self {
		Self::Encode(e)
	}
}

/// One duplex channel to a table. The socket is driven by a task on the given
/// runtime; the owner polls inbound frames and the status from its own loop.
/// Closed and errored are final: there is no reconnection.
pub struct TableConnection {
	outbound: async_mpsc::UnboundedSender<String>,
	rx: Receiver<InboundFrame>,
	status: watch::Receiver<ConnectionStatus>,
}

impl TableConnection {
	pub fn open(address: &TableAddress, runtime: &Handle) -> Result<Self, ConnectionError> {
		let url = address.to_url()?;
		let (tx, rx) = mpsc::channel();
		let (outbound, outbound_rx) = async_mpsc::unbounded_channel();
		let (status_tx, status) = watch::channel(ConnectionStatus::Connecting);

		logging::net::status(&format!("connecting to {}", url));
		runtime.spawn(socket_loop(url.to_string(), tx, outbound_rx, status_tx));

		Ok(Self { outbound, rx, status })
	}

	pub fn status(&self) -> ConnectionStatus {
		*self.status.borrow()
	}

	/// Sends one command. Nothing is queued when the channel is not open.
	pub fn send(&self, frame: &OutboundFrame) -> Result<(), ConnectionError> {
		if self.status() != ConnectionStatus::Open {
			return Err(ConnectionError::NotOpen);
		}
		let text = encode_frame(frame)?;
		logging::net::sent(&text);
		self.outbound.send(text).map_err(|_| ConnectionError::NotOpen)
	}

	pub fn try_recv(&self) -> Option<InboundFrame> {
		self.rx.try_recv().ok()
	}

	pub fn recv_timeout(&self, timeout: Duration) -> Option<InboundFrame> {
		self.rx.recv_timeout(timeout).ok()
	}
}

async fn socket_loop(
	url: String,
	tx: Sender<InboundFrame>,
	mut outbound: async_mpsc::UnboundedReceiver<String>,
	status: watch::Sender<ConnectionStatus>,
) {
	let stream = match tokio_tungstenite::connect_async(url.as_str()).await {
		Ok((stream, _)) => stream,
		Err(e) => {
			logging::net::error(&format!("connect failed: {}", e));
			let _ = status.send(ConnectionStatus::Errored);
			return;
		}
	};
	let _ = status.send(ConnectionStatus::Open);
	logging::net::status("open");

	let (mut sink, mut source) = stream.split();
	let final_status = loop {
		tokio::select! {
			next = outbound.recv() => {
				match next {
					Some(text) => {
						if let Err(e) = sink.send(Message::Text(text)).await {
							logging::net::error(&format!("send failed: {}", e));
							break ConnectionStatus::Errored;
						}
					}
					None => {
						let _ = sink.close().await;
						break ConnectionStatus::Closed;
					}
				}
			}
			incoming = source.next() => {
				match incoming {
					Some(Ok(Message::Text(text))) => {
						match decode_frame(&text) {
							Some(frame) => {
								if tx.send(frame).is_err() {
									let _ = sink.close().await;
									break ConnectionStatus::Closed;
								}
							}
							None => logging::net::dropped(&text),
						}
					}
					Some(Ok(Message::Close(_))) | None => break ConnectionStatus::Closed,
					Some(Ok(_)) => {}
					Some(Err(e)) => {
						logging::net::error(&format!("receive failed: {}", e));
						break ConnectionStatus::Errored;
					}
				}
			}
		}
	};

	logging::net::status(final_status.label());
	let _ = status.send(final_status);
}
