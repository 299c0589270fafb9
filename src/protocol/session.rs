//! # Session
//!
//! One connection speaking the framed protocol over a blocking [`Stream`].
//!
//! A client issues requests with [`Session::request`] and blocks until the
//! matching response arrives. A server hands its side to [`Session::serve`],
//! which answers requests through a [`Dispatcher`] until the peer goes away.

use tracing::{debug, info, instrument, warn};

use crate::error::{ProtocolError, Result};
use crate::protocol::codec::MessageCodec;
use crate::protocol::dispatcher::Dispatcher;
use crate::protocol::message::{Message, Notify, Request, Response};
use crate::transport::stream::Stream;

pub struct Session<S: Stream> {
    stream: S,
    codec: MessageCodec,
    next_sequence: u32,
}

impl<S: Stream> Session<S> {
    pub fn new(stream: S, codec: MessageCodec) -> Self {
        Self {
            stream,
            codec,
            next_sequence: 1,
        }
    }

    pub fn codec(&self) -> &MessageCodec {
        &self.codec
    }

    pub fn send(&mut self, msg: &Message) -> Result<usize> {
        self.codec.encode(&mut self.stream, msg)
    }

    pub fn recv(&mut self) -> Result<Message> {
        self.codec.decode(&mut self.stream)
    }

    pub fn notify(&mut self, notify_code: u32, body: impl Into<Vec<u8>>) -> Result<usize> {
        self.send(&Notify::new(notify_code, body).into())
    }

    /// Send a request and wait for the response carrying its sequence number.
    ///
    /// Notifies and stale responses arriving in between are logged and skipped.
    ///
    /// # Errors
    /// - `ProtocolError::ConnectionClosed` if the peer disconnects before answering
    /// - any other encode/decode error from the codec
    /// - `ProtocolError::UnexpectedMessage` if the peer sends a request meanwhile
    #[instrument(skip(self, body), fields(sn = tracing::field::Empty))]
    pub fn request(&mut self, command: u32, body: impl Into<Vec<u8>>) -> Result<Response> {
        let sequence_number = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        tracing::Span::current().record("sn", sequence_number);

        self.send(&Request::new(sequence_number, command, body).into())?;

        loop {
            let msg = self.recv().map_err(|e| {
                if e.is_disconnect() {
                    ProtocolError::ConnectionClosed
                } else {
                    e
                }
            })?;
            match msg {
                Message::Response(rsp) if rsp.sequence_number == sequence_number => return Ok(rsp),
                Message::Response(rsp) => {
                    warn!(sn = rsp.sequence_number, "Skipping response for another request");
                }
                Message::Notify(nty) => {
                    debug!(code = nty.notify_code, "Skipping notify while awaiting response");
                }
                Message::Request(_) => return Err(ProtocolError::UnexpectedMessage),
            }
        }
    }

    /// Answer requests and deliver notifies until the peer disconnects.
    ///
    /// Requests without a handler, or whose handler fails, are answered with
    /// the default result code and the error text as `result_message`.
    /// Returns the number of requests answered.
    ///
    /// # Errors
    /// Any decode error other than a disconnect, and any encode error
    #[instrument(skip(self, dispatcher))]
    pub fn serve(&mut self, dispatcher: &Dispatcher) -> Result<u64> {
        let mut answered = 0u64;
        loop {
            let msg = match self.recv() {
                Ok(msg) => msg,
                Err(e) if e.is_disconnect() => {
                    info!(answered, "Peer disconnected");
                    return Ok(answered);
                }
                Err(e) => return Err(e),
            };

            match msg {
                Message::Request(req) => {
                    let rsp = dispatcher.dispatch_request(&req).unwrap_or_else(|e| {
                        warn!(command = req.command, error = %e, "Request not handled");
                        let mut rsp = req.create_response();
                        rsp.result_message = e.to_string();
                        rsp
                    });
                    self.send(&rsp.into())?;
                    answered += 1;
                }
                Message::Notify(nty) => {
                    if let Err(e) = dispatcher.dispatch_notify(&nty) {
                        warn!(code = nty.notify_code, error = %e, "Notify not handled");
                    }
                }
                Message::Response(rsp) => {
                    warn!(sn = rsp.sequence_number, "Ignoring unsolicited response");
                }
            }
        }
    }

    pub fn close(&mut self) -> Result<()> {
        self.stream.close().map_err(ProtocolError::Io)
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}
