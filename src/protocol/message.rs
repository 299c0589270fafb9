//! # Message Model
//!
//! Three message variants travel inside a frame body. Each starts with a
//! one-byte type tag, followed by its own fields and finally the opaque body.
//!
//! ```text
//! Request:  [tag=1] [sn:varint] [cmd:varint] [body:varint-string]
//! Response: [tag=2] [sn:varint] [cmd:varint] [result:varint] [result_msg:varint-string] [body:varint-string]
//! Notify:   [tag=3] [code:varint] [body:varint-string]
//! ```
//!
//! `serialize` writes the tag; `parse` expects the tag to have been consumed
//! already, since the codec reads it to pick the variant.

use crate::core::buffer::ByteBuffer;
use crate::error::{constants, ProtocolError, Result};

/// Result code a fresh response carries until a handler sets one
pub const RESULT_UNHANDLED: u32 = 404;

/// Result code for a successfully handled request
pub const RESULT_OK: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    Request = 1,
    Response = 2,
    Notify = 3,
}

impl MessageType {
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(MessageType::Request),
            2 => Some(MessageType::Response),
            3 => Some(MessageType::Notify),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MessageType::Request => "Request",
            MessageType::Response => "Response",
            MessageType::Notify => "Notify",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub sequence_number: u32,
    pub command: u32,
    pub body: Vec<u8>,
}

impl Request {
    pub fn new(sequence_number: u32, command: u32, body: impl Into<Vec<u8>>) -> Self {
        Self {
            sequence_number,
            command,
            body: body.into(),
        }
    }

    /// Response addressed to this request, result left at [`RESULT_UNHANDLED`]
    pub fn create_response(&self) -> Response {
        Response {
            sequence_number: self.sequence_number,
            command: self.command,
            ..Response::default()
        }
    }

    pub fn serialize(&self, buf: &mut ByteBuffer) -> Result<()> {
        buf.write_u8(MessageType::Request.as_byte());
        buf.write_var_u32(self.sequence_number);
        buf.write_var_u32(self.command);
        buf.write_string_varint(&self.body);
        Ok(())
    }

    pub fn parse(buf: &mut ByteBuffer) -> Result<Self> {
        Ok(Self {
            sequence_number: buf.read_var_u32()?,
            command: buf.read_var_u32()?,
            body: buf.read_string_varint()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub sequence_number: u32,
    pub command: u32,
    pub result_code: u32,
    pub result_message: String,
    pub body: Vec<u8>,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            sequence_number: 0,
            command: 0,
            result_code: RESULT_UNHANDLED,
            result_message: String::new(),
            body: Vec::new(),
        }
    }
}

impl Response {
    pub fn is_ok(&self) -> bool {
        self.result_code == RESULT_OK
    }

    pub fn serialize(&self, buf: &mut ByteBuffer) -> Result<()> {
        buf.write_u8(MessageType::Response.as_byte());
        buf.write_var_u32(self.sequence_number);
        buf.write_var_u32(self.command);
        buf.write_var_u32(self.result_code);
        buf.write_string_varint(&self.result_message);
        buf.write_string_varint(&self.body);
        Ok(())
    }

    pub fn parse(buf: &mut ByteBuffer) -> Result<Self> {
        let sequence_number = buf.read_var_u32()?;
        let command = buf.read_var_u32()?;
        let result_code = buf.read_var_u32()?;
        let result_message = String::from_utf8(buf.read_string_varint()?).map_err(|_| {
            ProtocolError::MalformedMessageBody(constants::ERR_RESULT_MESSAGE_UTF8.to_string())
        })?;
        let body = buf.read_string_varint()?;
        Ok(Self {
            sequence_number,
            command,
            result_code,
            result_message,
            body,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notify {
    pub notify_code: u32,
    pub body: Vec<u8>,
}

impl Notify {
    pub fn new(notify_code: u32, body: impl Into<Vec<u8>>) -> Self {
        Self {
            notify_code,
            body: body.into(),
        }
    }

    pub fn serialize(&self, buf: &mut ByteBuffer) -> Result<()> {
        buf.write_u8(MessageType::Notify.as_byte());
        buf.write_var_u32(self.notify_code);
        buf.write_string_varint(&self.body);
        Ok(())
    }

    pub fn parse(buf: &mut ByteBuffer) -> Result<Self> {
        Ok(Self {
            notify_code: buf.read_var_u32()?,
            body: buf.read_string_varint()?,
        })
    }
}

/// Any message that can travel in a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Request(Request),
    Response(Response),
    Notify(Notify),
}

impl Message {
    pub fn message_type(&self) -> MessageType {
        match self {
            Message::Request(_) => MessageType::Request,
            Message::Response(_) => MessageType::Response,
            Message::Notify(_) => MessageType::Notify,
        }
    }

    pub fn body(&self) -> &[u8] {
        match self {
            Message::Request(req) => &req.body,
            Message::Response(rsp) => &rsp.body,
            Message::Notify(nty) => &nty.body,
        }
    }

    /// Write the tag, the variant's fields and the body
    pub fn serialize(&self, buf: &mut ByteBuffer) -> Result<()> {
        match self {
            Message::Request(req) => req.serialize(buf),
            Message::Response(rsp) => rsp.serialize(buf),
            Message::Notify(nty) => nty.serialize(buf),
        }
    }

    /// Read the tag and dispatch to the matching variant.
    ///
    /// # Errors
    /// - `ProtocolError::MalformedMessageBody` if the buffer is empty or a
    ///   variant's fields cannot be parsed
    /// - `ProtocolError::UnknownMessageType` for a tag outside 1..=3
    pub fn parse(buf: &mut ByteBuffer) -> Result<Self> {
        let tag = buf.read_u8().map_err(|_| {
            ProtocolError::MalformedMessageBody(constants::ERR_MISSING_TYPE_TAG.to_string())
        })?;
        let kind = MessageType::from_byte(tag).ok_or(ProtocolError::UnknownMessageType(tag))?;

        let parsed = match kind {
            MessageType::Request => Request::parse(buf).map(Message::Request),
            MessageType::Response => Response::parse(buf).map(Message::Response),
            MessageType::Notify => Notify::parse(buf).map(Message::Notify),
        };

        parsed.map_err(|e| match e {
            ProtocolError::MalformedMessageBody(_) => e,
            other => ProtocolError::MalformedMessageBody(format!("{}: {other}", kind.name())),
        })
    }
}

impl From<Request> for Message {
    fn from(req: Request) -> Self {
        Message::Request(req)
    }
}

impl From<Response> for Message {
    fn from(rsp: Response) -> Self {
        Message::Response(rsp)
    }
}

impl From<Notify> for Message {
    fn from(nty: Notify) -> Self {
        Message::Notify(nty)
    }
}
