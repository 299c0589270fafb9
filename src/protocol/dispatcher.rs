use crate::error::{constants, ProtocolError, Result};
use crate::protocol::message::{Message, Notify, Request, Response};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

type RequestHandlerFn = dyn Fn(&Request, &mut Response) -> Result<()> + Send + Sync + 'static;
type NotifyHandlerFn = dyn Fn(&Notify) -> Result<()> + Send + Sync + 'static;

/// Routes requests by command and notifies by notify code.
///
/// Cloning is cheap and clones share the handler tables.
#[derive(Clone)]
pub struct Dispatcher {
    requests: Arc<RwLock<HashMap<u32, Box<RequestHandlerFn>>>>,
    notifies: Arc<RwLock<HashMap<u32, Box<NotifyHandlerFn>>>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            requests: Arc::new(RwLock::new(HashMap::new())),
            notifies: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register the handler for `command`, replacing any previous one.
    ///
    /// The handler receives a response already addressed to the request
    /// (see [`Request::create_response`]) and fills in result and body.
    pub fn register_request<F>(&self, command: u32, handler: F) -> Result<()>
    where
        F: Fn(&Request, &mut Response) -> Result<()> + Send + Sync + 'static,
    {
        let mut handlers = self.requests.write().map_err(|_| {
            ProtocolError::Custom(constants::ERR_DISPATCHER_WRITE_LOCK.to_string())
        })?;

        handlers.insert(command, Box::new(handler));
        Ok(())
    }

    pub fn register_notify<F>(&self, notify_code: u32, handler: F) -> Result<()>
    where
        F: Fn(&Notify) -> Result<()> + Send + Sync + 'static,
    {
        let mut handlers = self.notifies.write().map_err(|_| {
            ProtocolError::Custom(constants::ERR_DISPATCHER_WRITE_LOCK.to_string())
        })?;

        handlers.insert(notify_code, Box::new(handler));
        Ok(())
    }

    /// Run the handler registered for the request's command.
    ///
    /// # Errors
    /// Returns `ProtocolError::UnhandledCommand` if no handler is registered,
    /// or whatever the handler returns
    pub fn dispatch_request(&self, req: &Request) -> Result<Response> {
        let handlers = self.requests.read().map_err(|_| {
            ProtocolError::Custom(constants::ERR_DISPATCHER_READ_LOCK.to_string())
        })?;

        let handler = handlers
            .get(&req.command)
            .ok_or(ProtocolError::UnhandledCommand(req.command))?;

        let mut rsp = req.create_response();
        handler(req, &mut rsp)?;
        Ok(rsp)
    }

    pub fn dispatch_notify(&self, nty: &Notify) -> Result<()> {
        let handlers = self.notifies.read().map_err(|_| {
            ProtocolError::Custom(constants::ERR_DISPATCHER_READ_LOCK.to_string())
        })?;

        handlers
            .get(&nty.notify_code)
            .ok_or(ProtocolError::UnhandledCommand(nty.notify_code))
            .and_then(|handler| handler(nty))
    }

    /// Route any incoming message; requests yield the response to send back.
    ///
    /// # Errors
    /// Returns `ProtocolError::UnexpectedMessage` for a response, which has no handler table
    pub fn dispatch(&self, msg: &Message) -> Result<Option<Response>> {
        debug!(kind = msg.message_type().name(), "Dispatching message");
        match msg {
            Message::Request(req) => self.dispatch_request(req).map(Some),
            Message::Notify(nty) => self.dispatch_notify(nty).map(|_| None),
            Message::Response(_) => Err(ProtocolError::UnexpectedMessage),
        }
    }
}
