//! InboundRouter: decodes text frames and hands them to per-kind handlers.
//!
//! Handlers receive a mutable context `C` (the client core in production) so
//! that one registration table can drive state held elsewhere without shared
//! ownership.

use std::collections::HashMap;

use sortviz_core::{decode_inbound, InboundMessage, MessageKind, ProtocolError};
use tracing::trace;

/// Handler for one [`MessageKind`].
pub type Handler<C> = Box<dyn FnMut(&mut C, InboundMessage) + Send>;

pub struct InboundRouter<C> {
    handlers: HashMap<MessageKind, Handler<C>>,
}

impl<C> Default for InboundRouter<C> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<C> InboundRouter<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `kind`.  The last registration wins.
    pub fn register<F>(&mut self, kind: MessageKind, handler: F)
    where
        F: FnMut(&mut C, InboundMessage) + Send + 'static,
    {
        if self.handlers.insert(kind, Box::new(handler)).is_some() {
            trace!(%kind, "handler replaced");
        }
    }

    /// Returns `true` if a handler is registered for `kind`.
    pub fn handles(&self, kind: MessageKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Decodes `frame` and invokes the handler for its kind.
    ///
    /// Returns the kind that was handled, or `None` when the frame decoded
    /// but nobody is registered for it.
    ///
    /// # Errors
    ///
    /// Returns the [`ProtocolError`] of a frame that cannot be decoded.  No
    /// handler runs in that case.
    pub fn dispatch(&mut self, context: &mut C, frame: &str) -> Result<Option<MessageKind>, ProtocolError> {
        let message = decode_inbound(frame)?;
        let kind = message.kind();
        match self.handlers.get_mut(&kind) {
            Some(handler) => {
                handler(context, message);
                Ok(Some(kind))
            }
            None => {
                trace!(%kind, "no handler registered; frame dropped");
                Ok(None)
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
