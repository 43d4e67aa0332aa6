//! The request/reply loop
//!
//! Reads one envelope per input line, dispatches on the body type, and
//! writes one reply envelope per request. Strictly sequential: a line is
//! fully processed before the next is read, so node state needs no
//! locking. Both directions are mirrored to the diagnostic stream.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use super::{Dispatcher, NodeError, NodeOptions, NodeResult, NodeState};
use crate::protocol::{self, CodecError, Envelope, ResponseBody};

/// Drives a node over line-delimited envelope streams.
pub struct Runner {
    options: NodeOptions,
    state: NodeState,
    dispatcher: Dispatcher,
}

impl Runner {
    /// Create a runner with the built-in `init` and `echo` handlers.
    pub fn new(options: NodeOptions) -> Self {
        Self::with_dispatcher(options, Dispatcher::with_builtin_handlers())
    }

    /// Create a runner around a custom dispatcher.
    pub fn with_dispatcher(options: NodeOptions, dispatcher: Dispatcher) -> Self {
        Self {
            options,
            state: NodeState::new(),
            dispatcher,
        }
    }

    pub fn state(&self) -> &NodeState {
        &self.state
    }

    /// Run the loop until the input is exhausted.
    ///
    /// Reaching end of input is the clean exit; an `Err` is a fatal
    /// protocol or I/O failure.
    pub async fn run<R, W>(&mut self, input: R, mut output: W) -> NodeResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();

        while let Some(line) = lines.next_line().await? {
            tracing::info!("REQ: {}", line);

            let reply = match self.process_line(&line)? {
                Some(reply) => reply,
                None => continue,
            };

            let encoded = protocol::encode(&reply)?;
            output.write_all(encoded.as_bytes()).await?;
            output.write_all(b"\n").await?;
            output.flush().await?;

            tracing::info!("RESP: {}", encoded);
        }

        Ok(())
    }

    /// Process one raw line into at most one reply envelope.
    ///
    /// With `fail_fast` unset, a line that cannot be decoded is dropped
    /// (no reply is addressable) and a failed dispatch becomes an `error`
    /// reply; with `fail_fast` set, both are fatal.
    fn process_line(&mut self, line: &str) -> NodeResult<Option<Envelope>> {
        if line.len() > self.options.max_line_bytes {
            let err = CodecError::LineTooLong(line.len(), self.options.max_line_bytes);
            if self.options.fail_fast {
                return Err(err.into());
            }
            tracing::warn!("Dropping line: {}", err);
            return Ok(None);
        }

        let envelope = match protocol::decode(line) {
            Ok(envelope) => envelope,
            Err(err) => {
                if self.options.fail_fast {
                    return Err(err.into());
                }
                tracing::warn!("Dropping line: {}", err);
                return Ok(None);
            }
        };

        match self.handle_request(&envelope) {
            Ok(reply) => Ok(Some(reply)),
            Err(err) => {
                if self.options.fail_fast {
                    return Err(err);
                }
                tracing::warn!("Request from {} failed: {}", envelope.src, err);
                Ok(Some(self.error_reply(&envelope, &err)))
            }
        }
    }

    fn handle_request(&mut self, envelope: &Envelope) -> NodeResult<Envelope> {
        let req = envelope.request();
        let msg_type = req.msg_type()?;

        if self.options.strict_init && !self.state.is_initialized() && msg_type != "init" {
            return Err(NodeError::NotInitialized);
        }

        let msg_id = req.msg_id()?;
        let resp = ResponseBody::new(self.state.next_msg_id()).with_in_reply_to(msg_id);
        let resp = self.dispatcher.dispatch(&mut self.state, msg_type, &req, resp)?;

        Ok(self.reply_to(envelope, resp))
    }

    /// Build the reply envelope addressed back to the requester.
    fn reply_to(&self, envelope: &Envelope, resp: ResponseBody) -> Envelope {
        let src = self.state.node_id().unwrap_or_default().to_string();
        Envelope::new(src, envelope.src.clone(), resp.into_body())
    }

    /// Build an `error` reply for a failed request, correlating it to the
    /// request's msg id when that field is recoverable.
    fn error_reply(&mut self, envelope: &Envelope, err: &NodeError) -> Envelope {
        let mut resp = ResponseBody::new(self.state.next_msg_id());
        if let Ok(msg_id) = envelope.request().msg_id() {
            resp = resp.with_in_reply_to(msg_id);
        }
        let resp = err.to_rpc().into_response(resp);
        self.reply_to(envelope, resp)
    }
}
