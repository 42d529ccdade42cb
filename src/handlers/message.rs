//! Direct message relay (`sendMessage`).

use super::{Context, Handler, HandlerError, HandlerResult};
use crate::state::Delivery;
use async_trait::async_trait;
use presence_proto::SendMessage;
use tracing::{debug, trace};

/// Handler for `sendMessage`.
///
/// Forwards `{senderId, text}` to the connection registered for
/// `receiverId`. Undeliverable messages are dropped silently; the sender is
/// never told.
pub struct SendMessageHandler;

#[async_trait]
impl Handler<SendMessage> for SendMessageHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &SendMessage) -> HandlerResult {
        // Bound to the registry's view: claiming a name that is online
        // elsewhere does not grant the right to send as it.
        let bound = ctx.state.registered_user_id();
        if ctx.hub.bind_sender_identity && bound != Some(msg.sender_id.as_str()) {
            return Err(HandlerError::SenderMismatch {
                claimed: msg.sender_id.clone(),
                bound: bound.map(str::to_string),
            });
        }

        let delivery = ctx.hub.route_message(&msg.sender_id, &msg.receiver_id, &msg.text);
        crate::metrics::record_message(delivery.as_str());

        match delivery {
            Delivery::Delivered => {
                trace!(from = %msg.sender_id, to = %msg.receiver_id, "Message relayed");
            }
            dropped => {
                debug!(
                    conn = %ctx.conn_id,
                    from = %msg.sender_id,
                    to = %msg.receiver_id,
                    reason = dropped.as_str(),
                    "Message dropped"
                );
            }
        }
        Ok(())
    }
}
