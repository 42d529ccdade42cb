//! Identity announcement (`addUser`).

use super::{Context, Handler, HandlerError, HandlerResult};
use async_trait::async_trait;
use presence_proto::AnnounceIdentity;
use tracing::{debug, info};

/// Handler for `addUser`.
///
/// Binds the connection to the announced userId and broadcasts the new
/// presence snapshot. Announcing a userId that is already online leaves the
/// registry unchanged but still broadcasts; the session then claims the
/// name without holding it.
pub struct AnnounceHandler;

#[async_trait]
impl Handler<AnnounceIdentity> for AnnounceHandler {
    async fn handle(&self, ctx: &mut Context<'_>, announce: &AnnounceIdentity) -> HandlerResult {
        if let Some(current) = ctx.state.user_id() {
            return Err(HandlerError::AlreadyIdentified(current.to_string()));
        }

        let outcome = ctx.hub.announce(ctx.conn_id, &announce.user_id);
        ctx.state.identify(announce.user_id.as_str(), outcome.inserted);

        if outcome.inserted {
            info!(
                conn = %ctx.conn_id,
                user = %announce.user_id,
                addr = %ctx.remote_addr,
                recipients = outcome.broadcast.delivered,
                "User online"
            );
        } else {
            debug!(
                conn = %ctx.conn_id,
                user = %announce.user_id,
                "User already online on another connection"
            );
        }
        Ok(())
    }
}
