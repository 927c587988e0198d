//! # Message Router
//!
//! Relayer-facing entry point: stateless checks, then dispatch to the
//! keeper operation.

use tracing::{debug, warn};

use crate::application::keeper::ProxyKeeper;
use crate::domain::{ProxyError, ProxyMsg};
use crate::ports::{ProxyHost, ProxyMsgHandler};

impl<H: ProxyHost> ProxyMsgHandler for ProxyKeeper<H> {
    fn handle(&self, msg: ProxyMsg) -> Result<(), ProxyError> {
        let name = msg.name();
        if let Err(e) = msg.validate_basic() {
            warn!(msg = name, error = %e, "[proxy-router] malformed message");
            return Err(e);
        }
        debug!(msg = name, "[proxy-router] dispatching");

        match &msg {
            ProxyMsg::ClientState(m) => self.proxy_client_state(m),
            ProxyMsg::ConnectionOpenTry(m) => self.conn_open_try(m),
            ProxyMsg::ConnectionOpenAck(m) => self.conn_open_ack(m),
            ProxyMsg::ConnectionOpenConfirm(m) => self.conn_open_confirm(m),
            ProxyMsg::ConnectionOpenFinalize(m) => self.conn_open_finalize(m),
            ProxyMsg::ChannelOpenTry(m) => self.chan_open_try(m),
            ProxyMsg::ChannelOpenAck(m) => self.chan_open_ack(m),
            ProxyMsg::ChannelOpenConfirm(m) => self.chan_open_confirm(m),
            ProxyMsg::ChannelOpenFinalize(m) => self.chan_open_finalize(m),
            ProxyMsg::RecvPacket(m) => self.recv_packet(m),
            ProxyMsg::AcknowledgePacket(m) => self.acknowledge_packet(m),
            ProxyMsg::TimeoutPacket(m) => self.timeout_packet(m),
            ProxyMsg::UpstreamBlockTime(m) => self.proxy_upstream_block_time_msg(m).map(|_| ()),
        }
    }
}
