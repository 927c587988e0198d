//! # Inbound Ports
//!
//! Entry points into the proxy keeper: the relayer message handler and the
//! channel callbacks of the bootstrap module.

use ibc_proxy_types::{Acknowledgement, ChannelCounterparty, Order, Packet};

use crate::domain::{ProxyError, ProxyMsg};

/// Relayer message handler - inbound port.
pub trait ProxyMsgHandler {
    /// Validate and dispatch one message.
    fn handle(&self, msg: ProxyMsg) -> Result<(), ProxyError>;
}

/// Channel and packet callbacks of an IBC application - inbound port.
pub trait IbcModule {
    /// `ChanOpenInit` on this chain. Returns the channel version.
    fn on_chan_open_init(
        &self,
        order: Order,
        connection_hops: &[String],
        port_id: &str,
        channel_id: &str,
        counterparty: &ChannelCounterparty,
        version: &str,
    ) -> Result<String, ProxyError>;

    /// `ChanOpenTry` on this chain. Returns the channel version.
    fn on_chan_open_try(
        &self,
        order: Order,
        connection_hops: &[String],
        port_id: &str,
        channel_id: &str,
        counterparty: &ChannelCounterparty,
        counterparty_version: &str,
    ) -> Result<String, ProxyError>;

    /// `ChanOpenAck` on this chain.
    fn on_chan_open_ack(
        &self,
        port_id: &str,
        channel_id: &str,
        counterparty_channel_id: &str,
        counterparty_version: &str,
    ) -> Result<(), ProxyError>;

    /// `ChanOpenConfirm` on this chain.
    fn on_chan_open_confirm(&self, port_id: &str, channel_id: &str) -> Result<(), ProxyError>;

    /// User-initiated channel close.
    fn on_chan_close_init(&self, port_id: &str, channel_id: &str) -> Result<(), ProxyError>;

    /// Counterparty-initiated channel close.
    fn on_chan_close_confirm(&self, port_id: &str, channel_id: &str) -> Result<(), ProxyError>;

    /// A packet arrived. Failures are reported in the acknowledgement.
    fn on_recv_packet(&self, packet: &Packet) -> Acknowledgement;

    /// A sent packet was acknowledged; `acknowledgement` is the raw
    /// channel-level envelope.
    fn on_acknowledgement_packet(
        &self,
        packet: &Packet,
        acknowledgement: &[u8],
    ) -> Result<(), ProxyError>;

    /// A sent packet timed out.
    fn on_timeout_packet(&self, packet: &Packet) -> Result<(), ProxyError>;
}
