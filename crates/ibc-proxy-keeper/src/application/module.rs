//! # Bootstrap Module Callbacks
//!
//! Channel and packet callbacks of the `proxy` port. Channels carry only
//! bootstrap requests; they cannot be closed by users.

use ibc_proxy_types::{Acknowledgement, ChannelCounterparty, Order, Packet};
use tracing::debug;

use crate::application::keeper::ProxyKeeper;
use crate::domain::ProxyError;
use crate::ports::{IbcModule, ProxyHost};

impl<H: ProxyHost> ProxyKeeper<H> {
    fn check_port(&self, port_id: &str) -> Result<(), ProxyError> {
        if port_id != self.config().port_id {
            return Err(ProxyError::InvalidChannelOperation(format!(
                "invalid port {port_id}, expected {}",
                self.config().port_id
            )));
        }
        Ok(())
    }

    fn check_version(&self, version: &str) -> Result<(), ProxyError> {
        if version != self.config().version {
            return Err(ProxyError::InvalidVersion(format!(
                "got {version}, expected {}",
                self.config().version
            )));
        }
        Ok(())
    }
}

impl<H: ProxyHost> IbcModule for ProxyKeeper<H> {
    fn on_chan_open_init(
        &self,
        _order: Order,
        _connection_hops: &[String],
        port_id: &str,
        channel_id: &str,
        _counterparty: &ChannelCounterparty,
        version: &str,
    ) -> Result<String, ProxyError> {
        self.check_port(port_id)?;
        if !version.is_empty() {
            self.check_version(version)?;
        }
        debug!(port_id, channel_id, "[proxy-module] channel open init");
        Ok(self.config().version.clone())
    }

    fn on_chan_open_try(
        &self,
        _order: Order,
        _connection_hops: &[String],
        port_id: &str,
        channel_id: &str,
        _counterparty: &ChannelCounterparty,
        counterparty_version: &str,
    ) -> Result<String, ProxyError> {
        self.check_port(port_id)?;
        self.check_version(counterparty_version)?;
        debug!(port_id, channel_id, "[proxy-module] channel open try");
        Ok(self.config().version.clone())
    }

    fn on_chan_open_ack(
        &self,
        _port_id: &str,
        _channel_id: &str,
        _counterparty_channel_id: &str,
        counterparty_version: &str,
    ) -> Result<(), ProxyError> {
        self.check_version(counterparty_version)
    }

    fn on_chan_open_confirm(&self, _port_id: &str, _channel_id: &str) -> Result<(), ProxyError> {
        Ok(())
    }

    fn on_chan_close_init(&self, _port_id: &str, _channel_id: &str) -> Result<(), ProxyError> {
        Err(ProxyError::InvalidChannelOperation("user cannot close channel".into()))
    }

    fn on_chan_close_confirm(&self, _port_id: &str, _channel_id: &str) -> Result<(), ProxyError> {
        Ok(())
    }

    fn on_recv_packet(&self, packet: &Packet) -> Acknowledgement {
        self.on_recv_proxy_request(packet)
    }

    fn on_acknowledgement_packet(
        &self,
        packet: &Packet,
        acknowledgement: &[u8],
    ) -> Result<(), ProxyError> {
        let ack = Acknowledgement::from_json_bytes(acknowledgement)?;
        self.on_proxy_request_acknowledgement(packet, &ack)?;
        Ok(())
    }

    fn on_timeout_packet(&self, packet: &Packet) -> Result<(), ProxyError> {
        self.on_proxy_request_timeout(packet)
    }
}
