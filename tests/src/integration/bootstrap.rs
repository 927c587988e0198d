//! # Proxy Client Bootstrap
//!
//! The downstream asks the proxy for a proxy client of the upstream over
//! the `proxy` port, then uses the bootstrapped client.

use anyhow::Result;
use ibc_proxy_keeper::{PROXY_PORT_ID, PROXY_VERSION};
use ibc_proxy_types::{
    ChannelCounterparty, ChannelEnd, ChannelState, ConnectionCounterparty, ConnectionEnd,
    ConnectionState, Order, Version,
};

use crate::integration::proxy_flow::ProxyNetwork;

/// Channel of the `proxy` port on both ends.
pub const BOOTSTRAP_CHANNEL: &str = "channel-0";

/// Open a `proxy` channel on the downstream over its client of the proxy.
pub fn open_bootstrap_channel(net: &ProxyNetwork) -> Result<()> {
    let host = net.downstream.host();
    host.set_connection(
        "connection-0",
        &ConnectionEnd {
            state: ConnectionState::Open,
            client_id: net.wrapped_client_id.clone(),
            counterparty: ConnectionCounterparty {
                client_id: "merkle-1".into(),
                connection_id: "connection-0".into(),
                prefix: net.proxy.prefix().clone(),
            },
            versions: vec![Version::default_ibc()],
            delay_period: 0,
        },
    )?;
    host.set_channel(
        PROXY_PORT_ID,
        BOOTSTRAP_CHANNEL,
        &ChannelEnd {
            state: ChannelState::Open,
            ordering: Order::Unordered,
            counterparty: ChannelCounterparty::new(PROXY_PORT_ID, BOOTSTRAP_CHANNEL),
            connection_hops: vec!["connection-0".into()],
            version: PROXY_VERSION.into(),
        },
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ibc_proxy_client::{ClientError, LightClient, ProofContext, Status};
    use ibc_proxy_keeper::{
        AckStatus, BootstrapState, ClientKeeper, IbcModule, ProxyRequestAcknowledgement,
        UpstreamState,
    };
    use ibc_proxy_types::path::client_state_path;
    use ibc_proxy_types::{Acknowledgement, CommitmentPrefix, Height};

    fn timeout() -> Height {
        Height::new(0, 1_000)
    }

    #[test]
    fn test_bootstrapped_client_reads_proxied_facts() -> Result<()> {
        let mut net = ProxyNetwork::build()?;
        open_bootstrap_channel(&net)?;
        net.proxy.keeper().enable_proxy(&net.upstream_client_id)?;

        let downstream = net.downstream.keeper();
        let (packet, proxy_client_id) = downstream.send_proxy_request(
            PROXY_PORT_ID,
            BOOTSTRAP_CHANNEL,
            &net.upstream_client_id,
            timeout(),
            0,
        )?;
        let ack = net.proxy.keeper().on_recv_packet(&packet);
        assert!(ack.is_success());
        downstream.on_acknowledgement_packet(&packet, &ack.to_json_bytes()?)?;
        assert_eq!(
            downstream.bootstrap_state(&proxy_client_id)?,
            BootstrapState::Fulfilled
        );

        net.commit_upstream()?;
        let upstream = &net.upstream;
        let client_state = upstream.client_state(&net.downstream_client_id)?;
        let proof = upstream.proof(&client_state_path(&net.downstream_client_id))?;
        net.proxy.keeper().verify_and_proxy_client_state(
            &net.upstream_client_id,
            ProofContext::new(upstream.height()?, upstream.prefix(), &proof),
            &net.downstream_client_id,
            &client_state,
        )?;
        net.proxy.commit();
        net.coordinator
            .update_proxy_client(&net.downstream, &proxy_client_id, &net.proxy, None)?;

        let key = net.keys().client_state(
            &net.upstream_client_id,
            upstream.prefix(),
            &net.downstream_client_id,
        );
        let proof = net.proxy.proof_key(&key)?;
        let bootstrapped = net.downstream.client_state(&proxy_client_id)?;
        bootstrapped.verify_client_state(
            &net.downstream.host().client_store(&proxy_client_id),
            ProofContext::new(net.proxy.height()?, upstream.prefix(), &proof),
            &net.downstream_client_id,
            &client_state,
        )?;
        Ok(())
    }

    #[test]
    fn test_error_status_leaves_placeholder_unusable() -> Result<()> {
        let net = ProxyNetwork::build()?;
        open_bootstrap_channel(&net)?;
        let downstream = net.downstream.keeper();
        let (packet, proxy_client_id) = downstream.send_proxy_request(
            PROXY_PORT_ID,
            BOOTSTRAP_CHANNEL,
            &net.upstream_client_id,
            timeout(),
            0,
        )?;

        let (height, consensus_state) = net.proxy.latest_consensus_state(&net.upstream_client_id)?;
        let reply = ProxyRequestAcknowledgement {
            status: AckStatus::Error,
            proxy_prefix: net.proxy.keeper().config().proxy_prefix.clone(),
            ibc_prefix: net.proxy.prefix().clone(),
            upstream_state: UpstreamState::new(
                height,
                &net.proxy.client_state(&net.upstream_client_id)?,
                &consensus_state,
            )?,
        };
        let ack = Acknowledgement::Result(reply.to_bytes()?);
        downstream.on_acknowledgement_packet(&packet, &ack.to_json_bytes()?)?;
        assert_eq!(
            downstream.bootstrap_state(&proxy_client_id)?,
            BootstrapState::Failed
        );

        let placeholder = net.downstream.client_state(&proxy_client_id)?;
        let err = placeholder
            .verify_client_state(
                &net.downstream.host().client_store(&proxy_client_id),
                ProofContext::new(net.proxy.height()?, net.upstream.prefix(), &[1]),
                &net.downstream_client_id,
                &placeholder,
            )
            .unwrap_err();
        assert!(matches!(err, ClientError::UninitializedProxy));
        Ok(())
    }

    #[test]
    fn test_incomplete_ok_reply_fails_request() -> Result<()> {
        let net = ProxyNetwork::build()?;
        open_bootstrap_channel(&net)?;
        let downstream = net.downstream.keeper();
        let (height, consensus_state) = net.proxy.latest_consensus_state(&net.upstream_client_id)?;
        let upstream_client = net.proxy.client_state(&net.upstream_client_id)?;
        let complete = ProxyRequestAcknowledgement {
            status: AckStatus::Ok,
            proxy_prefix: net.proxy.keeper().config().proxy_prefix.clone(),
            ibc_prefix: net.proxy.prefix().clone(),
            upstream_state: UpstreamState::new(height, &upstream_client, &consensus_state)?,
        };
        let replies = [
            ProxyRequestAcknowledgement {
                proxy_prefix: CommitmentPrefix::new(Vec::new()),
                ..complete.clone()
            },
            ProxyRequestAcknowledgement {
                ibc_prefix: CommitmentPrefix::new(Vec::new()),
                ..complete.clone()
            },
            ProxyRequestAcknowledgement {
                upstream_state: UpstreamState::new(
                    Height::zero(),
                    &upstream_client,
                    &consensus_state,
                )?,
                ..complete
            },
        ];

        for reply in replies {
            let (packet, proxy_client_id) = downstream.send_proxy_request(
                PROXY_PORT_ID,
                BOOTSTRAP_CHANNEL,
                &net.upstream_client_id,
                timeout(),
                0,
            )?;
            let ack = Acknowledgement::Result(reply.to_bytes()?);
            downstream.on_acknowledgement_packet(&packet, &ack.to_json_bytes()?)?;
            assert_eq!(
                downstream.bootstrap_state(&proxy_client_id)?,
                BootstrapState::Failed
            );

            let placeholder = net.downstream.client_state(&proxy_client_id)?;
            let client_store = net.downstream.host().client_store(&proxy_client_id);
            assert_eq!(placeholder.status(&client_store), Status::Unknown);
            let err = placeholder
                .verify_client_state(
                    &client_store,
                    ProofContext::new(net.proxy.height()?, net.upstream.prefix(), &[1]),
                    &net.downstream_client_id,
                    &placeholder,
                )
                .unwrap_err();
            assert!(matches!(err, ClientError::UninitializedProxy));
        }
        Ok(())
    }

    #[test]
    fn test_refused_request_fails_downstream() -> Result<()> {
        let net = ProxyNetwork::build()?;
        open_bootstrap_channel(&net)?;
        let downstream = net.downstream.keeper();
        let (packet, proxy_client_id) = downstream.send_proxy_request(
            PROXY_PORT_ID,
            BOOTSTRAP_CHANNEL,
            &net.upstream_client_id,
            timeout(),
            0,
        )?;

        let ack = net.proxy.keeper().on_recv_packet(&packet);
        assert!(!ack.is_success());
        downstream.on_acknowledgement_packet(&packet, &ack.to_json_bytes()?)?;
        assert_eq!(
            downstream.bootstrap_state(&proxy_client_id)?,
            BootstrapState::Failed
        );
        Ok(())
    }
}
