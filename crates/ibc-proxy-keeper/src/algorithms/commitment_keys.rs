//! # Commitment Key Layout
//!
//! Keys of the proxy namespace, relative to the chain store. An upstream
//! fact stored by the upstream at `<upstream_prefix><path>` is re-committed
//! at `<proxy_prefix><upstream_client_id>/<upstream_prefix><path>`, the
//! same key a proxy client on a downstream chain derives from its composed
//! prefix. Client-store facts keep the upstream's `clients/<id>/` layout.

use ibc_proxy_types::{path, CommitmentPrefix, Height};

/// Receipt absences are recorded with this value.
pub const RECEIPT_ABSENCE_VALUE: &[u8] = &[1];

/// `receiptAbsences/<port>/<channel>/<seq>`
pub fn packet_receipt_absence_path(port_id: &str, channel_id: &str, sequence: u64) -> String {
    format!("receiptAbsences/{port_id}/{channel_id}/{sequence}")
}

/// `proxyEnabled/<client_id>`: outside the proxied namespace.
pub fn proxy_enabled_key(client_id: &str) -> Vec<u8> {
    format!("proxyEnabled/{client_id}").into_bytes()
}

/// `proxyRequests/<proxy_client_id>`: bootstrap request state on the
/// downstream chain.
pub fn bootstrap_request_key(proxy_client_id: &str) -> Vec<u8> {
    format!("proxyRequests/{proxy_client_id}").into_bytes()
}

/// Key layout of one proxy namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyKeys {
    proxy_prefix: CommitmentPrefix,
}

impl ProxyKeys {
    /// Layout rooted at `proxy_prefix`.
    pub fn new(proxy_prefix: CommitmentPrefix) -> Self {
        Self { proxy_prefix }
    }

    /// Full key of an upstream fact stored at `path` under `upstream_prefix`.
    pub fn upstream_key(
        &self,
        upstream_client_id: &str,
        upstream_prefix: &CommitmentPrefix,
        path: &str,
    ) -> Vec<u8> {
        CommitmentPrefix::compose(&self.proxy_prefix, upstream_client_id, upstream_prefix)
            .apply_path(path)
    }

    /// Client state of `counterparty_client_id` on the upstream.
    pub fn client_state(
        &self,
        upstream_client_id: &str,
        upstream_prefix: &CommitmentPrefix,
        counterparty_client_id: &str,
    ) -> Vec<u8> {
        self.upstream_key(
            upstream_client_id,
            upstream_prefix,
            &path::client_state_path(counterparty_client_id),
        )
    }

    /// Consensus state of `counterparty_client_id` on the upstream.
    pub fn consensus_state(
        &self,
        upstream_client_id: &str,
        upstream_prefix: &CommitmentPrefix,
        counterparty_client_id: &str,
        height: &Height,
    ) -> Vec<u8> {
        self.upstream_key(
            upstream_client_id,
            upstream_prefix,
            &path::consensus_state_path(counterparty_client_id, height),
        )
    }

    /// Connection end on the upstream.
    pub fn connection(
        &self,
        upstream_client_id: &str,
        upstream_prefix: &CommitmentPrefix,
        connection_id: &str,
    ) -> Vec<u8> {
        self.upstream_key(
            upstream_client_id,
            upstream_prefix,
            &path::connection_path(connection_id),
        )
    }

    /// Channel end on the upstream.
    pub fn channel(
        &self,
        upstream_client_id: &str,
        upstream_prefix: &CommitmentPrefix,
        port_id: &str,
        channel_id: &str,
    ) -> Vec<u8> {
        self.upstream_key(
            upstream_client_id,
            upstream_prefix,
            &path::channel_path(port_id, channel_id),
        )
    }

    /// Upstream block time at `height`. Independent of any caller prefix.
    pub fn block_time(&self, upstream_client_id: &str, height: &Height) -> Vec<u8> {
        self.upstream_key(
            upstream_client_id,
            &CommitmentPrefix::default(),
            &path::upstream_block_path(height),
        )
    }
}
