//! # Host Paths
//!
//! Store paths of the IBC host state (relative to a commitment prefix) and
//! the keys light clients use inside their own client-prefixed store.

use crate::height::Height;

/// Key of the client state inside a client store.
pub const CLIENT_STATE_KEY: &str = "clientState";

/// Prefix of every client's store in the host namespace.
pub const CLIENTS_PREFIX: &str = "clients/";

/// Key of the consensus state at `height` inside a client store.
pub fn consensus_state_key(height: &Height) -> String {
    format!("consensusStates/{height}")
}

/// Whether `key` is a consensus-state key of a client store.
pub fn is_consensus_state_key(key: &[u8]) -> bool {
    std::str::from_utf8(key)
        .ok()
        .and_then(|s| s.strip_prefix("consensusStates/"))
        .map(|h| h.parse::<Height>().is_ok())
        .unwrap_or(false)
}

/// Prefix of the client store for `client_id`.
pub fn client_store_prefix(client_id: &str) -> String {
    format!("{CLIENTS_PREFIX}{client_id}/")
}

/// `clients/<id>/clientState`
pub fn client_state_path(client_id: &str) -> String {
    format!("{}{CLIENT_STATE_KEY}", client_store_prefix(client_id))
}

/// `clients/<id>/consensusStates/<height>`
pub fn consensus_state_path(client_id: &str, height: &Height) -> String {
    format!("{}{}", client_store_prefix(client_id), consensus_state_key(height))
}

/// `connections/<id>`
pub fn connection_path(connection_id: &str) -> String {
    format!("connections/{connection_id}")
}

/// `channels/<port>/<channel>`
pub fn channel_path(port_id: &str, channel_id: &str) -> String {
    format!("channels/{port_id}/{channel_id}")
}

/// `commitments/<port>/<channel>/<seq>`
pub fn packet_commitment_path(port_id: &str, channel_id: &str, sequence: u64) -> String {
    format!("commitments/{port_id}/{channel_id}/{sequence}")
}

/// `acks/<port>/<channel>/<seq>`
pub fn packet_acknowledgement_path(port_id: &str, channel_id: &str, sequence: u64) -> String {
    format!("acks/{port_id}/{channel_id}/{sequence}")
}

/// `receipts/<port>/<channel>/<seq>`
pub fn packet_receipt_path(port_id: &str, channel_id: &str, sequence: u64) -> String {
    format!("receipts/{port_id}/{channel_id}/{sequence}")
}

/// `nextSequenceSend/<port>/<channel>`
pub fn next_sequence_send_path(port_id: &str, channel_id: &str) -> String {
    format!("nextSequenceSend/{port_id}/{channel_id}")
}

/// `nextSequenceRecv/<port>/<channel>`
pub fn next_sequence_recv_path(port_id: &str, channel_id: &str) -> String {
    format!("nextSequenceRecv/{port_id}/{channel_id}")
}

/// `block/<height>`: upstream block time exposed by a proxy.
pub fn upstream_block_path(height: &Height) -> String {
    format!("block/{height}")
}
