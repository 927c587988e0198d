//! # Domain Invariants
//!
//! Checks shared by the keeper operations.

use ibc_proxy_types::{CommitmentPrefix, ConnectionEnd, Order};

use crate::domain::errors::ProxyError;
use crate::domain::value_objects::BootstrapState;

/// Proxied facts are only committed for upstreams using the same IBC
/// prefix as this chain, since the commitment key embeds it.
pub fn invariant_prefix_matches(
    expected: &CommitmentPrefix,
    got: &CommitmentPrefix,
) -> Result<(), ProxyError> {
    if expected != got {
        return Err(ProxyError::InvalidPrefix {
            expected: expected.to_string(),
            got: got.to_string(),
        });
    }
    Ok(())
}

/// Bootstrap requests only leave `Requested`, and only once.
pub fn invariant_bootstrap_transition(
    client_id: &str,
    from: BootstrapState,
    to: BootstrapState,
) -> Result<(), ProxyError> {
    if !from.can_transition_to(to) {
        return Err(ProxyError::InvalidBootstrapTransition {
            client_id: client_id.to_string(),
            from,
            to,
        });
    }
    Ok(())
}

/// A channel can only open over a connection that negotiated exactly one
/// version, and that version must support the channel ordering.
pub fn invariant_connection_supports_order(
    connection: &ConnectionEnd,
    order: Order,
) -> Result<(), ProxyError> {
    let [version] = connection.versions.as_slice() else {
        return Err(ProxyError::InvalidVersion(format!(
            "single version must be negotiated on connection before opening channel, got {}",
            connection.versions.len()
        )));
    };
    if !version.supports_feature(order.as_feature()) {
        return Err(ProxyError::InvalidVersion(format!(
            "connection version {} does not support channel ordering {}",
            version.identifier,
            order.as_feature()
        )));
    }
    Ok(())
}
