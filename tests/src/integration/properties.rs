//! # Properties
//!
//! Commitment and delay properties checked over generated inputs.

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use ibc_proxy_client::algorithms::{verify_membership, verify_non_membership};
    use ibc_proxy_client::{CommitmentProof, ProofContext};
    use ibc_proxy_keeper::{block_delay, InMemoryHost, ProxyConfig, ProxyKeys};
    use ibc_proxy_types::path::client_state_path;
    use ibc_proxy_types::{decode, CommitmentPrefix, Height, KvStore};
    use proptest::prelude::*;

    use crate::harness::BLOCK_TIME;
    use crate::integration::proxy_flow::ProxyNetwork;

    #[test]
    fn test_zero_expected_block_time_has_no_block_delay() {
        for time_delay in [0, 1, BLOCK_TIME, u64::MAX] {
            assert_eq!(block_delay(time_delay, 0), 0);
        }
    }

    #[test]
    fn test_metrics_report_proxy_activity() -> anyhow::Result<()> {
        ibc_proxy_telemetry::register_metrics()?;
        ibc_proxy_telemetry::register_metrics()?;

        let mut net = ProxyNetwork::build()?;
        net.commit_upstream()?;
        let upstream = &net.upstream;
        let proof = upstream.proof(&client_state_path(&net.downstream_client_id))?;
        net.proxy.keeper().verify_and_proxy_client_state(
            &net.upstream_client_id,
            ProofContext::new(upstream.height()?, upstream.prefix(), &proof),
            &net.downstream_client_id,
            &upstream.client_state(&net.downstream_client_id)?,
        )?;

        let text = ibc_proxy_telemetry::encode_metrics()?;
        assert!(text.contains("ibc_proxy_verifications_total"));
        assert!(text.contains("ibc_proxy_commitments_written_total"));
        Ok(())
    }

    fn entries() -> impl Strategy<Value = BTreeMap<Vec<u8>, Vec<u8>>> {
        prop::collection::btree_map(
            prop::collection::vec(any::<u8>(), 1..16),
            prop::collection::vec(any::<u8>(), 0..32),
            1..24,
        )
    }

    proptest! {
        #[test]
        fn test_block_delay_is_monotonic(
            a in 0u64..1_000_000_000_000,
            b in 0u64..1_000_000_000_000,
            expected in 0u64..10_000_000_000,
        ) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(block_delay(low, expected) <= block_delay(high, expected));
        }

        #[test]
        fn test_committed_store_proves_every_entry(entries in entries(), absent in prop::collection::vec(any::<u8>(), 17..20)) {
            let host = InMemoryHost::new("chain-x", &ProxyConfig::for_testing());
            for (key, value) in &entries {
                host.memory_store().set(key, value.clone());
            }
            let block = host.commit_block(BLOCK_TIME);
            let root = block.header.root;

            for (key, value) in &entries {
                let proof: CommitmentProof = decode(&block.prove(key).unwrap()).unwrap();
                prop_assert!(verify_membership(&root, &proof, key, value).is_ok());
                let mut tampered = value.clone();
                tampered.push(0);
                prop_assert!(verify_membership(&root, &proof, key, &tampered).is_err());
            }
            let proof: CommitmentProof = decode(&block.prove(&absent).unwrap()).unwrap();
            prop_assert!(verify_non_membership(&root, &proof, &absent).is_ok());
        }

        #[test]
        fn test_proxy_keys_stay_inside_upstream_namespace(
            upstream in "[a-z]{1,8}-[0-9]{1,3}",
            other in "[a-z]{1,8}-[0-9]{1,3}",
            revision_height in 1u64..1_000_000,
        ) {
            let keys = ProxyKeys::new(CommitmentPrefix::new(b"proxy/".to_vec()));
            let prefix = CommitmentPrefix::new(b"ibc/".to_vec());
            let namespace = format!("proxy/{upstream}/").into_bytes();

            let connection = keys.connection(&upstream, &prefix, "connection-0");
            prop_assert!(connection.starts_with(&namespace));
            let block = keys.block_time(&upstream, &Height::new(0, revision_height));
            prop_assert!(block.starts_with(&namespace));
            if other != upstream {
                prop_assert_ne!(connection, keys.connection(&other, &prefix, "connection-0"));
            }
        }
    }
}
