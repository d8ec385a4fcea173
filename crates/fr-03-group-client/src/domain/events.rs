//! Membership-change events carried in filtered block payloads.

use crate::domain::GroupError;
use prost::Message;
use shared_types::node::FilteredBlock;
use shared_types::{GroupPayload, PARACHAIN_GROUP_EVENT};
use tracing::debug;

/// Find the membership update for `partition` in an encoded [`FilteredBlock`].
///
/// A block may change several partitions; entries for other partitions are
/// ignored and the last entry for `partition` wins. Unparseable event bodies
/// are skipped. Returns `Ok(None)` when the block has no update for
/// `partition`.
pub fn extract_group_update(
    payload: &[u8],
    partition: &str,
) -> Result<Option<GroupPayload>, GroupError> {
    let block = FilteredBlock::decode(payload).map_err(shared_types::PayloadError::from)?;

    let mut latest = None;
    for event in block
        .txs
        .iter()
        .flat_map(|tx| tx.events.iter())
        .filter(|event| event.name == PARACHAIN_GROUP_EVENT)
    {
        match GroupPayload::from_json(&event.body) {
            Ok(group) if group.group_id == partition => latest = Some(group),
            Ok(_) => {}
            Err(e) => debug!(block = %block.blockid, "[fr-03] Skipping bad group event: {}", e),
        }
    }
    Ok(latest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::node::{ContractEvent, FilteredTransaction};

    fn block_with(events: &[(&str, serde_json::Value)]) -> Vec<u8> {
        let txs = events
            .iter()
            .map(|(name, body)| FilteredTransaction {
                txid: "tx".into(),
                events: vec![ContractEvent {
                    contract: "$parachain".into(),
                    name: name.to_string(),
                    body: serde_json::to_vec(body).unwrap(),
                }],
            })
            .collect();
        FilteredBlock {
            bcname: "xuper".into(),
            blockid: "b1".into(),
            block_height: 1,
            txs,
        }
        .encode_to_vec()
    }

    #[test]
    fn test_last_match_wins() {
        let payload = block_with(&[
            (PARACHAIN_GROUP_EVENT, serde_json::json!({"name": "p1", "identities": ["A"]})),
            (PARACHAIN_GROUP_EVENT, serde_json::json!({"name": "p1", "identities": ["B"]})),
        ]);
        let group = extract_group_update(&payload, "p1").unwrap().unwrap();
        assert_eq!(group.identities, vec!["B"]);
    }

    #[test]
    fn test_other_partitions_ignored() {
        let payload = block_with(&[
            (PARACHAIN_GROUP_EVENT, serde_json::json!({"name": "p1", "identities": ["A"]})),
            (PARACHAIN_GROUP_EVENT, serde_json::json!({"name": "p2", "identities": ["B"]})),
        ]);
        assert_eq!(extract_group_update(&payload, "p3").unwrap(), None);
    }

    #[test]
    fn test_other_event_names_ignored() {
        let payload = block_with(&[(
            "Transfer",
            serde_json::json!({"name": "p1", "identities": ["A"]}),
        )]);
        assert_eq!(extract_group_update(&payload, "p1").unwrap(), None);
    }

    #[test]
    fn test_undecodable_block_is_error() {
        assert!(extract_group_update(&[0xff, 0xff, 0xff], "p1").is_err());
    }
}
