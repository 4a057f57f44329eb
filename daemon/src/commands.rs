//! Command execution. Every command renders its outcome as JSON.

use anyhow::Result;
use serde_json::{json, Value};

use ballot_election::{ElectionProcessor, RecordKey};
use ballot_store_lmdb::LmdbLedger;
use ballot_types::{CandidateId, ReceiptId};

use crate::cli::{HistoryTarget, LedgerCommand};

pub fn run(processor: &ElectionProcessor<LmdbLedger>, command: LedgerCommand) -> Result<Value> {
    let output = match command {
        LedgerCommand::Init => {
            processor.init_election()?;
            let candidates: Vec<_> = processor.roster().iter().map(|e| e.id.to_string()).collect();
            json!({ "initialized": candidates })
        }
        LedgerCommand::Cast {
            receipt,
            candidate,
            region,
        } => serde_json::to_value(processor.cast_vote(&receipt, &candidate, &region)?)?,
        LedgerCommand::Vote { receipt } => serde_json::to_value(processor.get_vote(&receipt)?)?,
        LedgerCommand::Results => serde_json::to_value(processor.get_results()?)?,
        LedgerCommand::History { target } => {
            let key = match target {
                HistoryTarget::Vote { receipt } => RecordKey::Vote(ReceiptId::new(receipt)?),
                HistoryTarget::Candidate { id } => RecordKey::Candidate(CandidateId::new(id)?),
            };
            serde_json::to_value(processor.get_history(&key)?)?
        }
        LedgerCommand::Audit => {
            let audit = processor.audit_tally()?;
            json!({ "consistent": audit.is_consistent(), "audit": audit })
        }
        LedgerCommand::Events => {
            let events: Vec<Value> = processor
                .store()
                .events()?
                .into_iter()
                .map(|e| {
                    json!({
                        "topic": e.topic,
                        "payload": String::from_utf8_lossy(&e.payload),
                    })
                })
                .collect();
            Value::Array(events)
        }
    };
    Ok(output)
}
