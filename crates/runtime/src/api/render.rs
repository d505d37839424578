//! Display rendering of action records.
//!
//! The UI shows the same JSON shape the document store persists, so a record
//! can be re-rendered after a reload without re-running any phase.
use serde_json::Value;

use tactics_core::ActionRecord;

use super::errors::{Result, RuntimeError};

/// Serializes a record for display.
pub fn render_record(record: &ActionRecord) -> Result<Value> {
    serde_json::to_value(record).map_err(RuntimeError::Render)
}

/// Pretty-printed form of [`render_record`].
pub fn render_record_pretty(record: &ActionRecord) -> Result<String> {
    serde_json::to_string_pretty(record).map_err(RuntimeError::Render)
}

/// Restores a record from its rendered form.
pub fn parse_record(value: Value) -> Result<ActionRecord> {
    serde_json::from_value(value).map_err(RuntimeError::Render)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactics_core::{ActionId, ActorId, Outcome, RecordId, ResolvedTags, ResourceKind};

    #[test]
    fn rendered_record_reloads_unchanged() {
        let action = ActionId::new("strike");
        let mut outcome = Outcome::new(ActorId(2), false);
        outcome.resources.add(ResourceKind::Health, -5);
        outcome.push_status("-5 health", tactics_core::StatusTone::Damage);
        let record = ActionRecord {
            id: RecordId::derive(&action, ActorId(1), 3),
            action,
            actor: ActorId(1),
            nonce: 3,
            tags: ResolvedTags::default(),
            usage: Default::default(),
            outcomes: vec![outcome],
            confirmed: true,
            negated: false,
            applied_effects: Vec::new(),
        };

        let json = render_record(&record).unwrap();
        assert_eq!(json["confirmed"], serde_json::json!(true));
        assert_eq!(json["outcomes"][0]["resources"]["health"], serde_json::json!(-5));
        assert_eq!(parse_record(json).unwrap(), record);
    }
}
