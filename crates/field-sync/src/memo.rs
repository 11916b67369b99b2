use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::evaluate::{EvaluationResult, evaluate};
use crate::schema::FieldDefinition;

type Subscriber = Box<dyn FnMut(&EvaluationResult)>;

/// Caches the last evaluation and recomputes only when the schema or the form values
/// change by content.
///
/// Form hosts rebuild value objects on every keystroke, so identity says nothing.
/// Inputs are fingerprinted by hashing their JSON serialization (object keys are
/// ordered, so equal content hashes equally); subscribers hear about a result only
/// when a fingerprint change forced a recomputation.
#[derive(Default)]
pub struct MemoizedEvaluator {
    fingerprint: Option<blake3::Hash>,
    result: EvaluationResult,
    evaluations: u64,
    subscribers: Vec<Subscriber>,
}

impl MemoizedEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback run after every recomputation.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&EvaluationResult) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn evaluate(&mut self, fields: &[FieldDefinition], values: &Value) -> &EvaluationResult {
        let fingerprint = fingerprint(fields, values);
        if fingerprint.is_some() && fingerprint == self.fingerprint {
            tracing::trace!("inputs unchanged; reusing cached evaluation");
            return &self.result;
        }

        self.result = evaluate(fields, values);
        self.evaluations += 1;
        self.fingerprint = fingerprint;
        tracing::debug!(evaluations = self.evaluations, "recomputed field dependencies");

        for subscriber in &mut self.subscribers {
            subscriber(&self.result);
        }
        &self.result
    }

    /// How many times the underlying evaluator actually ran.
    pub fn evaluation_count(&self) -> u64 {
        self.evaluations
    }

    pub fn last_result(&self) -> Option<&EvaluationResult> {
        self.fingerprint.map(|_| &self.result)
    }

    /// Forgets the cached inputs so the next call recomputes.
    pub fn invalidate(&mut self) {
        self.fingerprint = None;
    }
}

impl fmt::Debug for MemoizedEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoizedEvaluator")
            .field("fingerprint", &self.fingerprint.map(|hash| hash.to_hex()))
            .field("evaluations", &self.evaluations)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

/// `None` when an input cannot be serialized; such inputs are never treated as cached.
///
/// Object members are hashed in key order whatever order the map keeps them in, so
/// equal content fingerprints equally with or without `serde_json/preserve_order`.
fn fingerprint(fields: &[FieldDefinition], values: &Value) -> Option<blake3::Hash> {
    let fields = serde_json::to_value(fields)
        .inspect_err(|err| tracing::warn!(error = %err, "could not fingerprint evaluation input"))
        .ok()?;
    let mut hasher = blake3::Hasher::new();
    write_canonical(&mut hasher, &fields)?;
    hasher.update(&[0]);
    write_canonical(&mut hasher, values)?;
    Some(hasher.finalize())
}

fn write_canonical(hasher: &mut blake3::Hasher, value: &Value) -> Option<()> {
    match value {
        Value::Object(map) => {
            let mut members: Vec<(&String, &Value)> = map.iter().collect();
            members.sort_unstable_by(|a, b| a.0.cmp(b.0));
            hasher.update(b"{");
            for (key, member) in members {
                write_json(hasher, key)?;
                hasher.update(b":");
                write_canonical(hasher, member)?;
                hasher.update(b",");
            }
            hasher.update(b"}");
        }
        Value::Array(items) => {
            hasher.update(b"[");
            for item in items {
                write_canonical(hasher, item)?;
                hasher.update(b",");
            }
            hasher.update(b"]");
        }
        scalar => write_json(hasher, scalar)?,
    }
    Some(())
}

fn write_json<T: Serialize + ?Sized>(hasher: &mut blake3::Hasher, value: &T) -> Option<()> {
    serde_json::to_writer(&mut *hasher, value)
        .inspect_err(|err| tracing::warn!(error = %err, "could not fingerprint evaluation input"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};

    #[test]
    fn member_order_does_not_change_fingerprint() {
        let mut forward = Map::new();
        forward.insert("a".into(), json!(1));
        forward.insert("b".into(), json!({ "x": [1, 2], "y": null }));
        let mut backward = Map::new();
        backward.insert("b".into(), json!({ "y": null, "x": [1, 2] }));
        backward.insert("a".into(), json!(1));

        let fields = [FieldDefinition::leaf("a")];
        assert_eq!(
            fingerprint(&fields, &Value::Object(forward)),
            fingerprint(&fields, &Value::Object(backward))
        );
        assert_ne!(
            fingerprint(&fields, &json!({ "a": [1, 2] })),
            fingerprint(&fields, &json!({ "a": [[1], 2] }))
        );
    }
}
