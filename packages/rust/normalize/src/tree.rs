//! Tree assembly: a list response in, ordered canonical classes out.

use lessonmap_shared::ClassItem;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::entity::normalize_class;
use crate::record::{DATA_KEY, RawRecord};

/// Raw records of a list response. A missing or non-array `data` is empty.
pub fn response_records(body: &Value) -> &[Value] {
    body.get(DATA_KEY)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// First raw record of a list response, in response order.
pub fn first_record(body: &Value) -> Option<&Value> {
    response_records(body).first()
}

/// Assemble the Class → Module → Lesson tree from a list response body.
///
/// Records without identity are dropped at every level; their siblings and
/// ancestors are unaffected. Never fails.
#[instrument(skip_all)]
pub fn assemble_tree(body: &Value) -> Vec<ClassItem> {
    let raw = response_records(body);
    let classes: Vec<ClassItem> = raw.iter().filter_map(normalize_class).collect();
    let shape = raw.first().and_then(RawRecord::new).map(|r| r.shape());

    if classes.is_empty() && !raw.is_empty() {
        let first = serde_json::to_string_pretty(&raw[0]).unwrap_or_default();
        warn!(
            raw_count = raw.len(),
            ?shape,
            first_raw = %first,
            "class tree empty after normalization"
        );
    } else {
        debug!(
            raw_count = raw.len(),
            classes = classes.len(),
            ?shape,
            dropped = raw.len() - classes.len(),
            "class tree assembled"
        );
    }

    classes
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn load_fixture(name: &str) -> Value {
        let path = format!("../../../fixtures/cms/{name}");
        let content = std::fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("missing fixture: {path}"));
        serde_json::from_str(&content).expect("fixture is JSON")
    }

    #[test]
    fn empty_data_is_empty_tree() {
        assert!(assemble_tree(&json!({"data": []})).is_empty());
    }

    #[test]
    fn missing_or_mistyped_data_is_empty_tree() {
        assert!(assemble_tree(&json!({})).is_empty());
        assert!(assemble_tree(&json!({"data": null})).is_empty());
        assert!(assemble_tree(&json!({"data": {"id": 1}})).is_empty());
        assert!(assemble_tree(&json!([{"id": 1}])).is_empty());
        assert!(assemble_tree(&Value::Null).is_empty());
    }

    #[test]
    fn all_invalid_records_yield_empty_tree() {
        let body = json!({"data": [{"attributes": {"title": "no id"}}, 42, null]});
        assert!(assemble_tree(&body).is_empty());
    }

    /// Run `f` under a subscriber that writes plain-text logs into a buffer.
    fn capture_logs(f: impl FnOnce()) -> String {
        use std::sync::{Arc, Mutex};

        #[derive(Clone, Default)]
        struct Buffer(Arc<Mutex<Vec<u8>>>);

        impl std::io::Write for Buffer {
            fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(bytes);
                Ok(bytes.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let buffer = Buffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();

        tracing::subscriber::with_default(subscriber, f);

        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn empty_result_from_records_warns_with_first_raw() {
        let body = json!({"data": [{"attributes": {"title": "orphan-class"}}, 42]});
        let logs = capture_logs(|| {
            assert!(assemble_tree(&body).is_empty());
        });

        assert!(logs.contains("WARN"), "no warning in: {logs}");
        assert!(logs.contains("class tree empty after normalization"));
        assert!(logs.contains("first_raw"));
        assert!(logs.contains("orphan-class"));
        assert!(logs.contains("raw_count=2"));
        assert!(logs.contains("shape=Some(Wrapped)"));
    }

    #[test]
    fn empty_data_does_not_warn() {
        let logs = capture_logs(|| {
            assert!(assemble_tree(&json!({"data": []})).is_empty());
        });

        assert!(!logs.contains("WARN"), "unexpected warning in: {logs}");
        assert!(!logs.contains("class tree empty after normalization"));
        assert!(logs.contains("class tree assembled"));
    }

    #[test]
    fn wrapped_fixture_tree() {
        let tree = assemble_tree(&load_fixture("classes.wrapped.json"));

        let slugs: Vec<&str> = tree.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, vec!["statics", "thermo", "dynamics"]);

        let statics = &tree[0];
        assert_eq!(statics.description.as_deref(), Some("Forces at rest."));
        assert_eq!(statics.modules.len(), 2);
        assert_eq!(statics.modules[0].lessons.len(), 2);
        assert_eq!(statics.modules[0].lessons[1].title, "moments");
        assert_eq!(statics.modules[1].slug, "statics-m11");

        let thermo = &tree[1];
        assert_eq!(thermo.title, "thermo");
        assert!(thermo.description.is_none());
        assert_eq!(thermo.modules[0].slug, "thermo-m12");
        assert_eq!(thermo.modules[0].lessons[0].slug, "120");

        let dynamics = &tree[2];
        assert_eq!(dynamics.id.0, 3);
        assert!(dynamics.modules.is_empty());
    }

    #[test]
    fn wrapped_and_flat_payloads_agree() {
        let wrapped = assemble_tree(&load_fixture("classes.wrapped.json"));
        let flat = assemble_tree(&load_fixture("classes.flat.json"));
        assert_eq!(wrapped, flat);
    }

    #[test]
    fn first_record_follows_response_order() {
        let body = json!({"data": [{"id": 2}, {"id": 1}]});
        assert_eq!(first_record(&body), Some(&json!({"id": 2})));
        assert_eq!(first_record(&json!({"data": []})), None);
    }
}
