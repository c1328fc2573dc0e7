//! G2 — Field Extractor.
//!
//! Pulls field text out of a record tree by dotted path, with `*` wildcard
//! segments that branch over every element of an array or every value of an
//! object. Always total: a path that doesn't resolve yields no values
//! rather than an error, exactly like the scoring kernel it feeds.

use serde_json::Value;

/// A record type field extraction can run against. Implemented for
/// [`serde_json::Value`] out of the box; embedders with their own record
/// representation can implement it directly instead of converting first.
pub trait FieldSource {
    /// Resolve `path` (dot-separated, `*` segments wildcard) against this
    /// record, returning every leaf string value found.
    fn extract(&self, path: &str) -> Vec<String>;
}

impl FieldSource for Value {
    fn extract(&self, path: &str) -> Vec<String> {
        let segments: Vec<&str> = if path.is_empty() {
            Vec::new()
        } else {
            path.split('.').collect()
        };
        let mut out = Vec::new();
        collect_path(self, &segments, &mut out);
        out
    }
}

fn collect_path(value: &Value, segments: &[&str], out: &mut Vec<String>) {
    let Some((head, rest)) = segments.split_first() else {
        collect_leaves(value, out);
        return;
    };

    if *head == "*" {
        match value {
            Value::Array(items) => {
                for item in items {
                    collect_path(item, rest, out);
                }
            }
            Value::Object(map) => {
                for item in map.values() {
                    collect_path(item, rest, out);
                }
            }
            _ => {}
        }
        return;
    }

    if let Value::Object(map) = value {
        if let Some(child) = map.get(*head) {
            collect_path(child, rest, out);
        }
    }
}

/// Collect every scalar value reachable from `value`, recursing through
/// nested arrays/objects with no further path to follow.
fn collect_leaves(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push(b.to_string()),
        Value::Number(n) => out.push(n.to_string()),
        Value::String(s) => out.push(s.clone()),
        Value::Array(items) => {
            for item in items {
                collect_leaves(item, out);
            }
        }
        Value::Object(map) => {
            for item in map.values() {
                collect_leaves(item, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_dotted_path_resolves_to_one_leaf() {
        let record = json!({"title": "Davinci Code", "author": {"name": "Dan Brown"}});
        assert_eq!(record.extract("title"), vec!["Davinci Code".to_string()]);
        assert_eq!(record.extract("author.name"), vec!["Dan Brown".to_string()]);
    }

    #[test]
    fn wildcard_branches_over_array() {
        let record = json!({"tags": ["fiction", "thriller", "bestseller"]});
        let got = record.extract("tags.*");
        assert_eq!(got, vec!["fiction", "thriller", "bestseller"]);
    }

    #[test]
    fn wildcard_branches_over_object_values() {
        let record = json!({"translations": {"en": "hello", "fr": "bonjour"}});
        let mut got = record.extract("translations.*");
        got.sort();
        assert_eq!(got, vec!["bonjour", "hello"]);
    }

    #[test]
    fn nested_wildcard_collects_leaves_under_each_branch() {
        let record = json!({
            "authors": [
                {"name": "Ann"},
                {"name": "Bo"}
            ]
        });
        let mut got = record.extract("authors.*.name");
        got.sort();
        assert_eq!(got, vec!["Ann", "Bo"]);
    }

    #[test]
    fn missing_path_yields_no_values_without_error() {
        let record = json!({"title": "only field"});
        assert!(record.extract("missing.path").is_empty());
        assert!(record.extract("title.nonexistent").is_empty());
    }

    #[test]
    fn wildcard_over_wrong_shape_yields_no_values() {
        let record = json!({"title": "a scalar, not an array"});
        assert!(record.extract("title.*").is_empty());
    }
}
