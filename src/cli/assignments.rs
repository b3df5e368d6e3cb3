//! `KEY=VALUE` arguments of the `set` command.

use serde_yaml::{Mapping, Value};

use crate::config::{ConfigRecord, ConfigValidator};
use crate::error::{PfError, Result};

/// Top-level fields whose values are not strings.
const SCALAR_KEYS: &[&str] = &["sla_target", "pf_stack_local_use_relative"];

/// Builds a record from `KEY=VALUE` pairs.
///
/// Values are strings, except for the non-string fields and `extra_inputs`
/// entries, which are parsed as YAML scalars: `sla_target=2` sets a number and
/// `pf_stack_local_use_relative=false` a boolean. `MAP.KEY=VALUE` sets one entry
/// of `extra_tags` or `extra_inputs`.
///
/// # Errors
///
/// Returns an error if a pair is malformed or the result fails validation.
pub fn parse_assignments(pairs: &[String]) -> Result<ConfigRecord> {
    let mut root = Mapping::new();

    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| PfError::internal(format!("expected KEY=VALUE, got '{pair}'")))?;
        if key.is_empty() {
            return Err(PfError::internal(format!("missing key in '{pair}'")));
        }
        match key.split_once('.') {
            Some((map, entry)) => {
                let value = if map == "extra_inputs" { parse_scalar(raw) } else { Value::from(raw) };
                let slot = root
                    .entry(Value::from(map))
                    .or_insert_with(|| Value::Mapping(Mapping::new()));
                let Value::Mapping(entries) = slot else {
                    return Err(PfError::internal(format!("'{map}' is not a map")));
                };
                entries.insert(Value::from(entry), value);
            }
            None => {
                let value = if SCALAR_KEYS.contains(&key) { parse_scalar(raw) } else { Value::from(raw) };
                root.insert(Value::from(key), value);
            }
        }
    }

    let record: ConfigRecord =
        serde_yaml::from_value(Value::Mapping(root)).map_err(|e| PfError::internal(e.to_string()))?;
    let result = ConfigValidator::new().validate(&record);
    if !result.is_valid() {
        return Err(PfError::internal(result.summary()));
    }
    Ok(record)
}

fn parse_scalar(raw: &str) -> Value {
    match serde_yaml::from_str::<Value>(raw) {
        Ok(value @ (Value::Bool(_) | Value::Number(_))) => value,
        _ => Value::from(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InputValue, SlaTarget};

    fn args(pairs: &[&str]) -> Vec<String> {
        pairs.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_scalars_and_maps() {
        let record = parse_assignments(&args(&[
            "aws_profile=prod",
            "sla_target=2",
            "extra_tags.owner=ops",
            "extra_inputs.replicas=3",
        ]))
        .expect("parse");

        assert_eq!(record.aws_profile.as_deref(), Some("prod"));
        assert_eq!(record.sla_target, Some(SlaTarget::Two));
        assert_eq!(record.extra_tags.expect("tags")["owner"], "ops");
        assert_eq!(
            record.extra_inputs.expect("inputs")["replicas"],
            InputValue::from(3_u64)
        );
    }

    #[test]
    fn test_string_fields_keep_numeric_text() {
        let record = parse_assignments(&args(&["aws_account_id=012345678901", "extra_tags.tier=1"]))
            .expect("parse");
        assert_eq!(record.aws_account_id.as_deref(), Some("012345678901"));
        assert_eq!(record.extra_tags.expect("tags")["tier"], "1");
    }

    #[test]
    fn test_rejects_malformed_pairs() {
        assert!(parse_assignments(&args(&["no_equals"])).is_err());
        assert!(parse_assignments(&args(&["=value"])).is_err());
        assert!(parse_assignments(&args(&["unknown_field=1"])).is_err());
        assert!(parse_assignments(&args(&["aws_region=moon-1"])).is_err());
    }
}
