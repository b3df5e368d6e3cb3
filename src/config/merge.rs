//! Merge rules for configuration records.
//!
//! Scalars are override fields: a set value on the incoming record replaces the
//! accumulator's value. `extra_tags`, `extra_inputs` and `domains` are additive:
//! merged key by key, incoming keys winning on collision.

use std::collections::BTreeMap;

use super::record::ConfigRecord;

/// Replaces each listed field when the incoming record sets it.
macro_rules! override_fields {
    ($into:expr, $from:ident, [$($field:ident),* $(,)?]) => {
        $(
            if $from.$field.is_some() {
                $into.$field = $from.$field;
            }
        )*
    };
}

impl ConfigRecord {
    /// Merges a more specific record into this one.
    pub fn merge_from(&mut self, other: Self) {
        merge_map(&mut self.extra_tags, other.extra_tags);
        merge_map(&mut self.extra_inputs, other.extra_inputs);
        merge_map(&mut self.domains, other.domains);

        override_fields!(self, other, [
            sla_target,
            environment,
            environment_subdomain,
            region,
            version,
            pf_stack_version,
            pf_stack_local_path,
            pf_stack_local_use_relative,
            module,
            tf_state_account_id,
            tf_state_profile,
            tf_state_region,
            tf_state_bucket,
            tf_state_lock_table,
            aws_account_id,
            aws_profile,
            aws_region,
            aws_secondary_account_id,
            aws_secondary_profile,
            aws_secondary_region,
            kube_api_server,
            kube_name,
            kube_domain,
            kube_config_context,
            vault_addr,
            vault_token,
            authentik_url,
            authentik_token,
        ]);
    }

    /// Returns this record with `other` merged on top.
    #[must_use]
    pub fn merged_with(mut self, other: Self) -> Self {
        self.merge_from(other);
        self
    }
}

/// Shallow key-by-key merge of an additive map field.
fn merge_map<K: Ord, V>(into: &mut Option<BTreeMap<K, V>>, from: Option<BTreeMap<K, V>>) {
    if let Some(from) = from {
        into.get_or_insert_with(BTreeMap::new).extend(from);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::record::{Domain, DomainConfig, InputValue};

    fn tags(pairs: &[(&str, &str)]) -> Option<BTreeMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_override_fields_replace() {
        let base = ConfigRecord {
            aws_profile: Some(String::from("a")),
            aws_account_id: Some(String::from("111111111111")),
            ..ConfigRecord::default()
        };
        let merged = base.merged_with(ConfigRecord {
            aws_profile: Some(String::from("b")),
            ..ConfigRecord::default()
        });

        assert_eq!(merged.aws_profile.as_deref(), Some("b"));
        assert_eq!(merged.aws_account_id.as_deref(), Some("111111111111"));
    }

    #[test]
    fn test_additive_maps_merge_by_key() {
        let zone = |id: &str| DomainConfig {
            zone_id: id.to_string(),
            record_manager_role_arn: String::from("arn:aws:iam::1:role/dns"),
        };
        let a = Domain::try_from("a.com").expect("valid");
        let b = Domain::try_from("b.com").expect("valid");

        let base = ConfigRecord {
            extra_tags: tags(&[("owner", "x"), ("tier", "1")]),
            extra_inputs: Some(BTreeMap::from([(String::from("x"), InputValue::from(1_u64))])),
            domains: Some(BTreeMap::from([(a.clone(), zone("Z1"))])),
            ..ConfigRecord::default()
        };
        let merged = base.merged_with(ConfigRecord {
            extra_tags: tags(&[("team", "y"), ("tier", "2")]),
            extra_inputs: Some(BTreeMap::from([(String::from("y"), InputValue::from(true))])),
            domains: Some(BTreeMap::from([(b.clone(), zone("Z2"))])),
            ..ConfigRecord::default()
        });

        assert_eq!(merged.extra_tags, tags(&[("owner", "x"), ("team", "y"), ("tier", "2")]));
        let inputs = merged.extra_inputs.expect("inputs");
        assert_eq!(inputs.len(), 2);
        let domains = merged.domains.expect("domains");
        assert_eq!(domains[&a].zone_id, "Z1");
        assert_eq!(domains[&b].zone_id, "Z2");
    }

    #[test]
    fn test_unset_fields_never_clear() {
        let base = ConfigRecord {
            vault_addr: Some(String::from("https://vault.example.com")),
            extra_tags: tags(&[("owner", "x")]),
            ..ConfigRecord::default()
        };
        let merged = base.clone().merged_with(ConfigRecord::default());
        assert_eq!(merged, base);
    }

    #[test]
    fn test_self_merge_is_idempotent() {
        let record = ConfigRecord {
            environment: Some(String::from("prod")),
            extra_tags: tags(&[("owner", "x")]),
            extra_inputs: Some(BTreeMap::from([(String::from("k"), InputValue::from("v"))])),
            ..ConfigRecord::default()
        };
        let merged = record.clone().merged_with(record.clone());
        assert_eq!(merged, record);
    }
}
