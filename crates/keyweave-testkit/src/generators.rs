//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::Value;

use keyweave_core::{AccountId, BlockKey, KeyMaterial, CATCH_ALL_SECTION};
use keyweave_sharing::KeyShare;

/// Generate random key material.
pub fn key_material() -> impl Strategy<Value = KeyMaterial> {
    any::<[u8; 32]>().prop_map(KeyMaterial::from_bytes)
}

/// Generate an account identifier.
pub fn account_id() -> impl Strategy<Value = AccountId> {
    "[a-z][a-z0-9]{0,15}".prop_map(AccountId::from)
}

/// Generate a section name, sometimes the catch-all.
pub fn section_name() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-z][a-zA-Z0-9_]{0,23}".prop_map(String::from),
        1 => Just(CATCH_ALL_SECTION.to_string()),
    ]
}

/// Generate a block key, mostly numeric.
pub fn block_key() -> impl Strategy<Value = BlockKey> {
    prop_oneof![
        9 => (0u64..=1_000_000).prop_map(BlockKey::Block),
        1 => Just(BlockKey::HashKey),
    ]
}

/// Generate a JSON value of the kind envelopes carry as private data.
pub fn envelope_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        ".{0,32}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,8}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Parameters for generating a key share.
#[derive(Debug, Clone)]
pub struct ShareParams {
    pub originator: AccountId,
    pub partner: AccountId,
    pub section: String,
    pub block: BlockKey,
    pub key: KeyMaterial,
}

impl Arbitrary for ShareParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (account_id(), account_id(), section_name(), block_key(), key_material())
            .prop_map(|(originator, partner, section, block, key)| ShareParams {
                originator,
                partner,
                section,
                block,
                key,
            })
            .boxed()
    }
}

impl ShareParams {
    /// Build the share these parameters describe.
    pub fn to_share(&self) -> KeyShare {
        KeyShare::new(
            self.originator.clone(),
            self.partner.clone(),
            self.section.clone(),
            self.block,
            self.key.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn test_share_params_build_share(params: ShareParams) {
            let share = params.to_share();
            prop_assert_eq!(&share.originator, &params.originator);
            prop_assert_eq!(&share.section, &params.section);
            prop_assert_eq!(share.block, params.block);
            prop_assert!(share.context.is_none());
        }

        #[test]
        fn test_envelope_values_serialize(value in envelope_value()) {
            let bytes = serde_json::to_vec(&value).unwrap();
            let back: Value = serde_json::from_slice(&bytes).unwrap();
            prop_assert_eq!(back, value);
        }
    }
}
