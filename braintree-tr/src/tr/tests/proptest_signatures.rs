use std::collections::BTreeMap;

use proptest::prelude::*;

use crate::{
    error::GatewayError,
    tr::{
        codec::{SignedPayload, canonicalize, decode},
        signer::{TrSigner, sign, verify},
    },
};

fn field_pairs() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::btree_map("field_[a-g]{1,6}", "[a-zA-Z0-9 ]{0,12}", 1..6)
        .prop_map(|map: BTreeMap<String, String>| map.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn test_sign_then_verify_holds(
        key in "[a-zA-Z0-9_]{1,40}",
        pairs in field_pairs(),
    ) {
        let canonical = canonicalize(&pairs);
        let signature = sign(&key, &canonical).expect("non-empty key");

        prop_assert!(verify(&key, &canonical, &signature).expect("non-empty key"));
    }

    #[test]
    fn test_encode_decode_round_trip(
        key in "[a-zA-Z0-9_]{1,40}",
        pairs in field_pairs(),
    ) {
        let signer = TrSigner::new(&key).expect("non-empty key");
        let payload = SignedPayload::sign(pairs.clone(), &signer);

        let decoded = decode(&payload.encode(), &signer);
        prop_assert!(decoded.is_ok(), "decode failed: {:?}", decoded.err());
        let decoded = decoded.expect("checked above");

        prop_assert_eq!(decoded.pairs(), pairs.as_slice());
        prop_assert_eq!(decoded.signature(), payload.signature());
        prop_assert!(payload.is_valid(&signer));
    }

    #[test]
    fn test_single_character_tamper_is_rejected(
        pairs in field_pairs(),
        position in any::<prop::sample::Index>(),
        replacement in prop::sample::select(vec!['Z', 'q', '7', '_', '%', '=', '&', '+']),
    ) {
        let signer = TrSigner::new("integration_private_key").expect("non-empty key");
        let encoded = SignedPayload::sign(pairs, &signer).encode();
        let hash_start = encoded.rfind("&hash=").expect("hash is appended");

        let signed_part: Vec<char> = encoded[..hash_start].chars().collect();
        let index = position.index(signed_part.len());
        prop_assume!(signed_part[index] != replacement);

        let mut tampered = signed_part;
        tampered[index] = replacement;
        let tampered: String = tampered.into_iter().collect::<String>() + &encoded[hash_start..];

        let result = decode(&tampered, &signer);
        prop_assert!(
            matches!(result, Err(GatewayError::AuthenticationError(_))),
            "tampered query {} decoded as {:?}",
            tampered,
            result
        );
    }

    #[test]
    fn test_canonical_string_ignores_field_order(
        pairs in field_pairs(),
    ) {
        let mut reversed = pairs.clone();
        reversed.reverse();

        prop_assert_eq!(canonicalize(&pairs), canonicalize(&reversed));
    }
}
