//! Public identifier tokens
//!
//! Integer primary keys are never exposed in member-facing URLs. Instead the
//! back office publishes the MD5 of the id's decimal text, encoded as UTF-16LE.
//! The database computes the same token with
//! `LOWER(CONVERT(VARCHAR(32), HASHBYTES('MD5', CONVERT(NVARCHAR(50), id)), 2))`,
//! so both sides must agree byte for byte: NVARCHAR is UTF-16LE without a BOM
//! and the hex digest is lower-cased.

use crate::error::{Result, RosterError};

/// Length of a rendered token in hex characters.
pub const HASH_ID_LEN: usize = 32;

/// Derive the public token for an internal id.
pub fn hash_id(id: i64) -> String {
    let utf16le: Vec<u8> = id
        .to_string()
        .encode_utf16()
        .flat_map(u16::to_le_bytes)
        .collect();

    format!("{:x}", md5::compute(utf16le))
}

/// Check that a client-supplied token has the shape `hash_id` produces.
pub fn validate_hash_id(token: &str) -> Result<()> {
    let well_formed = token.len() == HASH_ID_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));

    if well_formed {
        Ok(())
    } else {
        Err(RosterError::InvalidHash(token.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_matches_database_formula() {
        // md5(utf16le("1")) as computed by HASHBYTES('MD5', N'1')
        assert_eq!(hash_id(1), "06d49632c9dc9bcb62aeaef99612ba6b");
        assert_eq!(hash_id(42), "d721737a1cbbfb3b7e54c60c38882e08");
        assert_eq!(hash_id(0), "a46c3b54f2c9871cd81daf7a932499c0");
        assert_eq!(hash_id(2147483647), "eef5f3dbec05564bff0c2e00232f568c");
    }

    #[test]
    fn test_negative_ids_keep_sign() {
        assert_eq!(hash_id(-7), "d5bb1a7b66026ebe65453ede5427119c");
    }

    #[test]
    fn test_differs_from_plain_utf8_md5() {
        // md5("1") over UTF-8 bytes would break lookups against the database
        assert_ne!(hash_id(1), "c4ca4238a0b923820dcc509a6f75849b");
    }

    #[test]
    fn test_validate_hash_id() {
        assert!(validate_hash_id(&hash_id(17)).is_ok());
        assert!(validate_hash_id("06D49632C9DC9BCB62AEAEF99612BA6B").is_err());
        assert!(validate_hash_id("06d49632").is_err());
        assert!(validate_hash_id("zzd49632c9dc9bcb62aeaef99612ba6b").is_err());
    }

    proptest! {
        #[test]
        fn prop_token_shape_and_determinism(id in any::<i64>()) {
            let first = hash_id(id);
            prop_assert_eq!(first.len(), HASH_ID_LEN);
            prop_assert!(validate_hash_id(&first).is_ok());
            prop_assert_eq!(first, hash_id(id));
        }
    }
}
