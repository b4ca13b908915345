//! Token verification tests
//!
//! The middleware and the auth service must agree on one signing
//! secret; these tests pin the decode path both ways.

use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};

use bakepos_backend::middleware::auth::{decode_jwt, Claims};

fn token_for(secret: &str, exp_offset_secs: i64) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: "4f8c1b6e-0000-0000-0000-000000000001".to_string(),
        role: "cashier".to_string(),
        exp: now + exp_offset_secs,
        iat: now,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("token encodes")
}

#[test]
fn token_decodes_with_the_signing_secret() {
    let token = token_for("store-chain-secret", 3600);
    let claims = decode_jwt(&token, "store-chain-secret").expect("decodes");

    assert_eq!(claims.role, "cashier");
    assert_eq!(claims.sub, "4f8c1b6e-0000-0000-0000-000000000001");
}

#[test]
fn token_signed_with_another_secret_is_rejected() {
    let token = token_for("store-chain-secret", 3600);
    assert!(decode_jwt(&token, "some-other-secret").is_err());
}

#[test]
fn expired_token_is_rejected() {
    // Past the default validation leeway
    let token = token_for("store-chain-secret", -3600);
    assert!(decode_jwt(&token, "store-chain-secret").is_err());
}
