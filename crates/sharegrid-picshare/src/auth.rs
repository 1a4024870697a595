//! JWT issuing and validation for the Picshare API.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation, decode,
    encode};
use serde::{Deserialize, Serialize};

use sharegrid_common::SharegridError;

pub const DEFAULT_TOKEN_EXPIRE_SECONDS: i64 = 18000;

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtPayload {
    pub sub: String,
    pub exp: i64,
}

pub fn encode_jwt_token(
    username: &str,
    secret_key: &str,
    ttl_seconds: i64,
) -> Result<String, SharegridError> {
    let payload = JwtPayload {
        sub: username.to_string(),
        exp: chrono::Utc::now().timestamp() + ttl_seconds,
    };
    let key = EncodingKey::from_base64_secret(secret_key)
        .map_err(|e| SharegridError::AuthError(e.to_string()))?;

    encode(&Header::new(Algorithm::HS256), &payload, &key)
        .map_err(|e| SharegridError::AuthError(e.to_string()))
}

pub fn decode_jwt_token(token: &str, secret_key: &str) -> Result<JwtPayload, SharegridError> {
    let key = DecodingKey::from_base64_secret(secret_key)
        .map_err(|e| SharegridError::AuthError(e.to_string()))?;
    let validation = Validation::new(Algorithm::HS256);

    let data: TokenData<JwtPayload> = decode(token, &key, &validation)
        .map_err(|e| SharegridError::AuthError(e.to_string()))?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "U2hhcmVncmlkUGljc2hhcmVUb2tlblNlY3JldEtleTAxMjM0NTY3ODkwMTIzNDU=";

    #[test]
    fn test_encode_decode_round_trip() {
        let token = encode_jwt_token("alice", SECRET, 3600).unwrap();
        let payload = decode_jwt_token(&token, SECRET).unwrap();
        assert_eq!(payload.sub, "alice");
        assert!(payload.exp > chrono::Utc::now().timestamp());
    }

    #[test]
    fn test_decode_rejects_wrong_secret() {
        let other = "T3RoZXJTZWNyZXRLZXlUaGF0SXNBbHNvTG9uZ0Vub3VnaDAxMjM0NTY3ODk=";
        let token = encode_jwt_token("alice", SECRET, 3600).unwrap();
        assert!(decode_jwt_token(&token, other).is_err());
    }

    #[test]
    fn test_decode_rejects_expired_token() {
        let token = encode_jwt_token("alice", SECRET, -600).unwrap();
        assert!(decode_jwt_token(&token, SECRET).is_err());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_jwt_token("not.a.token", SECRET).is_err());
    }
}
