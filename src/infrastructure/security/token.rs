// src/infrastructure/security/token.rs
use crate::{
    application::{
        error::{ApplicationError, ApplicationResult},
        ports::{security::TokenSigner, time::Clock},
    },
    domain::user::UserId,
};
use async_trait::async_trait;
use biscuit_auth::{
    Biscuit, KeyPair, PrivateKey, PublicKey,
    builder::{Algorithm, AuthorizerBuilder, Term},
};
use chrono::{DateTime, Utc};
use std::{collections::HashMap, sync::Arc, time::SystemTime};

const ACCESS_TOKEN_CODE: &str = r#"
    user({uid});
    expires_at({exp});
    token_type("access");
    check if time($now), $now <= {exp};
    check if token_type("access");
"#;

const AUTHORIZER_CODE: &str = r#"
    time({now});
    allow if true;
"#;

/// Access tokens as sealed biscuits signed with an Ed25519 root key.
///
/// Expiry is judged against the injected clock, the same one that set it.
#[derive(Clone)]
pub struct BiscuitTokenSigner {
    root: Arc<KeyPair>,
    public: PublicKey,
    clock: Arc<dyn Clock>,
}

impl BiscuitTokenSigner {
    pub fn new(private_key_hex: &str, clock: Arc<dyn Clock>) -> ApplicationResult<Self> {
        let private = PrivateKey::from_bytes_hex(private_key_hex, Algorithm::Ed25519)
            .map_err(|err| ApplicationError::infrastructure(err.to_string()))?;
        let keypair = KeyPair::from(&private);
        let public = keypair.public();

        Ok(Self {
            root: Arc::new(keypair),
            public,
            clock,
        })
    }
}

fn build_params(user_id: UserId, expires_at: SystemTime) -> HashMap<String, Term> {
    let mut params: HashMap<String, Term> = HashMap::new();
    params.insert("uid".to_string(), user_id.to_string().into());
    params.insert("exp".to_string(), expires_at.into());
    params
}

fn build_and_serialize_biscuit(
    params: HashMap<String, Term>,
    root: &KeyPair,
) -> ApplicationResult<String> {
    let builder = Biscuit::builder()
        .code_with_params(ACCESS_TOKEN_CODE, params, HashMap::new())
        .map_err(|err| ApplicationError::infrastructure(err.to_string()))?;

    let token = builder
        .build(root)
        .map_err(|err| ApplicationError::infrastructure(err.to_string()))?;

    let sealed = token
        .seal()
        .map_err(|err| ApplicationError::infrastructure(err.to_string()))?;
    sealed
        .to_base64()
        .map_err(|err| ApplicationError::infrastructure(err.to_string()))
}

#[async_trait]
impl TokenSigner for BiscuitTokenSigner {
    async fn sign(&self, user_id: UserId, expires_at: DateTime<Utc>) -> ApplicationResult<String> {
        let params = build_params(user_id, SystemTime::from(expires_at));
        build_and_serialize_biscuit(params, self.root.as_ref())
    }

    async fn verify(&self, token: &str) -> ApplicationResult<UserId> {
        let biscuit = Biscuit::from_base64(token, self.public).map_err(|err| {
            tracing::debug!(error = %err, "access token rejected at parse");
            ApplicationError::InvalidToken
        })?;

        let mut params: HashMap<String, Term> = HashMap::new();
        params.insert("now".to_string(), SystemTime::from(self.clock.now()).into());

        let mut authorizer = AuthorizerBuilder::new()
            .code_with_params(AUTHORIZER_CODE, params, HashMap::new())
            .and_then(|builder| builder.build(&biscuit))
            .map_err(|err| {
                tracing::debug!(error = %err, "access token rejected at authorizer setup");
                ApplicationError::InvalidToken
            })?;

        authorizer.authorize().map_err(|err| {
            tracing::debug!(error = %err, "access token rejected by checks");
            ApplicationError::InvalidToken
        })?;

        let (facts, _, _, _) = authorizer.dump();
        let claims = crate::infrastructure::security::claims::parse_claims(facts)?;
        Ok(claims.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::Mutex;
    use uuid::Uuid;

    const KEY_A: &str = "8f2b6a1c4d3e5f708192a3b4c5d6e7f8091a2b3c4d5e6f708192a3b4c5d6e7f8";
    const KEY_B: &str = "11223344556677889900aabbccddeeff11223344556677889900aabbccddeeff";

    struct SteppingClock(Mutex<DateTime<Utc>>);

    impl SteppingClock {
        fn at(rfc3339: &str) -> Arc<Self> {
            let start = DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc);
            Arc::new(Self(Mutex::new(start)))
        }

        fn advance(&self, by: Duration) {
            let mut now = self.0.lock().unwrap();
            *now = *now + by;
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn signer(key: &str, clock: Arc<SteppingClock>) -> BiscuitTokenSigner {
        BiscuitTokenSigner::new(key, clock).unwrap()
    }

    fn user() -> UserId {
        UserId::from_uuid(Uuid::new_v4())
    }

    #[tokio::test]
    async fn signed_token_verifies_to_its_subject() {
        let clock = SteppingClock::at("2024-01-01T00:00:00Z");
        let signer = signer(KEY_A, clock.clone());
        let subject = user();

        let token = signer
            .sign(subject, clock.now() + Duration::minutes(15))
            .await
            .unwrap();

        assert_eq!(signer.verify(&token).await.unwrap(), subject);
    }

    #[tokio::test]
    async fn token_expires_on_the_injected_clock() {
        let clock = SteppingClock::at("2024-01-01T00:00:00Z");
        let signer = signer(KEY_A, clock.clone());
        let subject = user();
        let token = signer
            .sign(subject, clock.now() + Duration::minutes(15))
            .await
            .unwrap();

        clock.advance(Duration::minutes(15));
        assert_eq!(signer.verify(&token).await.unwrap(), subject);

        clock.advance(Duration::seconds(1));
        assert!(matches!(
            signer.verify(&token).await,
            Err(ApplicationError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn foreign_and_malformed_tokens_are_rejected_alike() {
        let clock = SteppingClock::at("2024-01-01T00:00:00Z");
        let signer_a = signer(KEY_A, clock.clone());
        let signer_b = signer(KEY_B, clock.clone());
        let foreign = signer_b
            .sign(user(), clock.now() + Duration::minutes(15))
            .await
            .unwrap();

        assert!(matches!(
            signer_a.verify(&foreign).await,
            Err(ApplicationError::InvalidToken)
        ));
        assert!(matches!(
            signer_a.verify("not-a-token").await,
            Err(ApplicationError::InvalidToken)
        ));
    }

    #[test]
    fn rejects_invalid_key_material() {
        let clock = SteppingClock::at("2024-01-01T00:00:00Z");
        assert!(BiscuitTokenSigner::new("zz", clock).is_err());
    }
}
