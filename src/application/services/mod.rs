// src/application/services/mod.rs
use std::sync::Arc;

use crate::application::{
    commands::auth::{AuthCommandService, TokenPolicy},
    ports::{
        security::{PasswordHasher, TokenSigner},
        time::Clock,
        transaction::TransactionRunner,
        util::IdGenerator,
    },
};

/// Application-layer entry points shared with the presentation layer.
pub struct ApplicationServices {
    pub auth_commands: Arc<AuthCommandService>,
}

impl ApplicationServices {
    pub fn new(
        transactions: Arc<dyn TransactionRunner>,
        password_hasher: Arc<dyn PasswordHasher>,
        token_signer: Arc<dyn TokenSigner>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        policy: TokenPolicy,
    ) -> Self {
        let auth_commands = Arc::new(AuthCommandService::new(
            transactions,
            password_hasher,
            token_signer,
            clock,
            ids,
            policy,
        ));

        Self { auth_commands }
    }
}
