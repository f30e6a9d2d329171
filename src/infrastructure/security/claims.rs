// src/infrastructure/security/claims.rs
use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::user::UserId;
use biscuit_auth::builder::{Fact, Predicate, Term};

/// Facts carried by an access token once its signature and checks passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessClaims {
    pub user_id: UserId,
}

pub fn parse_claims(facts: Vec<Fact>) -> ApplicationResult<AccessClaims> {
    claims_from_predicates(facts.into_iter().map(|fact| fact.predicate))
}

fn claims_from_predicates(
    predicates: impl IntoIterator<Item = Predicate>,
) -> ApplicationResult<AccessClaims> {
    let mut ctx = ClaimsContext::default();
    for predicate in predicates {
        ctx.apply_predicate(predicate);
    }

    let user_id = ctx.user_id.ok_or(ApplicationError::InvalidToken)?;
    // Expiry itself is enforced by the token's own check; a token without
    // the fact was not minted here.
    if !ctx.has_expiry || !ctx.is_access {
        return Err(ApplicationError::InvalidToken);
    }

    Ok(AccessClaims { user_id })
}

#[derive(Default)]
struct ClaimsContext {
    user_id: Option<UserId>,
    has_expiry: bool,
    is_access: bool,
}

impl ClaimsContext {
    fn apply_predicate(&mut self, predicate: Predicate) {
        match (predicate.name.as_str(), predicate.terms.first()) {
            ("user", Some(Term::Str(raw))) => {
                self.user_id = raw.parse().ok();
            }
            ("expires_at", Some(Term::Date(_))) => {
                self.has_expiry = true;
            }
            ("token_type", Some(Term::Str(kind))) => {
                self.is_access = kind == "access";
            }
            _ => {}
        }
    }
}
