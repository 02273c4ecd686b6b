// crates/teamdesk-api/src/identity.rs
// ============================================================================
// Module: Bearer Identity Verifiers
// Description: JWT and static-token implementations of the identity seam.
// Purpose: Turn opaque bearer credentials into verified identities.
// Dependencies: teamdesk-core, teamdesk-config, jsonwebtoken, sha2
// ============================================================================

//! ## Overview
//! [`JwtIdentityVerifier`] checks signature, expiry, and the configured
//! issuer/audience of provider-issued tokens. [`StaticTokenVerifier`] maps
//! fixed tokens to identities for local and test setups. Neither ever logs
//! or echoes a credential; [`token_fingerprint`] is the only form a token
//! may take in diagnostics.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::Validation;
use serde::Deserialize;
use sha2::Digest;
use sha2::Sha256;
use teamdesk_config::IdentityConfig;
use teamdesk_config::IdentityMode;
use teamdesk_config::JwtAlgorithm;
use teamdesk_config::JwtConfig;
use teamdesk_config::StaticTokenConfig;
use teamdesk_core::IdentityError;
use teamdesk_core::IdentityVerifier;
use teamdesk_core::VerifiedIdentity;

// ============================================================================
// SECTION: Fingerprints
// ============================================================================

/// Returns the lowercase hex SHA-256 of a bearer token.
#[must_use]
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

// ============================================================================
// SECTION: Static Tokens
// ============================================================================

/// Verifier backed by a fixed token table.
pub struct StaticTokenVerifier {
    /// Token to identity mapping.
    tokens: BTreeMap<String, VerifiedIdentity>,
}

impl StaticTokenVerifier {
    /// Builds a verifier from token/identity pairs.
    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = (String, VerifiedIdentity)>) -> Self {
        Self {
            tokens: entries.into_iter().collect(),
        }
    }

    /// Builds a verifier from `[[identity.tokens]]` entries.
    #[must_use]
    pub fn from_config(entries: &[StaticTokenConfig]) -> Self {
        Self::new(entries.iter().map(|entry| {
            (entry.token.clone(), VerifiedIdentity {
                subject_id: entry.subject.clone(),
                email: entry.email.clone(),
                display_name: entry.display_name.clone(),
                provider: entry.provider.clone(),
            })
        }))
    }
}

#[async_trait]
impl IdentityVerifier for StaticTokenVerifier {
    async fn verify(&self, bearer_token: &str) -> Result<VerifiedIdentity, IdentityError> {
        self.tokens
            .get(bearer_token)
            .cloned()
            .ok_or_else(|| IdentityError::InvalidCredential("unknown token".to_string()))
    }
}

// ============================================================================
// SECTION: JWT
// ============================================================================

/// Provider label used when a token names none.
const DEFAULT_JWT_PROVIDER: &str = "jwt";

/// Claims read from identity tokens.
#[derive(Debug, Deserialize)]
struct IdentityClaims {
    /// Provider subject.
    sub: String,
    /// Email address.
    #[serde(default)]
    email: Option<String>,
    /// Display name.
    #[serde(default)]
    name: Option<String>,
    /// Explicit provider label.
    #[serde(default)]
    provider: Option<String>,
    /// Federated sign-in details.
    #[serde(default)]
    firebase: Option<SignInClaims>,
}

/// Federated sign-in claims.
#[derive(Debug, Deserialize)]
struct SignInClaims {
    /// Upstream provider id such as `google.com`.
    #[serde(default)]
    sign_in_provider: Option<String>,
}

impl IdentityClaims {
    /// Resolves the provider label.
    fn provider_label(&self) -> String {
        if let Some(provider) = self.provider.as_deref().filter(|value| !value.is_empty()) {
            return provider.to_string();
        }
        self.firebase
            .as_ref()
            .and_then(|claims| claims.sign_in_provider.as_deref())
            .filter(|value| !value.is_empty())
            .map_or_else(
                || DEFAULT_JWT_PROVIDER.to_string(),
                |value| value.strip_suffix(".com").unwrap_or(value).to_string(),
            )
    }
}

/// Verifier for signed identity tokens.
pub struct JwtIdentityVerifier {
    /// Signature key.
    key: DecodingKey,
    /// Algorithm and claim rules.
    validation: Validation,
}

impl JwtIdentityVerifier {
    /// Builds a verifier from `[identity.jwt]`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Unavailable`] when the key material is unusable.
    pub fn from_config(config: &JwtConfig) -> Result<Self, IdentityError> {
        let (algorithm, key) = match config.algorithm {
            JwtAlgorithm::Hs256 => {
                let secret = config.secret.as_deref().unwrap_or_default();
                (Algorithm::HS256, DecodingKey::from_secret(secret.as_bytes()))
            }
            JwtAlgorithm::Rs256 => {
                let pem = config.public_key_pem.as_deref().unwrap_or_default();
                let key = DecodingKey::from_rsa_pem(pem.as_bytes())
                    .map_err(|err| IdentityError::Unavailable(format!("invalid rsa key: {err}")))?;
                (Algorithm::RS256, key)
            }
        };
        let mut validation = Validation::new(algorithm);
        validation.leeway = config.leeway_secs;
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer.as_str()]);
        }
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience.as_str()]),
            None => validation.validate_aud = false,
        }
        Ok(Self {
            key,
            validation,
        })
    }
}

#[async_trait]
impl IdentityVerifier for JwtIdentityVerifier {
    async fn verify(&self, bearer_token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let data = jsonwebtoken::decode::<IdentityClaims>(bearer_token, &self.key, &self.validation)
            .map_err(|err| IdentityError::InvalidCredential(err.to_string()))?;
        let claims = data.claims;
        if claims.sub.trim().is_empty() {
            return Err(IdentityError::InvalidCredential("missing subject".to_string()));
        }
        let provider = claims.provider_label();
        Ok(VerifiedIdentity {
            subject_id: claims.sub,
            email: claims.email.unwrap_or_default(),
            display_name: claims.name,
            provider,
        })
    }
}

// ============================================================================
// SECTION: Construction
// ============================================================================

/// Builds the configured verifier.
///
/// # Errors
///
/// Returns [`IdentityError::Unavailable`] when JWT mode lacks usable settings.
pub fn verifier_from_config(
    config: &IdentityConfig,
) -> Result<Arc<dyn IdentityVerifier>, IdentityError> {
    match config.mode {
        IdentityMode::Jwt => {
            let jwt = config.jwt.as_ref().ok_or_else(|| {
                IdentityError::Unavailable("jwt identity mode requires settings".to_string())
            })?;
            Ok(Arc::new(JwtIdentityVerifier::from_config(jwt)?))
        }
        IdentityMode::StaticTokens => Ok(Arc::new(StaticTokenVerifier::from_config(&config.tokens))),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
