//! In-memory port fakes shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use credential_exchange::contract::model::{DirectoryEntryHandle, IdentityToken, ScopedCredentials, User};
use credential_exchange::domain::error::DomainError;
use credential_exchange::domain::normalize::normalize_subject;
use credential_exchange::domain::ports::{CredentialIssuer, DirectoryProvisioner, IdentityVerifier};
use credential_exchange::domain::service::{Service, ServiceConfig};

pub const APP_INSTANCE_ARN: &str = "arn:aws:chime:us-east-1:123456789012:app-instance/test";
pub const VALID_TOKEN: &str = "Bearer valid-token";

/// Accepts `VALID_TOKEN` as the given subject, rejects everything else.
pub struct FakeVerifier {
    sub: String,
    name: Option<String>,
    delay: Duration,
    pub calls: AtomicUsize,
}

impl FakeVerifier {
    pub fn new(sub: &str, name: Option<&str>) -> Self {
        Self {
            sub: sub.to_owned(),
            name: name.map(str::to_owned),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityVerifier for FakeVerifier {
    async fn verify(&self, token: &IdentityToken) -> Result<User, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if token.expose() != VALID_TOKEN {
            return Err(DomainError::verification("HTTP 401 Unauthorized"));
        }
        Ok(User {
            uuid: normalize_subject(&self.sub),
            display_name: self.name.clone(),
            metadata: None,
        })
    }
}

/// Issues a fresh session token per call and records the session tag value.
pub struct FakeIssuer {
    deny: bool,
    delay: Duration,
    lifetime: chrono::Duration,
    pub calls: AtomicUsize,
    pub tags: Mutex<Vec<String>>,
}

impl FakeIssuer {
    pub fn new() -> Self {
        Self {
            deny: false,
            delay: Duration::ZERO,
            lifetime: chrono::Duration::seconds(3600),
            calls: AtomicUsize::new(0),
            tags: Mutex::new(Vec::new()),
        }
    }

    pub fn denying() -> Self {
        Self {
            deny: true,
            ..Self::new()
        }
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_lifetime(mut self, lifetime: chrono::Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialIssuer for FakeIssuer {
    async fn issue(&self, user: &User) -> Result<ScopedCredentials, DomainError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if self.deny {
            return Err(DomainError::issuance("AssumeRole failed"));
        }
        self.tags.lock().unwrap().push(user.uuid.clone());
        Ok(ScopedCredentials {
            access_key_id: format!("ASIA{n}"),
            secret_access_key: format!("secret-{n}"),
            session_token: format!("session-{n}-{}", user.uuid),
            expiration: Utc::now() + self.lifetime,
        })
    }
}

/// Create-if-absent directory keyed by uuid.
pub struct FakeDirectory {
    fail: bool,
    delay: Duration,
    pub entries: Mutex<HashMap<String, DirectoryEntryHandle>>,
    pub names: Mutex<Vec<String>>,
    pub calls: AtomicUsize,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self {
            fail: false,
            delay: Duration::ZERO,
            entries: Mutex::new(HashMap::new()),
            names: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn entry_count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[async_trait]
impl DirectoryProvisioner for FakeDirectory {
    async fn ensure_entry(&self, user: &User) -> Result<DirectoryEntryHandle, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(DomainError::provisioning("CreateAppInstanceUser failed"));
        }
        let name = user.display_name.clone().unwrap_or_else(|| user.uuid.clone());
        self.names.lock().unwrap().push(name);
        let handle = self
            .entries
            .lock()
            .unwrap()
            .entry(user.uuid.clone())
            .or_insert_with(|| {
                DirectoryEntryHandle::new(format!("{APP_INSTANCE_ARN}/user/{}", user.uuid))
            })
            .clone();
        Ok(handle)
    }
}

pub struct Harness {
    pub verifier: Arc<FakeVerifier>,
    pub issuer: Arc<FakeIssuer>,
    pub directory: Arc<FakeDirectory>,
    pub service: Service,
}

pub fn harness(verifier: FakeVerifier, issuer: FakeIssuer, directory: FakeDirectory) -> Harness {
    harness_with(verifier, issuer, directory, Duration::from_secs(10))
}

pub fn harness_with(
    verifier: FakeVerifier,
    issuer: FakeIssuer,
    directory: FakeDirectory,
    deadline: Duration,
) -> Harness {
    let verifier = Arc::new(verifier);
    let issuer = Arc::new(issuer);
    let directory = Arc::new(directory);
    let service = Service::new(
        verifier.clone(),
        issuer.clone(),
        directory.clone(),
        ServiceConfig {
            app_instance_arn: APP_INSTANCE_ARN.into(),
            deadline,
            ..ServiceConfig::default()
        },
    );
    Harness {
        verifier,
        issuer,
        directory,
        service,
    }
}

pub fn ada() -> FakeVerifier {
    FakeVerifier::new("idp|abc123", Some("Ada"))
}
