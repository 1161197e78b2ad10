pub mod credentials;
pub mod directory;
pub mod identity;

pub use credentials::CredentialIssuer;
pub use directory::DirectoryProvisioner;
pub use identity::IdentityVerifier;
