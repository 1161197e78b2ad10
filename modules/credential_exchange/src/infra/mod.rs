pub mod aws;
pub mod userinfo;

pub use aws::{ChimeDirectoryProvisioner, StsCredentialIssuer};
pub use userinfo::HttpUserinfoVerifier;
