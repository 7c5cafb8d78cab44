//! Director lifecycle through `bosh-init`, plus the director's TLS key pair

pub mod credentials;
pub mod executor;
pub mod manifest;
pub mod ssl;

pub use credentials::Credentials;
pub use executor::BoshInitExecutor;
pub use ssl::OpenSslKeyPairGenerator;
