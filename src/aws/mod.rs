//! AWS capability implementations backed by the `aws` command-line client

pub mod cli;
pub mod cloudformation;
pub mod ec2;
pub mod iam;
pub mod template;

pub use cli::AwsCli;
pub use cloudformation::CloudFormation;
pub use ec2::Ec2;
pub use iam::IamCertificateDescriber;
