//! # sk-verify
//!
//! Re-examines a script's execution after the fact:
//!
//! | Check          | Looks at         | Fails when                                   |
//! |----------------|------------------|----------------------------------------------|
//! | execution      | shell output     | a fatal-error signature appears              |
//! | data_retrieved | script output    | no positive count and no data marker         |
//! | pagination     | script output    | a next-page marker or a page-sized count     |
//! | schema         | script output    | a server's required field pattern is absent  |
//! | standalone     | script file      | no entry point, or a direct run fails        |
//!
//! Pattern tables come from `VerifyConfig`. The harness never writes the
//! registry; callers decide whether to register based on the report.

pub mod error;
pub mod harness;
pub mod report;
pub mod server;

pub use error::VerifyError;
pub use harness::{VerificationHarness, VerificationInput};
pub use report::{CheckOutcome, Severity, VerificationChecks, VerificationReport};
pub use server::ServerType;
