//! Application services: use-case orchestration.
//!
//! Each service module implements a single use-case by composing domain logic
//! with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports`, never from `crate::infra`, `crate::commands`,
//! or `crate::output`.

pub mod resolve;
pub mod upload_files;

pub use resolve::{HostPlan, PlannedUpload, plan_cluster, plan_uploads, resolve_spec};
pub use upload_files::UploadFiles;
