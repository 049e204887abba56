pub mod config;
pub mod envelope;
pub mod types;

pub use config::{AppConfig, DelayProfile};
pub use envelope::{ApiFailure, Envelope};
pub use types::{
    CreatedUser, Credentials, FileUploadResponse, LoginData, NewUserRequest, ProfileInfo,
    TaskRecord, TokenBundle, UserInfo, UserRecord,
};
