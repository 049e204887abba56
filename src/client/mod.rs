//! Client-resident components: the session manager that owns the token and
//! user record, and the transfer coordinator that spends them.

pub mod error;
pub mod session;
pub mod storage;
pub mod transfer;

pub use error::ClientError;
pub use session::{SessionHandle, SessionManager};
pub use storage::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use transfer::{DownloadedFile, ProgressFn, TransferCoordinator, UploadRequest};
