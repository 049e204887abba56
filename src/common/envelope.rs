//! The `{code, message, data}` wire envelope shared by every JSON endpoint.
//!
//! `code = 0` is success; any other value is a caller-visible failure with
//! `message` as the diagnostic. Callers never branch on the raw `code` field
//! directly; [`Envelope::into_result`] converts the envelope into a tagged
//! result so failures can't be silently ignored.

use serde::{Deserialize, Serialize};

/// Envelope code denoting success.
pub const CODE_OK: i32 = 0;

/// A non-zero envelope, carried as a typed failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("api failure {code}: {message}")]
pub struct ApiFailure {
    pub code: i32,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Success envelope with a payload.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            code: CODE_OK,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Success envelope with `data: null` (logout and friends).
    pub fn ok_empty(message: impl Into<String>) -> Self {
        Self {
            code: CODE_OK,
            message: message.into(),
            data: None,
        }
    }

    /// Failure envelope. `data` is always null on failure.
    pub fn failure(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == CODE_OK
    }

    /// Tagged view of the envelope: the payload (possibly absent on success)
    /// or the `{code, message}` failure.
    pub fn into_result(self) -> Result<Option<T>, ApiFailure> {
        if self.code == CODE_OK {
            Ok(self.data)
        } else {
            Err(ApiFailure {
                code: self.code,
                message: self.message,
            })
        }
    }

    /// Like [`Self::into_result`], but a success without a payload is also
    /// treated as a failure. Used for endpoints whose contract promises data.
    pub fn require_data(self) -> Result<T, ApiFailure> {
        let code = self.code;
        match self.into_result()? {
            Some(data) => Ok(data),
            None => Err(ApiFailure {
                code,
                message: "response envelope is missing data".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_yields_payload() {
        let envelope = Envelope::ok("success", 7u32);
        assert!(envelope.is_ok());
        assert_eq!(envelope.into_result(), Ok(Some(7)));
    }

    #[test]
    fn failure_envelope_yields_code_and_message() {
        let envelope: Envelope<u32> = Envelope::failure(401, "Not authenticated");
        let failure = envelope.into_result().unwrap_err();
        assert_eq!(failure.code, 401);
        assert_eq!(failure.message, "Not authenticated");
    }

    #[test]
    fn require_data_rejects_empty_success() {
        let envelope: Envelope<u32> = Envelope::ok_empty("Logout successful");
        assert!(envelope.require_data().is_err());
    }

    #[test]
    fn failure_serializes_with_null_data() {
        let envelope: Envelope<u32> = Envelope::failure(400, "No file provided");
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["code"], 400);
        assert!(value["data"].is_null());
    }
}
