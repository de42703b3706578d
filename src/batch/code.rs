use std::collections::HashMap;
use std::error::Error;
use std::fmt;

use once_cell::sync::Lazy;

/// Terminal outcome of one transfer.
///
/// Exactly one value ([`TransferCode::OK`]) means the transfer ran to
/// completion; every other value names the reason it did not. An HTTP error
/// status (4xx/5xx) is still `OK` here, the same way the transport treats a
/// delivered response as a finished transfer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TransferCode(i32);

impl TransferCode {
    pub const OK: TransferCode = TransferCode(0);
    pub const UNSUPPORTED_SCHEME: TransferCode = TransferCode(1);
    pub const BAD_URL: TransferCode = TransferCode(3);
    pub const COULDNT_RESOLVE_HOST: TransferCode = TransferCode(6);
    pub const COULDNT_CONNECT: TransferCode = TransferCode(7);
    pub const PARTIAL_TRANSFER: TransferCode = TransferCode(18);
    pub const OPERATION_TIMEDOUT: TransferCode = TransferCode(28);
    pub const TLS_HANDSHAKE_FAILED: TransferCode = TransferCode(35);
    pub const TOO_MANY_REDIRECTS: TransferCode = TransferCode(47);
    pub const SEND_ERROR: TransferCode = TransferCode(55);
    pub const RECV_ERROR: TransferCode = TransferCode(56);

    pub fn from_raw(raw: i32) -> Self {
        TransferCode(raw)
    }

    pub fn as_raw(self) -> i32 {
        self.0
    }

    /// Dispatch classification: `OK` against everything else.
    pub fn is_success(self) -> bool {
        self == TransferCode::OK
    }

    /// Stable label for the code, `"UNKNOWN_CODE"` outside the known set.
    pub fn name(self) -> &'static str {
        classify(self)
    }

    /// Closest code for a transport-layer error.
    pub(crate) fn from_transport(err: &reqwest::Error) -> Self {
        let detail = source_text(err);
        if err.is_timeout() {
            TransferCode::OPERATION_TIMEDOUT
        } else if err.is_redirect() {
            TransferCode::TOO_MANY_REDIRECTS
        } else if err.is_builder() {
            if detail.contains("scheme") {
                TransferCode::UNSUPPORTED_SCHEME
            } else {
                TransferCode::BAD_URL
            }
        } else if err.is_connect() {
            if detail.contains("dns") || detail.contains("lookup address") {
                TransferCode::COULDNT_RESOLVE_HOST
            } else if detail.contains("certificate") || detail.contains("tls") || detail.contains("ssl") {
                TransferCode::TLS_HANDSHAKE_FAILED
            } else {
                TransferCode::COULDNT_CONNECT
            }
        } else if err.is_body() || err.is_decode() {
            TransferCode::RECV_ERROR
        } else {
            TransferCode::SEND_ERROR
        }
    }
}

impl fmt::Display for TransferCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.0)
    }
}

// reqwest wraps the interesting part (dns failure, tls failure) several
// levels down; flatten the chain once for keyword matching.
fn source_text(err: &reqwest::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        text.push_str(": ");
        text.push_str(&inner.to_string());
        source = inner.source();
    }
    text.to_ascii_lowercase()
}

#[cfg(test)]
pub(super) static NAME_TABLE_BUILDS: std::sync::atomic::AtomicUsize =
    std::sync::atomic::AtomicUsize::new(0);

static NAME_TABLE: Lazy<HashMap<i32, &'static str>> = Lazy::new(build_name_table);

fn build_name_table() -> HashMap<i32, &'static str> {
    #[cfg(test)]
    NAME_TABLE_BUILDS.fetch_add(1, std::sync::atomic::Ordering::Relaxed);

    HashMap::from([
        (TransferCode::OK.0, "OK"),
        (TransferCode::UNSUPPORTED_SCHEME.0, "UNSUPPORTED_SCHEME"),
        (TransferCode::BAD_URL.0, "BAD_URL"),
        (TransferCode::COULDNT_RESOLVE_HOST.0, "COULDNT_RESOLVE_HOST"),
        (TransferCode::COULDNT_CONNECT.0, "COULDNT_CONNECT"),
        (TransferCode::PARTIAL_TRANSFER.0, "PARTIAL_TRANSFER"),
        (TransferCode::OPERATION_TIMEDOUT.0, "OPERATION_TIMEDOUT"),
        (TransferCode::TLS_HANDSHAKE_FAILED.0, "TLS_HANDSHAKE_FAILED"),
        (TransferCode::TOO_MANY_REDIRECTS.0, "TOO_MANY_REDIRECTS"),
        (TransferCode::SEND_ERROR.0, "SEND_ERROR"),
        (TransferCode::RECV_ERROR.0, "RECV_ERROR"),
    ])
}

/// Human-readable label for a transfer code, for logging.
pub fn classify(code: TransferCode) -> &'static str {
    NAME_TABLE.get(&code.0).copied().unwrap_or("UNKNOWN_CODE")
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;

    #[test]
    fn known_codes_have_stable_names() {
        assert_eq!(TransferCode::OK.name(), "OK");
        assert_eq!(TransferCode::COULDNT_RESOLVE_HOST.name(), "COULDNT_RESOLVE_HOST");
        assert_eq!(TransferCode::OPERATION_TIMEDOUT.name(), "OPERATION_TIMEDOUT");
        assert_eq!(classify(TransferCode::RECV_ERROR), "RECV_ERROR");
    }

    #[test]
    fn unknown_codes_get_the_sentinel_name() {
        assert_eq!(TransferCode::from_raw(4242).name(), "UNKNOWN_CODE");
        assert_eq!(TransferCode::from_raw(-1).name(), "UNKNOWN_CODE");
    }

    #[test]
    fn name_table_is_built_once() {
        for _ in 0..10 {
            let _ = classify(TransferCode::OK);
            let _ = classify(TransferCode::from_raw(9999));
        }
        assert_eq!(NAME_TABLE_BUILDS.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn only_ok_is_success() {
        assert!(TransferCode::OK.is_success());
        assert!(!TransferCode::COULDNT_CONNECT.is_success());
        assert!(!TransferCode::from_raw(4242).is_success());
    }

    #[test]
    fn raw_round_trip() {
        let code = TransferCode::from_raw(28);
        assert_eq!(code, TransferCode::OPERATION_TIMEDOUT);
        assert_eq!(code.as_raw(), 28);
    }

    #[test]
    fn display_includes_name_and_raw_value() {
        assert_eq!(TransferCode::OK.to_string(), "OK (0)");
        assert_eq!(TransferCode::from_raw(4242).to_string(), "UNKNOWN_CODE (4242)");
    }
}
