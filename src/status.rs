use std::fmt;

/// The range a [`StatusCode`] belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusClass {
    /// 100-199
    Informational,
    /// 200-299
    Successful,
    /// 300-399
    Redirection,
    /// 400-499
    ClientError,
    /// 500-599
    ServerError,
    /// Anything else a server may send.
    Invalid,
}

/// An HTTP response status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct StatusCode(u16);

impl StatusCode {
    /// Create a new status code.
    #[inline]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the status code as a u16 value.
    #[inline]
    pub const fn code(self) -> u16 {
        self.0
    }

    /// The class the code falls into.
    pub const fn class(&self) -> StatusClass {
        match self.0 {
            100..=199 => StatusClass::Informational,
            200..=299 => StatusClass::Successful,
            300..=399 => StatusClass::Redirection,
            400..=499 => StatusClass::ClientError,
            500..=599 => StatusClass::ServerError,
            _ => StatusClass::Invalid,
        }
    }

    /// 1xx.
    pub const fn is_informational(&self) -> bool {
        matches!(self.class(), StatusClass::Informational)
    }

    /// 2xx. This is what [`crate::Response::with_successful_status`] accepts.
    pub const fn is_successful(&self) -> bool {
        matches!(self.class(), StatusClass::Successful)
    }

    /// 3xx.
    pub const fn is_redirection(&self) -> bool {
        matches!(self.class(), StatusClass::Redirection)
    }

    /// 4xx.
    pub const fn is_client_error(&self) -> bool {
        matches!(self.class(), StatusClass::ClientError)
    }

    /// 5xx.
    pub const fn is_server_error(&self) -> bool {
        matches!(self.class(), StatusClass::ServerError)
    }

    /// Outside 100-599.
    pub const fn is_invalid(&self) -> bool {
        matches!(self.class(), StatusClass::Invalid)
    }

    /// The registered reason phrase for common codes, used when a transport reports none.
    pub fn canonical_reason(&self) -> Option<&'static str> {
        Some(match self.0 {
            100 => "Continue",
            101 => "Switching Protocols",
            200 => "OK",
            201 => "Created",
            202 => "Accepted",
            204 => "No Content",
            206 => "Partial Content",
            301 => "Moved Permanently",
            302 => "Found",
            303 => "See Other",
            304 => "Not Modified",
            307 => "Temporary Redirect",
            308 => "Permanent Redirect",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            408 => "Request Timeout",
            409 => "Conflict",
            410 => "Gone",
            413 => "Content Too Large",
            415 => "Unsupported Media Type",
            422 => "Unprocessable Content",
            429 => "Too Many Requests",
            500 => "Internal Server Error",
            501 => "Not Implemented",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            504 => "Gateway Timeout",
            _ => return None,
        })
    }
}

impl From<u16> for StatusCode {
    #[inline]
    fn from(code: u16) -> Self {
        Self::new(code)
    }
}

impl From<StatusCode> for u16 {
    #[inline]
    fn from(code: StatusCode) -> Self {
        code.0
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Default for StatusCode {
    fn default() -> Self {
        Self::new(200)
    }
}

impl PartialEq<u16> for StatusCode {
    #[inline]
    fn eq(&self, other: &u16) -> bool {
        self.code() == *other
    }
}

impl PartialEq<StatusCode> for u16 {
    #[inline]
    fn eq(&self, other: &StatusCode) -> bool {
        *self == other.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_follow_the_first_digit() {
        let cases = [
            (101, StatusClass::Informational),
            (200, StatusClass::Successful),
            (299, StatusClass::Successful),
            (304, StatusClass::Redirection),
            (404, StatusClass::ClientError),
            (503, StatusClass::ServerError),
            (99, StatusClass::Invalid),
            (600, StatusClass::Invalid),
        ];
        for (code, class) in cases {
            assert_eq!(StatusCode::from(code).class(), class, "{code}");
        }
        assert!(StatusCode::default().is_successful());
        assert!(!StatusCode::new(404).is_successful());
        assert!(StatusCode::new(600).is_invalid());
    }

    #[test]
    fn test_canonical_reason() {
        assert_eq!(StatusCode::new(500).canonical_reason(), Some("Internal Server Error"));
        assert_eq!(StatusCode::new(299).canonical_reason(), None);
    }

    #[test]
    fn compares_with_plain_integers() {
        let status = StatusCode::new(404);
        assert_eq!(status, 404);
        assert_eq!(404, status);
        assert_eq!(status.to_string(), "404");
        assert_eq!(u16::from(status), 404);
    }
}
