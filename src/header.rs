//! Request header names.
//!
//! Names are spelled in their canonical form, which is how they are sent when the builder
//! materializes them. Lookups elsewhere in the crate are case-insensitive.

macro_rules! request_headers {
    (
        $(
            $(#[$docs:meta])*
            ($konst:ident, $name:literal);
        )+
    ) => {
        $(
            $(#[$docs])*
            pub const $konst: &str = $name;
        )+

        /// Every header name declared in this module.
        pub const ALL: &[&str] = &[$($name),+];
    }
}

request_headers! {
    /// Content types the client is able to understand.
    (ACCEPT, "Accept");
    /// Character sets the client is able to understand.
    (ACCEPT_CHARSET, "Accept-Charset");
    /// Content encodings the client is able to understand.
    (ACCEPT_ENCODING, "Accept-Encoding");
    /// Preferred natural languages.
    (ACCEPT_LANGUAGE, "Accept-Language");
    /// Headers a CORS preflight request intends to send.
    (ACCESS_CONTROL_REQUEST_HEADERS, "Access-Control-Request-Headers");
    /// Method a CORS preflight request intends to use.
    (ACCESS_CONTROL_REQUEST_METHOD, "Access-Control-Request-Method");
    /// Credentials for the origin server.
    (AUTHORIZATION, "Authorization");
    /// Caching directives.
    (CACHE_CONTROL, "Cache-Control");
    /// Connection management options.
    (CONNECTION, "Connection");
    /// Encodings applied to the body.
    (CONTENT_ENCODING, "Content-Encoding");
    /// Size of the body in bytes.
    (CONTENT_LENGTH, "Content-Length");
    /// Media type of the body.
    (CONTENT_TYPE, "Content-Type");
    /// Stored cookies.
    (COOKIE, "Cookie");
    /// Do-not-track preference.
    (DNT, "DNT");
    /// Expectations the server must meet.
    (EXPECT, "Expect");
    /// Proxy-disclosed client information.
    (FORWARDED, "Forwarded");
    /// Email address of the requesting user.
    (FROM, "From");
    /// Host and port of the target.
    (HOST, "Host");
    /// Conditional request on matching entity tags.
    (IF_MATCH, "If-Match");
    /// Conditional request on modification date.
    (IF_MODIFIED_SINCE, "If-Modified-Since");
    /// Conditional request on non-matching entity tags.
    (IF_NONE_MATCH, "If-None-Match");
    /// Conditional range request.
    (IF_RANGE, "If-Range");
    /// Conditional request on unchanged modification date.
    (IF_UNMODIFIED_SINCE, "If-Unmodified-Since");
    /// Hop limit for TRACE and OPTIONS.
    (MAX_FORWARDS, "Max-Forwards");
    /// Origin of a cross-site request.
    (ORIGIN, "Origin");
    /// Implementation-specific directives.
    (PRAGMA, "Pragma");
    /// Preferred server behaviors.
    (PREFER, "Prefer");
    /// Credentials for a proxy.
    (PROXY_AUTHORIZATION, "Proxy-Authorization");
    /// Requested byte ranges.
    (RANGE, "Range");
    /// Address of the previous page.
    (REFERER, "Referer");
    /// Acceptable transfer encodings.
    (TE, "TE");
    /// Trailer fields that follow the body.
    (TRAILER, "Trailer");
    /// Transfer encoding of the body.
    (TRANSFER_ENCODING, "Transfer-Encoding");
    /// Protocol upgrade request.
    (UPGRADE, "Upgrade");
    /// Preference for an encrypted response.
    (UPGRADE_INSECURE_REQUESTS, "Upgrade-Insecure-Requests");
    /// Client software identification.
    (USER_AGENT, "User-Agent");
    /// Intermediate proxies.
    (VIA, "Via");
    /// Originating client IP address.
    (X_FORWARDED_FOR, "X-Forwarded-For");
    /// Originating host requested by the client.
    (X_FORWARDED_HOST, "X-Forwarded-Host");
    /// Originating protocol.
    (X_FORWARDED_PROTO, "X-Forwarded-Proto");
    /// Method override for constrained clients.
    (X_HTTP_METHOD_OVERRIDE, "X-Http-Method-Override");
    /// Request correlation identifier.
    (X_REQUEST_ID, "X-Request-ID");
    /// Marks AJAX requests.
    (X_REQUESTED_WITH, "X-Requested-With");
}

/// Media type of JSON payloads.
pub const APPLICATION_JSON: &str = "application/json";
/// Media type of urlencoded form payloads.
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique_case_insensitively() {
        for (i, a) in ALL.iter().enumerate() {
            for b in &ALL[i + 1..] {
                assert!(!a.eq_ignore_ascii_case(b), "duplicate header {a}");
            }
        }
    }
}
