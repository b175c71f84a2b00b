//! Request body encoders.

use std::sync::atomic::{AtomicU32, Ordering};

use serde_json::Value;

use crate::options::FilePart;

/// Url-encodes form fields in order.
pub(crate) fn encode_form(fields: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish()
}

/// Flattens the top level of a JSON object into multipart text fields.
///
/// Strings are taken as-is, other values are serialized. Non-object documents contribute a
/// single field named `json`.
pub(crate) fn json_fields(json: &Value) -> Vec<(String, String)> {
    fn text(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
    match json {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), text(v))).collect(),
        Value::Null => vec![],
        other => vec![("json".to_string(), text(other))],
    }
}

/// Generates a multipart boundary that is unique within this process.
pub(crate) fn generate_multipart_boundary() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU32 = AtomicU32::new(0);

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);

    format!(
        "----simplehttp.boundary.{:08x}{:08x}",
        (timestamp & 0xFFFF_FFFF) as u32,
        seq
    )
}

fn escape_quoted(value: &str) -> String {
    const STRIPPED_CHARS: &[char] = &['"', '\\', '\r', '\n'];
    if value.contains(STRIPPED_CHARS) {
        value.replace(STRIPPED_CHARS, "_")
    } else {
        value.to_string()
    }
}

/// Encodes text fields followed by file parts as `multipart/form-data`.
pub(crate) fn encode_multipart(
    boundary: &str,
    fields: &[(String, String)],
    files: &[(String, FilePart)],
) -> Vec<u8> {
    let mut body = Vec::new();

    let open_part = |body: &mut Vec<u8>, name: &str| {
        body.extend_from_slice(b"--");
        body.extend_from_slice(boundary.as_bytes());
        body.extend_from_slice(b"\r\nContent-Disposition: form-data; name=\"");
        body.extend_from_slice(escape_quoted(name).as_bytes());
        body.push(b'"');
    };

    for (name, value) in fields {
        open_part(&mut body, name);
        body.extend_from_slice(b"\r\n\r\n");
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    for (name, part) in files {
        open_part(&mut body, name);
        if let Some(filename) = &part.filename {
            body.extend_from_slice(b"; filename=\"");
            body.extend_from_slice(escape_quoted(&filename.replace('/', "_")).as_bytes());
            body.push(b'"');
        }
        body.extend_from_slice(b"\r\nContent-Type: ");
        body.extend_from_slice(part.content_type.as_bytes());
        body.extend_from_slice(b"\r\n\r\n");
        body.extend_from_slice(&part.content);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(b"--");
    body.extend_from_slice(boundary.as_bytes());
    body.extend_from_slice(b"--\r\n");

    body
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn form_preserves_order() {
        let fields = vec![
            ("foo".to_string(), "bar".to_string()),
            ("baz".to_string(), "foobar".to_string()),
        ];
        assert_eq!(encode_form(&fields), "foo=bar&baz=foobar");
    }

    #[test]
    fn form_escapes_reserved() {
        let fields = vec![("q".to_string(), "a b&c".to_string())];
        assert_eq!(encode_form(&fields), "q=a+b%26c");
    }

    #[test]
    fn json_fields_stringify_non_strings() {
        let fields = json_fields(&json!({"name": "x", "n": 1, "tags": ["a"]}));
        assert_eq!(
            fields,
            vec![
                ("name".to_string(), "x".to_string()),
                ("n".to_string(), "1".to_string()),
                ("tags".to_string(), "[\"a\"]".to_string()),
            ]
        );
    }

    #[test]
    fn boundaries_differ() {
        assert_ne!(generate_multipart_boundary(), generate_multipart_boundary());
    }

    #[test]
    fn multipart_layout() {
        let files = vec![(
            "doc".to_string(),
            FilePart::new("hello", "text/plain").with_filename("a\"b.txt"),
        )];
        let fields = vec![("title".to_string(), "t".to_string())];
        let body = encode_multipart("XYZ", &fields, &files);
        let expected = "--XYZ\r\n\
            Content-Disposition: form-data; name=\"title\"\r\n\r\n\
            t\r\n\
            --XYZ\r\n\
            Content-Disposition: form-data; name=\"doc\"; filename=\"a_b.txt\"\r\n\
            Content-Type: text/plain\r\n\r\n\
            hello\r\n\
            --XYZ--\r\n";
        assert_eq!(String::from_utf8(body).unwrap(), expected);
    }
}
