mod chunked_encoding;
mod outside_runtime;
mod request_header_override;
