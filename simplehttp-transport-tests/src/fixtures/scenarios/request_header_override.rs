#[cfg(test)]
mod tests {
    use std::sync::{Arc, OnceLock};

    use http_body_util::BodyExt;
    use hyper::header::CONTENT_TYPE;

    use crate::*;

    #[test]
    fn test_content_type_override() {
        const PATH: &str = "scenarios/content_type_override";
        let received = Arc::new(OnceLock::new());
        let _handle = crate::add_hyper_fixture(PATH, {
            let received = Arc::clone(&received);
            move |req| {
                let received = Arc::clone(&received);
                async move {
                    let content_types = req
                        .headers()
                        .get_all(CONTENT_TYPE)
                        .iter()
                        .map(|v| v.to_str().unwrap().to_owned())
                        .collect::<Vec<_>>();
                    let body = req.into_body().collect().await.unwrap().to_bytes();
                    received.set((content_types, body)).ok();
                    (Response::new(Full::new(Bytes::new())), Ok(()))
                }
            }
        });

        RUNTIME.block_on(async {
            let builder = crate::init_builder().await.unwrap();
            builder
                .url(PATH)
                .post()
                .json(serde_json::json!({"k": "v"}))
                .header("content-type", "application/vnd.test+json")
                .request()
                .unwrap()
                .wait()
                .await
                .unwrap();
        });

        let (content_types, body) = received.get().unwrap();
        assert_eq!(content_types, &["application/vnd.test+json"]);
        assert_eq!(&body[..], br#"{"k":"v"}"#);
    }

    #[test]
    fn test_multipart_content_type_is_replaced() {
        const PATH: &str = "scenarios/multipart_content_type";
        let _handle = crate::add_hyper_fixture(PATH, |req| async move {
            let ok = req
                .header_str(CONTENT_TYPE.as_str())
                .is_some_and(|ct| ct.starts_with("multipart/form-data; boundary="));
            (Response::new(Full::new(Bytes::new())), ok.then_some(()).ok_or(req))
        });

        RUNTIME.block_on(async {
            let builder = crate::init_builder().await.unwrap();
            builder
                .url(PATH)
                .header("Content-Type", "text/plain")
                .upload_part("f", simplehttp::FilePart::new("x", "text/plain"))
                .request()
                .unwrap()
                .wait()
                .await
                .unwrap();
        });
    }
}
