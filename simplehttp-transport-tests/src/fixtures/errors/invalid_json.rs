#[cfg(test)]
mod tests {
    use simplehttp::Error;

    use crate::*;

    fn serve(path: &'static str, body: &'static str) -> HyperFixtureHandle {
        crate::add_hyper_fixture(path, move |_| async move {
            (Response::new(Full::new(Bytes::from(body))), Ok(()))
        })
    }

    #[test]
    fn test_invalid_json() {
        const PATH: &str = "errors/invalid_json";
        let _handle = serve(PATH, "{not json");
        let err = RUNTIME.block_on(async {
            let builder = crate::init_builder().await.unwrap();
            builder.url(PATH).request().unwrap().to_array().await.unwrap_err()
        });
        assert!(matches!(err, Error::JsonDecode { .. }));
    }

    #[test]
    fn test_empty_body_is_not_json() {
        const PATH: &str = "errors/empty_json";
        let _handle = serve(PATH, "");
        let err = RUNTIME.block_on(async {
            let builder = crate::init_builder().await.unwrap();
            builder.url(PATH).request().unwrap().to_array().await.unwrap_err()
        });
        assert_eq!(err.to_string(), "JSON decode error: Response body is empty.");
    }

    #[test]
    fn test_scalar_json_is_not_an_array() {
        const PATH: &str = "errors/scalar_json";
        let _handle = serve(PATH, "42");
        let (err, content) = RUNTIME.block_on(async {
            let builder = crate::init_builder().await.unwrap();
            let mut res = builder.url(PATH).request().unwrap();
            let err = res.to_array().await.unwrap_err();
            // The raw body is still readable after a decode failure.
            (err, res.content().await.unwrap())
        });
        assert!(err.to_string().contains("\"int\" returned"));
        assert_eq!(content, "42");
    }
}
