#[cfg(test)]
mod tests {
    use hyper::Method;
    use serde::Deserialize;
    use serde_json::json;

    use crate::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Greeting {
        message: String,
    }

    #[test]
    fn test_get_json() {
        const PATH: &str = "get_json";
        let _handle = crate::add_hyper_fixture(PATH, |req| async move {
            let body = r#"{"message": "Hello, world!"}"#;
            let res = Response::builder()
                .header("content-type", "application/json")
                .body(Full::new(Bytes::from(body)))
                .unwrap();
            (res, (req.method() == Method::GET).then_some(()).ok_or(req))
        });
        let (status, array, greeting) = RUNTIME.block_on(async {
            let builder = crate::init_builder().await.unwrap();
            let mut res = builder.url(PATH).request().unwrap();
            let status = res.status_code().await.unwrap();
            let array = res.to_array().await.unwrap();
            let greeting: Greeting = res.json().await.unwrap();
            (status, array, greeting)
        });
        assert_eq!(status, 200);
        assert_eq!(array, json!({"message": "Hello, world!"}));
        assert_eq!(
            greeting,
            Greeting {
                message: "Hello, world!".into()
            }
        );
    }

    #[test]
    fn test_get_json_array() {
        const PATH: &str = "get_json_array";
        let _handle = crate::add_hyper_fixture(PATH, |req| async move {
            let res = Response::new(Full::new(Bytes::from("[1, 2, 3]")));
            (res, (req.method() == Method::GET).then_some(()).ok_or(req))
        });
        let array = RUNTIME.block_on(async {
            let builder = crate::init_builder().await.unwrap();
            builder.url(PATH).request().unwrap().to_array().await.unwrap()
        });
        assert_eq!(array, json!([1, 2, 3]));
    }
}
