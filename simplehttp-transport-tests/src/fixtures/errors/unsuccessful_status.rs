#[cfg(test)]
mod tests {
    use hyper::StatusCode;
    use simplehttp::Error;

    use crate::*;

    fn serve_status(path: &'static str, status: StatusCode) -> HyperFixtureHandle {
        crate::add_hyper_fixture(path, move |_| async move {
            let mut res = Response::new(Full::new(Bytes::from("body")));
            *res.status_mut() = status;
            (res, Ok(()))
        })
    }

    #[test]
    fn test_unsuccessful_status_is_not_an_error_by_default() {
        const PATH: &str = "errors/status_default";
        let _handle = serve_status(PATH, StatusCode::INTERNAL_SERVER_ERROR);
        let (status, content) = RUNTIME.block_on(async {
            let builder = crate::init_builder().await.unwrap();
            let mut res = builder.url(PATH).request().unwrap();
            (
                res.status_code().await.unwrap(),
                res.content().await.unwrap(),
            )
        });
        assert_eq!(status, 500);
        assert!(!status.is_successful());
        assert_eq!(content, "body");
    }

    #[test]
    fn test_with_successful_status() {
        const PATH: &str = "errors/status_checked";
        let _handle = serve_status(PATH, StatusCode::NOT_FOUND);
        let err = RUNTIME.block_on(async {
            let builder = crate::init_builder().await.unwrap();
            builder
                .url(PATH)
                .request()
                .unwrap()
                .with_successful_status()
                .await
                .unwrap_err()
        });
        assert!(matches!(err, Error::UnsuccessfulStatus(status) if status == 404));
        assert_eq!(err.to_string(), "Unsuccessful status code: 404");
    }

    #[test]
    fn test_successful_status_passes_through() {
        const PATH: &str = "errors/status_ok";
        let _handle = serve_status(PATH, StatusCode::CREATED);
        let content = RUNTIME.block_on(async {
            let builder = crate::init_builder().await.unwrap();
            let mut res = builder
                .url(PATH)
                .request()
                .unwrap()
                .with_successful_status()
                .await
                .unwrap();
            res.content().await.unwrap()
        });
        assert_eq!(content, "body");
    }

    #[test]
    fn test_connection_refused_is_a_transport_error() {
        let err = RUNTIME.block_on(async {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            let port = listener.local_addr().unwrap().port();
            drop(listener);
            simplehttp::create(simplehttp_transport_reqwest::ReqwestTransport::new())
                .url(format!("http://127.0.0.1:{port}/"))
                .request()
                .unwrap()
                .status_code()
                .await
                .unwrap_err()
        });
        assert!(matches!(
            err.transport_error(),
            Some(simplehttp::interface::Error::Network(_))
        ));
    }
}
