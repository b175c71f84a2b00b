#[cfg(test)]
mod tests {
    use hyper::Method;

    use crate::*;

    #[test]
    fn test_request_without_tokio_runtime() {
        const PATH: &str = "scenarios/outside_runtime";
        let _handle = crate::add_hyper_fixture(PATH, |req| async move {
            let res = Response::new(Full::new(Bytes::from("from managed runtime")));
            (res, (req.method() == Method::GET).then_some(()).ok_or(req))
        });
        let builder = crate::init_builder_outside_runtime().unwrap();

        // Drive the response with a plain executor; the transport brings its own runtime.
        let (status, content) = futures::executor::block_on(async {
            let mut res = builder.url(PATH).request().unwrap();
            (
                res.status_code().await.unwrap(),
                res.content().await.unwrap(),
            )
        });
        assert_eq!(status, 200);
        assert_eq!(content, "from managed runtime");
    }
}
