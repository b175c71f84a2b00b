#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use futures::stream;
    use http_body_util::BodyExt;
    use hyper::{Method, Response};

    use crate::*;

    const CHUNKS: [&str; 4] = ["Hello", ", ", "chunked ", "world!"];

    fn chunked_fixture(path: &str) -> HyperFixtureHandle {
        crate::add_hyper_fixture(path, move |req| async move {
            let stream = stream::iter(CHUNKS.iter().map(|chunk| {
                let chunk = Bytes::copy_from_slice(chunk.as_bytes());
                Ok::<_, hyper::Error>(hyper::body::Frame::data(chunk))
            }));
            let body = http_body_util::StreamBody::new(stream).boxed();
            let res = Response::new(body);
            (res, (req.method() == Method::GET).then_some(()).ok_or(req))
        })
    }

    #[test]
    fn test_chunked_encoding() {
        const PATH: &str = "scenarios/chunked_encoding";
        let _handle = chunked_fixture(PATH);

        let content = RUNTIME.block_on(async {
            let builder = crate::init_builder().await.unwrap();
            builder.url(PATH).request().unwrap().content().await.unwrap()
        });
        assert_eq!(content, CHUNKS.concat());
    }

    #[test]
    fn test_progress_reports_downloaded_bytes() {
        const PATH: &str = "scenarios/chunked_progress";
        let _handle = chunked_fixture(PATH);
        let ticks = Arc::new(Mutex::new(vec![]));

        RUNTIME.block_on(async {
            let builder = crate::init_builder().await.unwrap();
            let ticks = Arc::clone(&ticks);
            builder
                .url(PATH)
                .progress(move |p| {
                    ticks
                        .lock()
                        .unwrap()
                        .push((p.downloaded, p.info.http_method))
                })
                .request()
                .unwrap()
                .wait()
                .await
                .unwrap();
        });

        let ticks = ticks.lock().unwrap();
        let expected = CHUNKS.concat().len() as u64;
        // One tick for the head, at least one more once data arrived.
        assert!(ticks.len() >= 2);
        assert_eq!(ticks[0].0, 0);
        assert_eq!(ticks.last().unwrap().0, expected);
        assert!(ticks.windows(2).all(|w| w[0].0 <= w[1].0));
        assert!(ticks.iter().all(|t| t.1 == simplehttp::Method::Get));
    }
}
