#[cfg(test)]
mod tests {
    use std::sync::{Arc, OnceLock};

    use futures::StreamExt as _;
    use http_body_util::BodyStream;
    use hyper::header::CONTENT_TYPE;
    use multer::Multipart;
    use simplehttp::FilePart;

    use crate::*;

    const TEST_CONTENT: &str = "test content";

    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    struct FormItem {
        name: String,
        file_name: String,
        content_type: String,
        bytes: Bytes,
    }

    async fn collect_form(req: Request<body::Incoming>) -> Vec<FormItem> {
        let boundary = req
            .header_str(CONTENT_TYPE.as_str())
            .and_then(|ct| multer::parse_boundary(ct).ok());
        let body_stream = BodyStream::new(req.into_body()).filter_map(|result| async move {
            result.map(|frame| frame.into_data().ok()).transpose()
        });
        let mut multipart = Multipart::new(body_stream, boundary.unwrap_or_default());
        let mut form_items = vec![];
        while let Some(field) = multipart.next_field().await.unwrap() {
            form_items.push(FormItem {
                name: field.name().unwrap_or_default().to_owned(),
                file_name: field.file_name().unwrap_or("not_a_file").into(),
                content_type: field
                    .content_type()
                    .map(|mime| mime.to_string())
                    .unwrap_or_default(),
                bytes: field.bytes().await.unwrap_or_default(),
            });
        }
        form_items
    }

    #[test]
    fn test_upload_files_with_fields() {
        const PATH: &str = "multipart/upload";
        let received = Arc::new(OnceLock::new());
        let _handle = crate::add_hyper_fixture(PATH, {
            let received = Arc::clone(&received);
            move |req: Request<body::Incoming>| {
                let received = Arc::clone(&received);
                async move {
                    let is_post = req.method() == hyper::Method::POST;
                    received.set((is_post, collect_form(req).await)).ok();
                    (Response::new(Full::new(Bytes::new())), Ok(()))
                }
            }
        });

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, TEST_CONTENT).unwrap();

        RUNTIME.block_on(async {
            let builder = crate::init_builder().await.unwrap();
            builder
                .url(PATH)
                .form_data([("title", "hello"), ("lang", "en")])
                .upload_file("doc", &path)
                .upload_part(
                    "blob",
                    FilePart::new(vec![1u8, 2, 3], "application/octet-stream")
                        .with_filename("dir/blob.bin"),
                )
                .request()
                .unwrap()
                .wait()
                .await
                .unwrap();
        });

        let (is_post, items) = received.get().unwrap();
        assert!(is_post);
        assert_eq!(
            items,
            &[
                FormItem {
                    name: "title".into(),
                    file_name: "not_a_file".into(),
                    content_type: String::new(),
                    bytes: Bytes::from("hello"),
                },
                FormItem {
                    name: "lang".into(),
                    file_name: "not_a_file".into(),
                    content_type: String::new(),
                    bytes: Bytes::from("en"),
                },
                FormItem {
                    name: "doc".into(),
                    file_name: "notes.txt".into(),
                    content_type: "text/plain".into(),
                    bytes: Bytes::from(TEST_CONTENT),
                },
                FormItem {
                    name: "blob".into(),
                    file_name: "dir_blob.bin".into(),
                    content_type: "application/octet-stream".into(),
                    bytes: Bytes::from_static(&[1, 2, 3]),
                },
            ]
        );
    }

    #[test]
    fn test_upload_with_text_body_is_rejected() {
        RUNTIME.block_on(async {
            let builder = crate::init_builder().await.unwrap();
            let err = builder
                .url("multipart/rejected")
                .body("raw text")
                .upload_part("blob", FilePart::new("x", "text/plain"))
                .request()
                .unwrap_err();
            assert!(matches!(err, simplehttp::Error::InvalidArgument(_)));
        });
    }
}
