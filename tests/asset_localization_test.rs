mod common;

use std::sync::Arc;

use common::{fast_fetch_config, saving_session};
use kodegen_tools_article2md::{
    ArticleSource, AssetError, AssetPayload, AssetSink, ConversionContext, ConversionError,
    HttpImageFetcher, convert_article, merge_articles,
};
use mockito::Matcher;

#[tokio::test]
async fn test_images_and_svg_localized_into_one_scope() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/pic.png")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body([137u8, 80, 78, 71])
        .expect(1)
        .create_async()
        .await;

    let fetcher = HttpImageFetcher::new(fast_fetch_config(2));
    let sink = Arc::new(AssetSink::with_fetcher(Arc::new(fetcher)));
    let session = saving_session(Arc::clone(&sink));

    let html = format!(
        r#"<p><img src="{url}/pic.png?w=1"></p><p><img src="{url}/pic.png?w=2"></p><svg><circle r="4"></circle></svg>"#,
        url = server.url()
    );
    let md = session.convert_html(&html).await.unwrap();
    assert_eq!(md, "![](assets/1.png)\n\n![](assets/1.png)\n\n![](assets/2.svg)\n\n");
    mock.assert_async().await;

    let entries = sink.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].payload, AssetPayload::Bytes(vec![137, 80, 78, 71]));
    assert_eq!(entries[1].mime_type, "image/svg+xml");

    let out = tempfile::tempdir().unwrap();
    let written = sink.write_to_dir(out.path(), None).await.unwrap();
    assert_eq!(written.len(), 2);
    assert!(out.path().join("assets/1.png").exists());
    let svg = std::fs::read_to_string(out.path().join("assets/2.svg")).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains(r#"xmlns="http://www.w3.org/2000/svg""#));
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_extensionless_image_named_after_content_type() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/render")
        .with_status(200)
        .with_header("content-type", "image/jpeg")
        .with_body("jpeg-bytes")
        .expect(1)
        .create_async()
        .await;

    let fetcher = HttpImageFetcher::new(fast_fetch_config(1));
    let sink = Arc::new(AssetSink::with_fetcher(Arc::new(fetcher)));
    let session = saving_session(Arc::clone(&sink));
    let html = format!(
        r#"<p><img src="{url}/render"></p><p><img src="{url}/render"></p>"#,
        url = server.url()
    );
    let md = session.convert_html(&html).await.unwrap();
    assert_eq!(md, "![](assets/1.jpg)\n\n![](assets/1.jpg)\n\n");
    mock.assert_async().await;

    let entries = sink.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].mime_type, "image/jpeg");
}

#[tokio::test]
async fn test_pending_images_fetched_at_write_time() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/late.jpg")
        .with_status(200)
        .with_body("jpeg-bytes")
        .create_async()
        .await;

    let sink = Arc::new(AssetSink::new());
    let session = saving_session(Arc::clone(&sink));
    let md = session
        .convert_html(&format!(r#"<img src="{}/late.jpg">"#, server.url()))
        .await
        .unwrap();
    assert_eq!(md, "![](assets/1.jpg)\n\n");
    assert!(matches!(sink.entries()[0].payload, AssetPayload::Pending { .. }));

    let out = tempfile::tempdir().unwrap();
    let fetcher = HttpImageFetcher::new(fast_fetch_config(1));
    sink.write_to_dir(out.path(), Some(&fetcher)).await.unwrap();
    mock.assert_async().await;
    assert_eq!(
        std::fs::read(out.path().join("assets/1.jpg")).unwrap(),
        b"jpeg-bytes"
    );
}

#[tokio::test]
async fn test_pending_images_skipped_without_fetcher() {
    let sink = Arc::new(AssetSink::new());
    let session = saving_session(Arc::clone(&sink));
    session
        .convert_html(r#"<img src="https://img.example/a.png">"#)
        .await
        .unwrap();

    let out = tempfile::tempdir().unwrap();
    let written = sink.write_to_dir(out.path(), None).await.unwrap();
    assert!(written.is_empty());
    assert!(!out.path().join("assets/1.png").exists());
}

#[tokio::test]
async fn test_merge_gives_each_article_its_own_prefix() {
    let sink = Arc::new(AssetSink::new());
    let context = ConversionContext::builder()
        .save_images_locally(true)
        .build()
        .unwrap();
    let articles = vec![
        ArticleSource {
            title: "One".into(),
            html: r#"<p><img src="https://img.example/a.png"></p>"#.into(),
        },
        ArticleSource {
            title: "Two".into(),
            html: r#"<p><img src="https://img.example/a.png"></p>"#.into(),
        },
    ];

    let md = merge_articles(&articles, &context, Arc::clone(&sink)).await.unwrap();
    assert_eq!(
        md,
        "# One\n\n![](assets/1_1.png)\n\n# Two\n\n![](assets/2_1.png)\n\n"
    );
    let paths: Vec<String> = sink.entries().into_iter().map(|e| e.logical_path).collect();
    assert_eq!(paths, vec!["assets/1_1.png", "assets/2_1.png"]);
}

#[tokio::test]
async fn test_fetch_failure_aborts_conversion() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/missing.png")
        .with_status(404)
        .expect(2)
        .create_async()
        .await;

    let fetcher = HttpImageFetcher::new(fast_fetch_config(2));
    let sink = Arc::new(AssetSink::with_fetcher(Arc::new(fetcher)));
    let session = saving_session(Arc::clone(&sink));

    let result = session
        .convert_html(&format!(r#"<p><img src="{}/missing.png"></p>"#, server.url()))
        .await;
    assert!(matches!(
        result,
        Err(ConversionError::Asset(AssetError::Fetch { attempts: 2, .. }))
    ));
    mock.assert_async().await;
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_images_left_remote_when_saving_is_off() {
    let sink = Arc::new(AssetSink::new());
    let session = kodegen_tools_article2md::ConversionSession::with_sink(
        ConversionContext::default(),
        Arc::clone(&sink),
    );
    let md = session
        .convert_html(r#"<p><img src="https://img.example/a.png" alt="A"></p>"#)
        .await
        .unwrap();
    assert_eq!(md, "![A](https://img.example/a.png)\n\n");
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_convert_article_drains_its_assets() {
    let context = ConversionContext::builder()
        .save_images_locally(true)
        .asset_dir_name("img")
        .asset_file_prefix("post_")
        .build()
        .unwrap();
    let article = convert_article(
        r#"<p><img src="https://img.example/x.webp"><img src="data:image/png;base64,AAAA"></p>"#,
        context,
    )
    .await
    .unwrap();

    assert!(article.markdown.starts_with("![](img/post_1.webp)"));
    assert!(article.markdown.contains("![](data:image/png;base64,AAAA)"));
    assert_eq!(article.assets.len(), 1);
    assert_eq!(article.assets[0].logical_path, "img/post_1.webp");
    assert_eq!(article.assets[0].mime_type, "image/webp");
}
