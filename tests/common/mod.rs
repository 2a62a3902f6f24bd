//! Test utilities and helper functions for the article2md test suite

use std::sync::Arc;

use kodegen_tools_article2md::{AssetSink, ConversionContext, ConversionSession, FetchConfig};
use std::time::Duration;

/// Wraps an article body in a full page, the way saved articles arrive
#[allow(dead_code)]
pub fn create_article_page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
    <meta charset="UTF-8">
    <title>{}</title>
</head>
<body>
    <div class="toolbar">登录 注册</div>
    <article>
        <div id="content_views" class="markdown_views">
            {}
        </div>
    </article>
    <div class="recommend-box">推荐阅读</div>
</body>
</html>"#,
        html_escape::encode_text(title),
        body
    )
}

/// Convert with a fresh session and its own sink
#[allow(dead_code)]
pub async fn convert(html: &str, context: ConversionContext) -> String {
    ConversionSession::new(context)
        .convert_html(html)
        .await
        .expect("conversion should succeed")
}

/// Convert with default settings
#[allow(dead_code)]
pub async fn convert_default(html: &str) -> String {
    convert(html, ConversionContext::default()).await
}

/// Session sharing the given sink, with image saving switched on
#[allow(dead_code)]
pub fn saving_session(sink: Arc<AssetSink>) -> ConversionSession {
    let context = ConversionContext::builder()
        .save_images_locally(true)
        .build()
        .expect("valid context");
    ConversionSession::with_sink(context, sink)
}

/// Fetch settings that keep retry tests fast
#[allow(dead_code)]
pub fn fast_fetch_config(max_attempts: u32) -> FetchConfig {
    FetchConfig {
        timeout: Duration::from_secs(5),
        max_attempts,
        retry_delay: Duration::from_millis(1),
        ..FetchConfig::default()
    }
}
