pub mod asset_sink;
pub mod config;
pub mod markdown_converter;
pub mod utils;

pub use asset_sink::{
    AssetEntry, AssetError, AssetPayload, AssetSink, FetchConfig, HttpImageFetcher, ImageFetcher,
};
pub use config::{ConversionContext, ConversionContextBuilder};
pub use markdown_converter::{
    ArticleSource, ConversionError, ConversionResult, ConversionSession, ConvertedArticle,
    convert_article, merge_articles,
};
