pub mod cache;
pub mod cancel;
pub mod config;
pub mod error;
pub mod filter;
pub mod flatten;
pub mod markdown;
pub mod notice;
pub mod provider;
pub mod source;
pub mod value;

pub use cache::ValueCache;
pub use cancel::CancelToken;
pub use config::Config;
pub use error::{ConfigError, FetchError, FetchErrorKind};
pub use filter::{Candidate, filter};
pub use flatten::{Entry, SortKey, flatten};
pub use notice::{Notice, NoticeLevel};
pub use provider::{FixtureProvider, HelmProvider, StaticProvider, ValueTreeProvider};
pub use source::{
    CompletionItem, CompletionParams, CompletionResponse, CompletionSource, EditRange,
    HostAction, HostAdapter, ItemData, ItemKind,
};
pub use value::{ScalarKind, ValueNode};
