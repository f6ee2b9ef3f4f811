mod fixture;
mod helm;

pub use fixture::{FixtureProvider, StaticProvider};
pub use helm::HelmProvider;

use crate::cancel::CancelToken;
use crate::error::FetchError;
use crate::value::ValueNode;

/// Source of a chart's default values.
pub trait ValueTreeProvider {
    /// Fetch and parse the values tree of `chart_ref`. The result is always a
    /// [`ValueNode::Object`].
    fn fetch(&self, chart_ref: &str, cancel: &CancelToken) -> Result<ValueNode, FetchError>;
}

impl<P: ValueTreeProvider + ?Sized> ValueTreeProvider for Box<P> {
    fn fetch(&self, chart_ref: &str, cancel: &CancelToken) -> Result<ValueNode, FetchError> {
        (**self).fetch(chart_ref, cancel)
    }
}

impl<P: ValueTreeProvider + ?Sized> ValueTreeProvider for &P {
    fn fetch(&self, chart_ref: &str, cancel: &CancelToken) -> Result<ValueNode, FetchError> {
        (**self).fetch(chart_ref, cancel)
    }
}

/// Parse values YAML into an object tree.
///
/// Empty output means a chart without defaults and yields an empty object.
/// Any other non-mapping root is a parse failure.
pub fn parse_values(chart_ref: &str, text: &str) -> Result<ValueNode, FetchError> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|err| FetchError::parse(chart_ref, err.to_string()))?;
    match ValueNode::from_yaml(&value) {
        node @ ValueNode::Object(_) => Ok(node),
        ValueNode::Scalar {
            kind: crate::value::ScalarKind::Null,
            ..
        } => Ok(ValueNode::empty_object()),
        ValueNode::Scalar { kind, .. } => Err(FetchError::parse(
            chart_ref,
            format!("expected a mapping at the root, found {}", kind),
        )),
    }
}
