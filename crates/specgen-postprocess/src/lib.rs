pub mod enums;
pub mod error;
pub mod pipeline;

use specgen_core::config::{EnumConfig, PostprocessConfig};

pub use enums::{BrandedEnumTransform, EnumTransformCandidate, EnumUnionTransform};
pub use error::{PostprocessError, TransformError};
pub use pipeline::{
    FileContext, PostprocessOptions, PostprocessReport, Rename, Rewrite, SupportFile, Transform,
    run,
};

/// The default transform list: the `*Enum` union pass, then the size-gated pass.
pub fn default_transforms(enums: &EnumConfig) -> Vec<Box<dyn Transform>> {
    vec![
        Box::new(EnumUnionTransform),
        Box::new(BrandedEnumTransform::from(enums)),
    ]
}

impl From<&PostprocessConfig> for PostprocessOptions {
    fn from(config: &PostprocessConfig) -> Self {
        Self {
            extensions: config.extensions.clone(),
            formatter: config.formatter.clone(),
        }
    }
}
