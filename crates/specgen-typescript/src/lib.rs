pub mod driver;
pub mod emitters;
pub mod generator;
pub mod name_normalizer;
pub mod templates;
pub mod type_mapper;

pub use driver::{GenerateError, generate};
pub use generator::{GenerateOptions, LegacyModelGenerator, ModernModelGenerator};
