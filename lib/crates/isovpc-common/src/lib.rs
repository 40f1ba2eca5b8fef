pub mod expr;
pub mod logical_id;
pub mod properties;
pub mod template;

pub use expr::{AWS_PARTITION, AWS_REGION, Expr};
pub use logical_id::LogicalId;
pub use properties::*;
pub use template::{Output, Parameter, Resource, ResourceType, Template, TemplateError};
