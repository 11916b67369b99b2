#![allow(missing_docs)]

pub mod error;
pub mod evaluate;
pub mod field_map;
pub mod memo;
pub mod options;
pub mod path;
pub mod resolve;
pub mod schema;
pub mod submit;
pub mod value;

pub use error::{FetchError, PathParseError, SchemaError};
pub use evaluate::{EvaluationResult, evaluate};
pub use field_map::{FieldEntry, FieldMap, build_field_map};
pub use memo::MemoizedEvaluator;
pub use options::{OptionSource, options_from_response, resolve_remote_options, response_items};
pub use path::{Path, Segment, get_nested_value};
pub use resolve::{find_field_paths, find_field_values};
pub use schema::{
    ApiConfig, DependencyType, EntitySchema, FieldDefinition, FieldOption, FieldShape,
    GenerateAction, RestrictionAction, SyncBehavior, SyncRule, UpdateField, ValueUpdateAction,
    wire_schema,
};
pub use submit::submission_values;
pub use value::{extract_value, is_option_object, trigger_key};
