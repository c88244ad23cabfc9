pub mod config;
pub mod error;
pub mod invocation;
pub mod markup;
pub mod reconcile;

// Re-export main types for convenient access
pub use config::{AnnotationOptions, DocumentTime, DocumentType, Language, OutputFormat, TextEncoding};
pub use error::{HeidelTimeError, Result};
pub use invocation::{AnnotationOutput, HeidelTime, HEIDELTIME_PATH_ENV};

// Re-export the reconciliation engine
pub use markup::{AnnotationTag, MarkupParser, MarkupSchema, XmlMarkupParser};
pub use reconcile::{
    reconcile, reconcile_tags, strip_container_boundary, AnnotationRecord, MissPolicy, Reconciler,
    Reconciliation, ScanAnomaly, CONTAINER_BOUNDARY_CHARS,
};
