//! Well-known names and placeholders shared across the crate.

/// File extension of entry config descriptors.
pub const DESCRIPTOR_EXTENSION: &str = "json";

/// File name of the tool-level configuration.
pub const TOOL_CONFIG_FILE: &str = "duckling.json";

/// Placeholder substituted with a chunk id in URI and output path templates.
pub const CHUNK_ID_PLACEHOLDER: &str = "%s";

/// Required suffix of `module-output-path`.
pub const CHUNK_OUTPUT_SUFFIX: &str = "%s.js";

/// Placeholder the compiler replaces with the compiled chunk body.
pub const OUTPUT_PLACEHOLDER: &str = "%output%";

/// Global the runtime module loader reads chunk dependencies from.
pub const MODULE_INFO_VAR: &str = "PLOVR_MODULE_INFO";

/// Global the runtime module loader reads chunk URIs from.
pub const MODULE_URIS_VAR: &str = "PLOVR_MODULE_URIS";

/// Default compiler executable for the process backend.
pub const DEFAULT_COMPILER: &str = "google-closure-compiler";

/// Directory scanned for entry configs when none is configured.
pub const DEFAULT_ENTRY_CONFIG_DIR: &str = "entry-config";
