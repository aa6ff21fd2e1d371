//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// Success - operation completed without errors
#[allow(dead_code)]
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Validation error - TLS material or template integrity checks failed
pub const VALIDATION_ERROR: i32 = 2;

/// Render error - gateway configuration rendering failed
pub const RENDER_ERROR: i32 = 3;

/// Template error - invalid template directory, Template.yaml or version file
pub const TEMPLATE_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;
