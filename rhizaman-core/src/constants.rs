pub const APP_NAME: &str = "rhizaman";

/// Entry whose presence marks a directory as a git working tree
pub const GIT_DIR_ENTRY: &str = ".git";

pub const TEMPLATE_MARKER_DIR: &str = ".rhiza";
pub const TEMPLATE_MARKER_FILE: &str = "template.yml";
