use regex::Regex;
use std::sync::OnceLock;

/// Table name of the configuration section, `[incrfmt]` or `[tool.incrfmt]`.
pub const CONFIG_SECTION: &str = "incrfmt";

/// Dedicated configuration file name.
pub const CONFIG_FILENAME: &str = ".incrfmt.toml";

/// Python project file that may carry a `[tool.incrfmt]` table.
pub const PYPROJECT_FILENAME: &str = "pyproject.toml";

/// Regex for a `START-END` line range, surrounding blanks allowed.
///
/// # Panics
///
/// Panics if the regex pattern is invalid.
pub fn line_range_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| {
        Regex::new(r"^[ \t]*([0-9]+)[ \t]*-[ \t]*([0-9]+)[ \t]*$")
            .expect("Invalid line range regex pattern")
    })
}
