//! # Utility Functions Module
//!
//! Helpers for building minifier argument lists.

use std::path::Path;

/// Placeholder replaced with the absolute path of the file being minified
pub const INPUT_PLACEHOLDER: &str = "{input}";
/// Placeholder replaced with the absolute path the minifier must write to
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Converts any iterable of string-like items to `Vec<String>`.
///
/// # Example
/// ```ignore
/// let args = to_string_vec(["-o", "{output}", "{input}"]);
/// ```
pub fn to_string_vec<T, I>(items: I) -> Vec<String>
where
    T: ToString,
    I: IntoIterator<Item = T>,
{
    items.into_iter().map(|item| item.to_string()).collect()
}

/// Fills `{input}` and `{output}` in an argument template.
///
/// Placeholders may appear inside a larger argument (`--out={output}`).
pub fn expand_placeholders(template: &[String], input: &Path, output: &Path) -> Vec<String> {
    let input = input.to_string_lossy();
    let output = output.to_string_lossy();
    template
        .iter()
        .map(|arg| {
            arg.replace(INPUT_PLACEHOLDER, &input)
                .replace(OUTPUT_PLACEHOLDER, &output)
        })
        .collect()
}

/// Whether an argument template references both placeholders
pub fn has_placeholders(template: &[String]) -> bool {
    let has = |needle: &str| template.iter().any(|arg| arg.contains(needle));
    has(INPUT_PLACEHOLDER) && has(OUTPUT_PLACEHOLDER)
}

/// Builds a `Vec<String>` argument template from string literals.
///
/// ```ignore
/// let args = args!["-o", "{output}", "{input}"];
/// ```
#[macro_export]
macro_rules! args {
    [$($item:expr),* $(,)?] => {
        $crate::utils::to_string_vec([$($item),*])
    };
}
