//! Strongly-typed names used across commands.

use crate::newtype_string::define_newtype_string;

define_newtype_string! {
    /// Name of a seed set, e.g. `dev` for `seed/dev/` and `seed/dev.sql`.
    ///
    /// Must be a single path component.
    pub struct SeedName;
    valid = |s| !s.is_empty() && s != "." && s != ".." && !s.contains(['/', '\\']);
    expect = "seed name must be a non-empty single path component";
}

define_newtype_string! {
    /// A branch name on the `origin` remote used as the comparison base.
    pub struct BaseBranch;
    valid = |s| !s.is_empty() && !s.starts_with('-') && !s.chars().any(char::is_whitespace);
    expect = "branch name must be non-empty, without whitespace or a leading '-'";
}

define_newtype_string! {
    /// A version recorded as applied in the runner's bookkeeping table.
    ///
    /// Unlike [`MigrationVersion`](crate::MigrationVersion) this is only
    /// required to be numeric; the runner stores whatever it parsed.
    pub struct AppliedVersion;
    valid = |s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    expect = "applied version must be numeric";
}

#[cfg(test)]
#[path = "names_test.rs"]
mod tests;
