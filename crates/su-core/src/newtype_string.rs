//! Macro for defining validated string newtypes.
//!
//! Each newtype carries a validation predicate checked on construction, so a
//! value that exists is always well-formed.

/// Define a string newtype guarded by `valid`.
///
/// Generates `try_new()` (returns `None` on invalid input), `as_str()`,
/// `Display`, `AsRef<str>`, `Deref<Target = str>` and `FromStr` whose error
/// is `expect` rendered as a message.
macro_rules! define_newtype_string {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident;
        valid = $valid:expr;
        expect = $expect:literal;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis struct $Name(String);

        impl $Name {
            /// Try to create a new instance, returning `None` if validation fails.
            pub fn try_new(value: impl Into<String>) -> Option<Self> {
                let s = value.into();
                let check: fn(&str) -> bool = $valid;
                if check(&s) {
                    Some(Self(s))
                } else {
                    None
                }
            }

            /// Return the underlying value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $Name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::ops::Deref for $Name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl std::str::FromStr for $Name {
            type Err = String;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::try_new(s).ok_or_else(|| format!("'{}': {}", s, $expect))
            }
        }
    };
}

pub(crate) use define_newtype_string;
