use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A free-form language tag. Two hints are equal iff their canonical forms
/// (trimmed, ascii-lowercased) are equal; the original spelling is preserved
/// for display and serialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct LanguageHint(String);

impl LanguageHint {
    pub fn new(language: impl Into<String>) -> Self {
        Self(language.into())
    }

    /// The canonical form used for comparison and hashing.
    pub fn canonical(&self) -> String {
        self.0.trim().to_ascii_lowercase()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl PartialEq for LanguageHint {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for LanguageHint {}

impl Hash for LanguageHint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state)
    }
}

impl Display for LanguageHint {
    delegate::delegate! {
        to self.0 {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result;
        }
    }
}

impl FromStr for LanguageHint {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl<T: AsRef<str>> From<T> for LanguageHint {
    fn from(value: T) -> Self {
        Self::new(value.as_ref())
    }
}

impl Deref for LanguageHint {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod test {
    use super::LanguageHint;

    #[test]
    fn equality_ignores_case_and_padding() {
        let a: LanguageHint = "DE".into();
        let b: LanguageHint = " de ".into();
        assert_eq!(a, b);
        assert_ne!(a, LanguageHint::new("en"));
    }

    #[test]
    fn keeps_original_spelling() {
        let a = LanguageHint::new("De-AT");
        assert_eq!("De-AT", a.to_string());
    }
}
