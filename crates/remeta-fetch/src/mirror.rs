use std::borrow::Cow;

/// Canonical origin whose references get routed through a mirror.
pub const GITHUB_PREFIX: &str = "https://github.com/";

/// Prefix-prepending mirror mapping: `P` becomes `<host>/P`.
///
/// The same transform is applied to download URLs and to file contents.
/// Occurrences that already carry the mirror prefix are left untouched, so
/// applying it twice gives the same result as applying it once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mirror {
    host: String,
    canonical: String,
}

impl Mirror {
    /// Mirror `https://github.com/` through `host`.
    pub fn new(host: impl Into<String>) -> Self {
        Self::with_canonical(host, GITHUB_PREFIX)
    }

    pub fn with_canonical(host: impl Into<String>, canonical: impl Into<String>) -> Self {
        let host = host.into();
        Self {
            host: host.trim_end_matches('/').to_owned(),
            canonical: canonical.into(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// `<host>/<canonical>`
    pub fn mirrored_prefix(&self) -> String {
        format!("{}/{}", self.host, self.canonical)
    }

    /// Rewrite every occurrence of the canonical prefix in `text`.
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if self.canonical.is_empty() {
            return Cow::Borrowed(text);
        }

        let lead = format!("{}/", self.host);
        let mut out = String::new();
        let mut last = 0;
        let mut changed = false;

        for (idx, _) in text.match_indices(self.canonical.as_str()) {
            if text[..idx].ends_with(&lead) {
                continue;
            }
            out.push_str(&text[last..idx]);
            out.push_str(&lead);
            last = idx;
            changed = true;
        }

        if !changed {
            return Cow::Borrowed(text);
        }
        out.push_str(&text[last..]);
        Cow::Owned(out)
    }
}
