//! Collision-free filename generation for a download batch.
//!
//! Base names are derived from a raw naming key (typically a human-readable
//! CSV column such as a species or document name) by normalizing the key and
//! appending a per-key counter, so two rows with the same key get distinct
//! names. The final filename is the base name plus whatever extension the
//! source URL carries.

use std::collections::HashMap;

use url::Url;

/// Lower-cases `raw` and collapses every maximal run of characters outside
/// `[a-z0-9]` into a single underscore.
///
/// Leading and trailing runs also become underscores; `"Tree Frog!"`
/// normalizes to `"tree_frog_"`.
#[must_use]
pub fn normalize_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_sep = false;
    for ch in raw.to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            out.push(ch);
            prev_sep = false;
        } else if !prev_sep {
            out.push('_');
            prev_sep = true;
        }
    }
    out
}

/// Generates base names that are unique within one download run.
///
/// The counter map is owned by the generator and lives exactly as long as
/// one engine run; names are only guaranteed unique against other names from
/// the same instance.
#[derive(Debug, Default)]
pub struct UniqueNamer {
    counts: HashMap<String, u32>,
}

impl UniqueNamer {
    /// Creates a generator with no names assigned yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next unique base name for `raw`.
    ///
    /// The normalized key gets a zero-padded 3-digit suffix that counts up
    /// from `001` per key: `tree_frog_001`, `tree_frog_002`, ...
    ///
    /// Past 999 collisions for one key the suffix widens to four digits;
    /// names stay unique within the run but the fixed width does not hold.
    pub fn next_base_name(&mut self, raw: &str) -> String {
        let name = normalize_key(raw);
        let count = self.counts.entry(name.clone()).or_insert(0);
        *count += 1;
        let count = *count;
        format!("{name}_{count:03}")
    }
}

/// Extracts the file extension from a URL's path component.
///
/// Returns the extension including the leading dot, lower-cased, or `None`
/// when the last path segment has no extension. Query and fragment are
/// ignored; a segment whose only dot is the leading one (`.hidden`) has no
/// extension.
#[must_use]
pub fn extension_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let last_segment = parsed.path_segments()?.next_back()?;
    let leading_dots = last_segment.chars().take_while(|c| *c == '.').count();
    let dot_index = last_segment.rfind('.')?;
    if dot_index < leading_dots {
        return None;
    }
    Some(last_segment[dot_index..].to_lowercase())
}
