// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Path normalization shared by runtime code and the Root Registry's
//! scoped-uniqueness checks.

/// Normalize a folder path: replace `\` with `/`, collapse repeated `/`,
/// strip a trailing `/` (preserving a bare `/`), lowercase only on Windows.
///
/// This exact function must be used both by the live scan/registry code and
/// by any one-off DB backfill script, so the two never disagree about what
/// "the same path" means.
pub fn normalize_folder_path(path: &str) -> String {
    let slashed: String = path.chars().map(|c| if c == '\\' { '/' } else { c }).collect();

    let mut collapsed = String::with_capacity(slashed.len());
    let mut prev_slash = false;
    for c in slashed.chars() {
        if c == '/' {
            if prev_slash {
                continue;
            }
            prev_slash = true;
        } else {
            prev_slash = false;
        }
        collapsed.push(c);
    }

    let trimmed = if collapsed.len() > 1 && collapsed.ends_with('/') {
        collapsed.trim_end_matches('/').to_string()
    } else {
        collapsed
    };

    if cfg!(target_os = "windows") {
        trimmed.to_lowercase()
    } else {
        trimmed
    }
}

/// Extract `absolute_path`'s path relative to `root`, both normalized first.
///
/// Returns `/` when the two are equal, and the absolute path unchanged when
/// it is not under the root.
pub fn extract_relative_path(root: &str, absolute_path: &str) -> String {
    let root = normalize_folder_path(root);
    let abs = normalize_folder_path(absolute_path);

    if abs == root {
        return "/".to_string();
    }

    let prefix = if root.ends_with('/') { root.clone() } else { format!("{root}/") };

    match abs.strip_prefix(&prefix) {
        Some(rest) => format!("/{rest}"),
        None => abs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_backslashes() {
        assert_eq!(normalize_folder_path(r"C:\docs\readme.md"), "C:/docs/readme.md");
    }

    #[test]
    fn collapses_repeated_slashes() {
        assert_eq!(normalize_folder_path("//a//b/"), "/a/b");
    }

    #[test]
    fn strips_trailing_slash_but_preserves_bare_root() {
        assert_eq!(normalize_folder_path("/a/b/"), "/a/b");
        assert_eq!(normalize_folder_path("/"), "/");
    }

    #[test]
    fn extract_relative_path_returns_bare_root_when_equal() {
        assert_eq!(extract_relative_path("/data/docs", "/data/docs"), "/");
    }

    #[test]
    fn extract_relative_path_returns_relative_when_nested() {
        assert_eq!(extract_relative_path("/data/docs", "/data/docs/a/b.txt"), "/a/b.txt");
    }

    #[test]
    fn extract_relative_path_returns_absolute_unchanged_when_not_nested() {
        assert_eq!(extract_relative_path("/data/docs", "/other/b.txt"), "/other/b.txt");
    }

    #[cfg(feature = "test-support")]
    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn normalize_is_idempotent(s in "[a-zA-Z0-9/\\\\]{0,64}") {
                let once = normalize_folder_path(&s);
                let twice = normalize_folder_path(&once);
                prop_assert_eq!(once, twice);
            }
        }
    }
}
