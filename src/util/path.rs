//! POSIX-style in-container path resolution.
//!
//! Grounded on `util/uri.rs` in the teacher repo (`resolve`, `normalize`,
//! `parent`, and its percent-decoding of hrefs before comparing them against
//! archive entry names). The spec (§4.6) calls for: "the OPF's directory is
//! the prefix; a blank or `.` base yields the href unchanged; leading `/` on
//! resolved paths is stripped before ZIP lookup."

use percent_encoding::percent_decode_str;
use std::borrow::Cow;

const SEPARATOR: char = '/';
const SEPARATOR_STR: &str = "/";
const CURRENT_DIR: &str = ".";
const PARENT_DIR: &str = "..";
const EMPTY: &str = "";

/// The directory portion of `path` (everything before the last `/`, or
/// empty if there is none).
pub(crate) fn parent(path: &str) -> &str {
    path.rfind(SEPARATOR).map_or(EMPTY, |index| &path[..index])
}

/// The leaf (base) name of `path`: the portion after the last `/`.
pub(crate) fn filename(path: &str) -> &str {
    path.rsplit(SEPARATOR)
        .next()
        .expect("`rsplit` guarantees at least one entry")
}

/// Resolves `href` (a manifest/container-relative reference) against
/// `base_dir` (typically the OPF's containing directory), percent-decodes
/// it, then strips any leading `/` so the result is ready for ZIP entry
/// lookup. Manifest/spine hrefs legally percent-escape characters like
/// spaces, but ZIP entry names in the archive itself are not escaped.
///
/// A blank or `.` `base_dir` yields `href` unchanged (aside from decoding
/// and the leading-slash strip).
pub(crate) fn resolve_for_lookup(base_dir: &str, href: &str) -> String {
    let decoded = percent_decode_str(href).decode_utf8_lossy();
    let resolved = resolve(base_dir, &decoded);
    resolved.trim_start_matches(SEPARATOR).to_owned()
}

/// Resolve a child path against its parent, normalizing `.`/`..`/empty
/// components away.
fn resolve<'a>(base_dir: &str, href: &'a str) -> Cow<'a, str> {
    if base_dir.is_empty() || base_dir == CURRENT_DIR || href.starts_with(SEPARATOR) {
        return Cow::Borrowed(href);
    }

    let joined = format!("{base_dir}{SEPARATOR_STR}{href}");
    match normalize(&joined) {
        Cow::Borrowed(_) => Cow::Owned(joined),
        Cow::Owned(normalized) => Cow::Owned(normalized),
    }
}

/// Collapses `.`, `..`, and empty (double-slash) path components.
fn normalize(original: &str) -> Cow<'_, str> {
    let mut components = original.split(SEPARATOR);
    if original.starts_with(SEPARATOR) {
        components.next();
    }
    if !components.any(|c| matches!(c, EMPTY | CURRENT_DIR | PARENT_DIR)) {
        return Cow::Borrowed(original);
    }

    let mut stack: Vec<&str> = Vec::new();
    for component in original.split(SEPARATOR) {
        match component {
            EMPTY | CURRENT_DIR => {}
            PARENT_DIR => {
                stack.pop();
            }
            _ => stack.push(component),
        }
    }

    let mut path = String::new();
    if original.starts_with(SEPARATOR) {
        path.push(SEPARATOR);
    }
    path.push_str(&stack.join(SEPARATOR_STR));
    Cow::Owned(path)
}

/// `true` if `path`, once normalized against an empty base, escapes above
/// the container root (i.e. begins with `..` after collapsing `.`/`..`).
pub(crate) fn escapes_root(path: &str) -> bool {
    let mut stack: Vec<&str> = Vec::new();
    for component in path.split(SEPARATOR) {
        match component {
            EMPTY | CURRENT_DIR => {}
            PARENT_DIR => {
                if stack.pop().is_none() {
                    return true;
                }
            }
            _ => stack.push(component),
        }
    }
    false
}
