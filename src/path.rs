//! Path joining and normalization.
//!
//! Every path a [`Router`](crate::Router) stores goes through [`normalize`],
//! so two spellings of the same path (`/users/`, `//users`, `users`) land on
//! the same route. Both functions are pure: same inputs, same output.

/// Joins a root path and a relative path with exactly one `/` between them.
///
/// An empty side contributes nothing; no slash is added at the seam.
pub fn join(root: &str, relative: &str) -> String {
    match (root.is_empty(), relative.is_empty()) {
        (true, _) => relative.to_owned(),
        (false, true) => root.to_owned(),
        (false, false) => {
            let mut out = String::with_capacity(root.len() + relative.len() + 1);
            out.push_str(root.trim_end_matches('/'));
            out.push('/');
            out.push_str(relative.trim_start_matches('/'));
            out
        }
    }
}

/// Normalizes `path` under the given slash policies.
///
/// - Runs of `/` collapse to one.
/// - `leading`: the result starts with exactly one `/`.
/// - `trailing`: the result ends with `/`; otherwise a trailing `/` is
///   stripped unless the whole path is `"/"`.
///
/// Idempotent: `normalize(&normalize(p, l, t), l, t) == normalize(p, l, t)`.
///
/// ```rust
/// use switchyard::path::normalize;
///
/// assert_eq!(normalize("//api///users/", true, false), "/api/users");
/// assert_eq!(normalize("api/users", true, true), "/api/users/");
/// assert_eq!(normalize("", true, false), "/");
/// ```
pub fn normalize(path: &str, leading: bool, trailing: bool) -> String {
    let mut out = String::with_capacity(path.len() + 2);
    if leading {
        out.push('/');
    }

    for c in path.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }

    if trailing {
        if !out.ends_with('/') {
            out.push('/');
        }
    } else if out.len() > 1 && out.ends_with('/') {
        out.pop();
    }

    out
}
