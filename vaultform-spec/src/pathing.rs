//! Canonical remote address construction.
//!
//! All helpers are pure and idempotent; equivalent inputs (with or without
//! surrounding separators) normalize to the same address.

/// Strip leading and trailing separators from a mount path.
pub fn normalize_mount(path: &str) -> String {
    path.trim_matches('/').to_string()
}

/// Whether two paths address the same object modulo trailing separators.
pub fn paths_equivalent(a: &str, b: &str) -> bool {
    a.trim_matches('/') == b.trim_matches('/')
}

/// Address of an auth method mount under the system backend.
pub fn auth_mount_path(mount: &str) -> String {
    format!("sys/auth/{}", normalize_mount(mount))
}

/// Address of an auth method's configuration object.
pub fn auth_config_path(mount: &str) -> String {
    format!("auth/{}/config", normalize_mount(mount))
}

/// Address of a named sub-resource below a backend mount, e.g.
/// `database/config/mydb`.
pub fn sub_resource_path(backend: &str, segment: &str, name: &str) -> String {
    format!(
        "{}/{}/{}",
        normalize_mount(backend),
        segment.trim_matches('/'),
        name.trim_matches('/')
    )
}

/// Key under which a mount appears in a list-style response.
pub fn listing_key(id: &str) -> String {
    format!("{}/", normalize_mount(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_separator_is_immaterial() {
        for p in ["approle", "gcp", "nested/mount"] {
            assert_eq!(auth_mount_path(p), auth_mount_path(&format!("{p}/")));
            assert_eq!(auth_config_path(p), auth_config_path(&format!("/{p}/")));
        }
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize_mount("/foo/bar/");
        assert_eq!(once, "foo/bar");
        assert_eq!(normalize_mount(&once), once);
    }

    #[test]
    fn sub_resource_joins_without_trailing_separator() {
        assert_eq!(
            sub_resource_path("database/", "config", "mydb"),
            "database/config/mydb"
        );
        assert_eq!(
            sub_resource_path("db/prod", "config", "/replica/"),
            "db/prod/config/replica"
        );
    }

    #[test]
    fn listing_key_matches_remote_convention() {
        assert_eq!(listing_key("approle"), "approle/");
        assert_eq!(listing_key("approle/"), "approle/");
    }

    #[test]
    fn equivalence_ignores_separators_only() {
        assert!(paths_equivalent("foo", "foo/"));
        assert!(paths_equivalent("/foo/", "foo"));
        assert!(!paths_equivalent("foo", "foo/bar"));
    }
}
