//! Object-storage URL rewriting.
//!
//! Presigned URLs are minted by the storage service from its own view of its
//! endpoint. When that view is a loopback address the URL is useless to a
//! browser or to another container, so the host is swapped for the storage
//! service name while everything else in the URL is kept as-is.

use url::Url;

use crate::error::AvatarUrlError;

/// Storage service name used when nothing else is configured.
pub const DEFAULT_STORAGE_HOST: &str = "minio";

const LOOPBACK_HOSTS: [&str; 2] = ["localhost", "127.0.0.1"];

/// Rewrites loopback hosts in object-storage URLs to a reachable host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarUrlNormalizer {
    storage_host: String,
}

impl AvatarUrlNormalizer {
    /// Build a normalizer targeting `storage_host`.
    ///
    /// The host is validated up front so that `normalize` can only fail on
    /// its input.
    pub fn new(storage_host: impl Into<String>) -> Result<Self, AvatarUrlError> {
        let storage_host = storage_host.into();
        if storage_host.is_empty() || url::Host::parse(&storage_host).is_err() {
            return Err(AvatarUrlError::InvalidStorageHost(storage_host));
        }
        Ok(Self { storage_host })
    }

    pub fn storage_host(&self) -> &str {
        &self.storage_host
    }

    /// Normalize `raw`.
    ///
    /// - unparsable input is an error
    /// - host `localhost` / `127.0.0.1` (any port) is replaced by the storage host;
    ///   scheme, port, path and query are preserved
    /// - any other host is returned unchanged
    pub fn normalize(&self, raw: &str) -> Result<String, AvatarUrlError> {
        let mut url = Url::parse(raw).map_err(|e| AvatarUrlError::Parse(e.to_string()))?;

        let is_loopback = url
            .host_str()
            .is_some_and(|host| LOOPBACK_HOSTS.contains(&host));
        if !is_loopback {
            return Ok(raw.to_string());
        }

        url.set_host(Some(&self.storage_host))
            .map_err(|_| AvatarUrlError::InvalidStorageHost(self.storage_host.clone()))?;
        Ok(url.into())
    }
}

impl Default for AvatarUrlNormalizer {
    fn default() -> Self {
        Self {
            storage_host: DEFAULT_STORAGE_HOST.to_string(),
        }
    }
}

/// Normalize `raw` against [`DEFAULT_STORAGE_HOST`].
pub fn normalize_avatar_url(raw: &str) -> Result<String, AvatarUrlError> {
    AvatarUrlNormalizer::default().normalize(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rewrites_localhost_and_keeps_port_path_query() {
        let out = normalize_avatar_url(
            "http://localhost:9000/avatars/u1.png?X-Amz-Signature=abc&X-Amz-Expires=600",
        )
        .unwrap();
        assert_eq!(
            out,
            "http://minio:9000/avatars/u1.png?X-Amz-Signature=abc&X-Amz-Expires=600"
        );
    }

    #[test]
    fn rewrites_ipv4_loopback() {
        let out = normalize_avatar_url("https://127.0.0.1:9443/bucket/key").unwrap();
        assert_eq!(out, "https://minio:9443/bucket/key");
    }

    #[test]
    fn rewrites_loopback_without_port() {
        let out = normalize_avatar_url("http://localhost/avatars/a.jpg").unwrap();
        assert_eq!(out, "http://minio/avatars/a.jpg");
    }

    #[test]
    fn other_hosts_pass_through_untouched() {
        let raw = "https://cdn.example.com:8443/avatars/a.jpg?v=2";
        assert_eq!(normalize_avatar_url(raw).unwrap(), raw);

        // Only exact loopback names are rewritten.
        let raw = "http://localhost.example.com/a.jpg";
        assert_eq!(normalize_avatar_url(raw).unwrap(), raw);
        let raw = "http://127.0.0.2:9000/a.jpg";
        assert_eq!(normalize_avatar_url(raw).unwrap(), raw);
    }

    #[test]
    fn unparsable_input_is_an_error() {
        assert!(matches!(
            normalize_avatar_url("not a url"),
            Err(AvatarUrlError::Parse(_))
        ));
        assert!(matches!(
            normalize_avatar_url("/avatars/relative.png"),
            Err(AvatarUrlError::Parse(_))
        ));
        assert!(matches!(normalize_avatar_url(""), Err(AvatarUrlError::Parse(_))));
    }

    #[test]
    fn custom_storage_host() {
        let n = AvatarUrlNormalizer::new("storage.internal").unwrap();
        assert_eq!(
            n.normalize("http://localhost:9000/x").unwrap(),
            "http://storage.internal:9000/x"
        );
    }

    #[test]
    fn rejects_unusable_storage_host() {
        assert!(AvatarUrlNormalizer::new("").is_err());
        assert!(AvatarUrlNormalizer::new("bad host").is_err());
    }

    proptest! {
        #[test]
        fn loopback_is_always_rewritten(
            host in prop::sample::select(vec!["localhost", "127.0.0.1"]),
            scheme in prop::sample::select(vec!["http", "https"]),
            port in 1024u16..=65535,
            path in "[a-z0-9]{1,12}(/[a-z0-9]{1,12}){0,3}",
            query in "[a-z]{1,8}=[a-z0-9]{0,8}",
        ) {
            let raw = format!("{scheme}://{host}:{port}/{path}?{query}");
            let out = normalize_avatar_url(&raw).unwrap();
            let parsed = Url::parse(&out).unwrap();

            prop_assert_eq!(parsed.host_str(), Some(DEFAULT_STORAGE_HOST));
            prop_assert_eq!(parsed.scheme(), scheme);
            prop_assert_eq!(parsed.port(), Some(port));
            prop_assert_eq!(parsed.path(), format!("/{path}"));
            prop_assert_eq!(parsed.query(), Some(query.as_str()));
        }

        #[test]
        fn normalization_is_idempotent(
            host in prop::sample::select(vec!["localhost", "127.0.0.1", "cdn.example.com", "10.0.0.7"]),
            port in 1024u16..=65535,
            path in "[a-z0-9]{1,12}",
        ) {
            let raw = format!("http://{host}:{port}/{path}");
            let once = normalize_avatar_url(&raw).unwrap();
            let twice = normalize_avatar_url(&once).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn non_loopback_hosts_are_unchanged(
            host in "[a-z]{3,10}\\.(com|net|internal)",
            path in "[a-z0-9]{1,12}",
        ) {
            let raw = format!("https://{host}/{path}");
            prop_assert_eq!(normalize_avatar_url(&raw).unwrap(), raw);
        }
    }
}
