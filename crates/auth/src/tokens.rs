use serde::{Deserialize, Serialize};

macro_rules! impl_opaque_token {
    ($t:ident, $label:literal) => {
        /// Opaque token issued by the auth service.
        ///
        /// `Debug` is redacted so tokens never end up in logs.
        #[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(String);

        impl $t {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Debug for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, concat!($label, "(***)"))
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

impl_opaque_token!(AccessToken, "AccessToken");
impl_opaque_token!(RefreshToken, "RefreshToken");

/// Token pair returned by login and signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_redacted() {
        let t = AccessToken::new("secret-value");
        let rendered = format!("{t:?}");
        assert!(!rendered.contains("secret-value"));
        assert_eq!(rendered, "AccessToken(***)");
    }

    #[test]
    fn tokens_serialize_as_plain_strings() {
        let pair = TokenPair {
            access_token: AccessToken::new("a"),
            refresh_token: RefreshToken::new("r"),
        };
        let json = serde_json::to_value(&pair).unwrap();
        assert_eq!(json, serde_json::json!({"access_token": "a", "refresh_token": "r"}));
    }
}
