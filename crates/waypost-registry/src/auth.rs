//! Request authorization predicates consulted by the gateway.
//!
//! An authenticator sees the raw `Authorization` header value (empty when
//! the header is absent) and answers allow/deny. Nothing else.

use waypost_core::basic_auth_token;

pub trait Authenticator: Send + Sync {
    fn authenticate(&self, token: &str) -> bool;
}

impl<F> Authenticator for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn authenticate(&self, token: &str) -> bool {
        self(token)
    }
}

/// Accepts every request. Used when no credentials are configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authenticator for AllowAll {
    fn authenticate(&self, _token: &str) -> bool {
        true
    }
}

/// HTTP basic auth against a single username/password pair.
#[derive(Clone)]
pub struct BasicAuthenticator {
    expected: String,
}

impl BasicAuthenticator {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            expected: basic_auth_token(username, password),
        }
    }
}

impl Authenticator for BasicAuthenticator {
    fn authenticate(&self, token: &str) -> bool {
        let token = token.trim();
        token.len() == self.expected.len()
            && token
                .bytes()
                .zip(self.expected.bytes())
                .fold(0u8, |diff, (a, b)| diff | (a ^ b))
                == 0
    }
}

impl std::fmt::Debug for BasicAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuthenticator").finish_non_exhaustive()
    }
}
