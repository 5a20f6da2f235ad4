//! Resume links: the session token travels in a `?token=` query so a later run can pick
//! the same game back up.

use shared::domain::SessionToken;
use url::Url;

const TOKEN_PARAM: &str = "token";

pub fn resume_link(server_url: &Url, token: &SessionToken) -> Url {
    let mut link = server_url.clone();
    link.set_fragment(None);
    link.query_pairs_mut()
        .clear()
        .append_pair(TOKEN_PARAM, token.as_str());
    link
}

/// Accepts a bare token, a full resume link, or a bare `?token=...` query.
pub fn token_from_input(raw: &str) -> Option<SessionToken> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let parsed = Url::parse(raw).ok().or_else(|| {
        raw.contains('=')
            .then(|| Url::parse("http://localhost/").ok()?.join(raw).ok())
            .flatten()
    });
    if let Some(url) = parsed {
        return url
            .query_pairs()
            .find(|(key, _)| key == TOKEN_PARAM)
            .map(|(_, value)| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(SessionToken::new);
    }

    raw.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        .then(|| SessionToken::new(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resume_link_carries_token_query() {
        let server = Url::parse("http://127.0.0.1:5001/").expect("url");
        let link = resume_link(&server, &SessionToken::new("aZ3kP9qLm2"));
        assert_eq!(link.as_str(), "http://127.0.0.1:5001/?token=aZ3kP9qLm2");
    }

    #[test]
    fn reads_token_back_from_link() {
        let token = token_from_input("http://game.example/?token=aZ3kP9qLm2&x=1");
        assert_eq!(token, Some(SessionToken::new("aZ3kP9qLm2")));
    }

    #[test]
    fn accepts_bare_token_and_query_fragment() {
        assert_eq!(
            token_from_input("  aZ3kP9qLm2 "),
            Some(SessionToken::new("aZ3kP9qLm2"))
        );
        assert_eq!(
            token_from_input("?token=abc123"),
            Some(SessionToken::new("abc123"))
        );
    }

    #[test]
    fn rejects_links_without_token() {
        assert_eq!(token_from_input("http://game.example/?game=1"), None);
        assert_eq!(token_from_input("not a token"), None);
        assert_eq!(token_from_input(""), None);
    }
}
