//! Share link helpers
//!
//! Builds dashboard links that carry a token in a query parameter and pulls
//! the token back out of a pasted link.

/// Query parameter conventionally carrying the token
pub const DEFAULT_PARAM: &str = "data";

/// Set `param=token` on `base`, replacing an existing value for `param`
///
/// Other query pairs and any `#fragment` are kept. The token is
/// percent-encoded so `+` survives form-style query parsing.
pub fn share_url(base: &str, param: &str, token: &str) -> String {
    let (without_fragment, fragment) = match base.split_once('#') {
        Some((head, frag)) => (head, Some(frag)),
        None => (base, None),
    };
    let (path, query) = match without_fragment.split_once('?') {
        Some((path, query)) => (path, query),
        None => (without_fragment, ""),
    };

    let mut pairs: Vec<String> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| query_key(pair) != param)
        .map(str::to_string)
        .collect();
    pairs.push(format!("{}={}", param, urlencoding::encode(token)));

    let mut url = format!("{}?{}", path, pairs.join("&"));
    if let Some(fragment) = fragment {
        url.push('#');
        url.push_str(fragment);
    }
    url
}

fn query_key(pair: &str) -> String {
    let key = pair.split_once('=').map(|(k, _)| k).unwrap_or(pair);
    urlencoding::decode(key)
        .map(|k| k.into_owned())
        .unwrap_or_else(|_| key.to_string())
}

/// Extract the token from a link, or accept a bare token
///
/// Input without a `?` is taken as the token itself. Returns `None` when the
/// link has no non-empty `param` value.
pub fn token_from_link(input: &str, param: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let Some((_, rest)) = input.split_once('?') else {
        return Some(input.to_string());
    };
    let query = rest.split_once('#').map(|(q, _)| q).unwrap_or(rest);

    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| {
            urlencoding::decode(key)
                .map(|k| k == param)
                .unwrap_or(false)
        })
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .map(|value| value.into_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_url_appends_param() {
        assert_eq!(
            share_url("https://painel.example/", "data", "NoXSA"),
            "https://painel.example/?data=NoXSA"
        );
    }

    #[test]
    fn test_share_url_replaces_existing_value_and_keeps_the_rest() {
        let url = share_url(
            "https://painel.example/?lang=pt&data=OLD#grafico",
            "data",
            "N4Ig+x$",
        );
        assert_eq!(url, "https://painel.example/?lang=pt&data=N4Ig%2Bx%24#grafico");
    }

    #[test]
    fn test_token_from_link() {
        let url = share_url("https://painel.example/?lang=pt", "data", "N4Ig+x$-");
        assert_eq!(token_from_link(&url, "data").as_deref(), Some("N4Ig+x$-"));
    }

    #[test]
    fn test_token_from_bare_token() {
        assert_eq!(token_from_link("  NoXSA \n", "data").as_deref(), Some("NoXSA"));
    }

    #[test]
    fn test_token_from_link_without_param() {
        assert_eq!(token_from_link("https://painel.example/?lang=pt", "data"), None);
        assert_eq!(token_from_link("https://painel.example/?data=", "data"), None);
        assert_eq!(token_from_link("", "data"), None);
    }
}
