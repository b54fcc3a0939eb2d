//! Peer address resolution
//!
//! The registry hands out endpoint URLs (`http://host:port/`,
//! `rosrpc://host:port`). Peers are dialed by `host:port`.

use url::Url;

use crate::AddressParseError;

/// Turn a registry URL into a canonical `host:port` address.
///
/// IPv6 hosts keep their brackets so the result can be split again.
/// The port must be written in the URL; it is never inferred from the scheme.
pub fn url_to_address(raw: &str) -> Result<String, AddressParseError> {
    let fail = |reason| AddressParseError {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|_| fail("not a valid URL"))?;

    let host = match url.host_str() {
        Some(host) if !host.is_empty() => host,
        _ => return Err(fail("missing host")),
    };

    // Url drops a port equal to the scheme default, so look at the text
    let port = match url.port() {
        Some(port) => port,
        None if has_explicit_port(raw) => url
            .port_or_known_default()
            .ok_or_else(|| fail("missing port"))?,
        None => return Err(fail("missing port")),
    };

    Ok(format!("{}:{}", host, port))
}

fn has_explicit_port(raw: &str) -> bool {
    let rest = raw.split_once("://").map_or(raw, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
    let after_host = host_port.rsplit_once(']').map_or(host_port, |(_, t)| t);
    after_host
        .rsplit_once(':')
        .map_or(false, |(_, port)| !port.is_empty())
}

/// Split a `host:port` address into its parts. Brackets around an IPv6
/// host are removed.
pub fn split_host_port(address: &str) -> Result<(&str, u16), AddressParseError> {
    let fail = |reason| AddressParseError {
        url: address.to_string(),
        reason,
    };

    let (host, port) = if let Some(rest) = address.strip_prefix('[') {
        let (host, tail) = rest.split_once(']').ok_or_else(|| fail("missing ']'"))?;
        let port = tail.strip_prefix(':').ok_or_else(|| fail("missing port"))?;
        (host, port)
    } else {
        let (host, port) = address.rsplit_once(':').ok_or_else(|| fail("missing port"))?;
        if host.contains(':') {
            return Err(fail("too many colons"));
        }
        (host, port)
    };

    if host.is_empty() {
        return Err(fail("missing host"));
    }

    let port = port.parse::<u16>().map_err(|_| fail("invalid port"))?;
    Ok((host, port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_http_url() {
        assert_eq!(
            url_to_address("http://robot-1:45123/").unwrap(),
            "robot-1:45123"
        );
    }

    #[test]
    fn test_rosrpc_url() {
        assert_eq!(
            url_to_address("rosrpc://10.0.0.7:38211").unwrap(),
            "10.0.0.7:38211"
        );
    }

    #[test]
    fn test_missing_port_rejected() {
        let err = url_to_address("http://master/").unwrap_err();
        assert_eq!(err.reason, "missing port");
        assert_eq!(err.url, "http://master/");

        assert!(url_to_address("http://master:/").is_err());
        assert!(url_to_address("http://user:pw@master/").is_err());
    }

    #[test]
    fn test_explicit_default_port_kept() {
        assert_eq!(url_to_address("http://master:80/").unwrap(), "master:80");
        assert_eq!(url_to_address("http://[::1]:80").unwrap(), "[::1]:80");
    }

    #[test]
    fn test_ipv6_keeps_brackets() {
        let addr = url_to_address("http://[::1]:11311/").unwrap();
        assert_eq!(addr, "[::1]:11311");
        assert_eq!(split_host_port(&addr).unwrap(), ("::1", 11311));
    }

    #[test]
    fn test_rejects_unparseable() {
        assert!(url_to_address("").is_err());
        assert!(url_to_address("not a url").is_err());
        // non-special scheme without a port
        let err = url_to_address("rosrpc://host").unwrap_err();
        assert_eq!(err.reason, "missing port");
        assert_eq!(err.url, "rosrpc://host");
    }

    #[test]
    fn test_split_host_port_rejects() {
        assert!(split_host_port("").is_err());
        assert!(split_host_port("host").is_err());
        assert!(split_host_port(":80").is_err());
        assert!(split_host_port("a:b:80").is_err());
        assert!(split_host_port("host:http").is_err());
        assert!(split_host_port("[::1]80").is_err());
    }

    proptest! {
        #[test]
        fn prop_resolved_address_splits_back(host in "[a-z][a-z0-9]{0,15}", port in 1u16..) {
            let addr = url_to_address(&format!("http://{}:{}/", host, port)).unwrap();
            let (h, p) = split_host_port(&addr).unwrap();
            prop_assert_eq!(h, host.as_str());
            prop_assert_eq!(p, port);
        }
    }
}
