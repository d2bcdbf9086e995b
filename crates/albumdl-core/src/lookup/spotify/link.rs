//! Album link parsing: `https://open.spotify.com/album/<id>` and `spotify:album:<id>`.

use url::Url;

use crate::lookup::LookupError;

const WEB_HOST: &str = "open.spotify.com";

/// Extracts the album id from a Spotify link.
///
/// Accepts web links (optionally with an `intl-xx` locale segment and a query
/// string) and `spotify:album:` URIs. Links to other Spotify object kinds,
/// links to other hosts and malformed ids yield [`LookupError::NotAlbum`].
pub fn album_id(link: &str) -> Result<String, LookupError> {
    let link = link.trim();

    if let Some(rest) = link.strip_prefix("spotify:") {
        let mut parts = rest.split(':');
        return match (parts.next(), parts.next(), parts.next()) {
            (Some("album"), Some(id), None) => valid_id(id),
            _ => Err(LookupError::NotAlbum),
        };
    }

    let url = Url::parse(link).map_err(|_| LookupError::NotAlbum)?;
    if url.host_str() != Some(WEB_HOST) {
        return Err(LookupError::NotAlbum);
    }

    let mut segments = url
        .path_segments()
        .ok_or(LookupError::NotAlbum)?
        .filter(|s| !s.is_empty())
        .skip_while(|s| s.starts_with("intl-"));

    match (segments.next(), segments.next(), segments.next()) {
        (Some("album"), Some(id), None) => valid_id(id),
        _ => Err(LookupError::NotAlbum),
    }
}

/// Spotify ids are base62; reject anything else before spending a request on it.
fn valid_id(id: &str) -> Result<String, LookupError> {
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(id.to_string())
    } else {
        Err(LookupError::NotAlbum)
    }
}
