//! Minimal blocking HTTP over libcurl for the two Spotify endpoints we call.

use std::time::Duration;

use crate::lookup::LookupError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Status code and body of a completed request.
#[derive(Debug)]
pub(crate) struct Response {
    pub code: u32,
    pub body: Vec<u8>,
}

/// POST `grant_type=client_credentials` with HTTP Basic auth.
/// Runs in the current thread; call from `spawn_blocking` if used from async code.
pub(crate) fn post_client_credentials(
    url: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<Response, LookupError> {
    let mut easy = new_easy(url)?;
    easy.post(true).map_err(transport)?;
    easy.post_fields_copy(b"grant_type=client_credentials")
        .map_err(transport)?;
    easy.username(client_id).map_err(transport)?;
    easy.password(client_secret).map_err(transport)?;
    perform(easy)
}

/// GET with a bearer token.
pub(crate) fn get_with_bearer(url: &str, token: &str) -> Result<Response, LookupError> {
    let mut easy = new_easy(url)?;
    let mut list = curl::easy::List::new();
    list.append(&format!("Authorization: Bearer {}", token))
        .map_err(transport)?;
    list.append("Accept: application/json").map_err(transport)?;
    easy.http_headers(list).map_err(transport)?;
    perform(easy)
}

fn new_easy(url: &str) -> Result<curl::easy::Easy, LookupError> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(transport)?;
    easy.follow_location(true).map_err(transport)?;
    easy.connect_timeout(CONNECT_TIMEOUT).map_err(transport)?;
    easy.timeout(REQUEST_TIMEOUT).map_err(transport)?;
    Ok(easy)
}

fn perform(mut easy: curl::easy::Easy) -> Result<Response, LookupError> {
    let mut body = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer
            .write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })
            .map_err(transport)?;
        transfer.perform().map_err(transport)?;
    }
    let code = easy.response_code().map_err(transport)?;
    Ok(Response { code, body })
}

fn transport(e: curl::Error) -> LookupError {
    LookupError::Transport(e.to_string())
}

/// Map a non-2xx status from the album endpoint to a lookup error.
pub(crate) fn classify_api_status(code: u32) -> LookupError {
    match code {
        400 | 404 => LookupError::NotFound,
        401 | 403 => LookupError::Unauthorized,
        429 => LookupError::Throttled,
        _ => LookupError::Transport(format!("HTTP {}", code)),
    }
}

/// Map a non-2xx status from the token endpoint to a lookup error.
pub(crate) fn classify_token_status(code: u32) -> LookupError {
    match code {
        400 | 401 | 403 => LookupError::Unauthorized,
        429 => LookupError::Throttled,
        _ => LookupError::Transport(format!("token endpoint HTTP {}", code)),
    }
}
