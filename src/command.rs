//! External command protocol
//!
//! Deep links, share imports and other processes send instructions as a
//! query string, one `key=value` pair per command:
//!
//! ```text
//! go=52.5,-1.9&import=https%3A%2F%2Fexample.com%2Flayer.json&clearCache=
//! ```
//!
//! Decoding never fails as a whole. Each pair maps to exactly one
//! [`Command`], and pairs that cannot be understood become [`Command::Invalid`].

use crate::{
    core::{
        constants::{COMMAND_CLEAR_CACHE, COMMAND_DOWNLOAD, COMMAND_GO, COMMAND_IMPORT},
        geo::LatLng,
    },
    offline::context::PackContext,
};
use url::{form_urlencoded, Url};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Centre the map on a coordinate
    Go(LatLng),
    /// Import a layer definition from a URL
    Import(Url),
    /// Start downloading an offline pack
    Download(PackContext),
    ClearCache,
    /// A pair that could not be decoded
    Invalid,
}

impl Command {
    pub fn is_valid(&self) -> bool {
        !matches!(self, Command::Invalid)
    }
}

/// Encodes commands into a single message, dropping [`Command::Invalid`]
pub fn encode(commands: &[Command]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for command in commands {
        match command {
            Command::Go(coordinate) => {
                serializer.append_pair(COMMAND_GO, &coordinate.to_string());
            }
            Command::Import(url) => {
                serializer.append_pair(COMMAND_IMPORT, url.as_str());
            }
            Command::Download(context) => match context.to_json() {
                Ok(json) => {
                    serializer.append_pair(COMMAND_DOWNLOAD, &json);
                }
                Err(e) => log::warn!("dropping download command: {}", e),
            },
            Command::ClearCache => {
                serializer.append_pair(COMMAND_CLEAR_CACHE, "");
            }
            Command::Invalid => {}
        }
    }
    serializer.finish()
}

/// Decodes a message into one command per `key=value` pair
pub fn decode(message: &str) -> Vec<Command> {
    let query = message.strip_prefix('?').unwrap_or(message);
    form_urlencoded::parse(query.as_bytes())
        .map(|(key, value)| decode_pair(&key, &value))
        .collect()
}

/// Decodes the query part of a deep-link URL
pub fn decode_url(url: &Url) -> Vec<Command> {
    url.query().map(decode).unwrap_or_default()
}

fn decode_pair(key: &str, value: &str) -> Command {
    let command = match key {
        COMMAND_GO => parse_coordinate(value).map(Command::Go),
        COMMAND_IMPORT => parse_import(value).map(Command::Import),
        COMMAND_DOWNLOAD => PackContext::decode_opt(value.as_bytes()).map(Command::Download),
        COMMAND_CLEAR_CACHE => Some(Command::ClearCache),
        _ => None,
    };
    command.unwrap_or_else(|| {
        log::debug!("invalid command {}={}", key, value);
        Command::Invalid
    })
}

/// Parses an import URL, refusing anything with characters a URI may not carry
fn parse_import(value: &str) -> Option<Url> {
    if !is_uri_reference(value) {
        return None;
    }
    Url::parse(value).ok()
}

/// Whether `value` uses only unreserved, reserved and well-formed `%XX` characters
fn is_uri_reference(value: &str) -> bool {
    let bytes = value.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let escaped = bytes.get(i + 1..i + 3);
                if !escaped.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
                    return false;
                }
                i += 3;
                continue;
            }
            b if b.is_ascii_alphanumeric() => {}
            b'-' | b'.' | b'_' | b'~' => {}
            b':' | b'/' | b'?' | b'#' | b'[' | b']' | b'@' => {}
            b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'=' => {}
            _ => return false,
        }
        i += 1;
    }
    true
}

/// Parses `lat,lng`; both parts must be finite and in range
fn parse_coordinate(value: &str) -> Option<LatLng> {
    let parts: Vec<&str> = value.split(',').collect();
    let [lat, lng] = parts.as_slice() else {
        return None;
    };
    let coordinate = LatLng::new(lat.trim().parse().ok()?, lng.trim().parse().ok()?);
    coordinate.is_valid().then_some(coordinate)
}
