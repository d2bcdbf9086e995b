//! Integration test: SpotifyClient against a local catalog server.

mod common;

use albumdl_core::credentials::Credentials;
use albumdl_core::lookup::{LookupError, MetadataLookup, SpotifyClient};
use albumdl_core::resolver::{ResolutionError, Resolver};
use common::catalog_server::{self, CatalogOptions, CatalogServer};
use std::sync::Arc;

const ALBUMS: &[(&str, &str, &[&str])] = &[
    ("5uRdvUR7xCnHmUW8n64n9y", "Homework", &["Daft Punk"]),
    ("2noRn2Aes5aoNVsU6iWThc", "Discovery", &["Daft Punk", "Romanthony"]),
    ("1bt6q2SruMsBtcerNVtpZB", "AC/DC: Live", &["AC/DC"]),
];

fn credentials() -> Credentials {
    Credentials::new("0123456789abcdef0123456789abcdef", "fedcba9876543210fedcba9876543210").unwrap()
}

fn client(server: &CatalogServer) -> SpotifyClient {
    SpotifyClient::with_endpoints(credentials(), &server.token_url, &server.api_base)
}

#[test]
fn looks_up_title_and_primary_artist() {
    let server = catalog_server::start(ALBUMS, CatalogOptions::default());
    let client = client(&server);

    let meta = client
        .lookup("https://open.spotify.com/album/2noRn2Aes5aoNVsU6iWThc?si=abc")
        .unwrap();
    assert_eq!(meta.title, "Discovery");
    assert_eq!(meta.primary_artist, "Daft Punk");
}

#[test]
fn token_is_cached_across_lookups() {
    let server = catalog_server::start(ALBUMS, CatalogOptions::default());
    let client = client(&server);

    client.lookup("spotify:album:5uRdvUR7xCnHmUW8n64n9y").unwrap();
    client
        .lookup("https://open.spotify.com/intl-de/album/2noRn2Aes5aoNVsU6iWThc")
        .unwrap();
    assert_eq!(server.token_requests(), 1);
    assert_eq!(server.album_requests(), 2);
}

#[test]
fn prefetched_token_is_shared_by_concurrent_lookups() {
    let server = catalog_server::start(ALBUMS, CatalogOptions::default());
    let client = Arc::new(client(&server));
    client.prefetch_token().unwrap();

    let workers: Vec<_> = (0..10)
        .map(|_| {
            let client = Arc::clone(&client);
            std::thread::spawn(move || client.lookup("spotify:album:5uRdvUR7xCnHmUW8n64n9y"))
        })
        .collect();
    for worker in workers {
        assert_eq!(worker.join().unwrap().unwrap().title, "Homework");
    }
    assert_eq!(server.token_requests(), 1);
    assert_eq!(server.album_requests(), 10);
}

#[test]
fn prefetch_reports_rejected_credentials() {
    let server = catalog_server::start(
        ALBUMS,
        CatalogOptions {
            reject_credentials: true,
            ..CatalogOptions::default()
        },
    );
    assert_eq!(client(&server).prefetch_token(), Err(LookupError::Unauthorized));
}

#[test]
fn unknown_album_is_not_found() {
    let server = catalog_server::start(ALBUMS, CatalogOptions::default());
    let err = client(&server)
        .lookup("https://open.spotify.com/album/0000000000000000000000")
        .unwrap_err();
    assert_eq!(err, LookupError::NotFound);
}

#[test]
fn non_album_link_never_hits_the_network() {
    let server = catalog_server::start(ALBUMS, CatalogOptions::default());
    let err = client(&server)
        .lookup("https://open.spotify.com/track/5uRdvUR7xCnHmUW8n64n9y")
        .unwrap_err();
    assert_eq!(err, LookupError::NotAlbum);
    assert_eq!(server.token_requests(), 0);
}

#[test]
fn rejected_credentials_are_unauthorized() {
    let server = catalog_server::start(
        ALBUMS,
        CatalogOptions {
            reject_credentials: true,
            ..CatalogOptions::default()
        },
    );
    let err = client(&server)
        .lookup("spotify:album:5uRdvUR7xCnHmUW8n64n9y")
        .unwrap_err();
    assert_eq!(err, LookupError::Unauthorized);
}

#[test]
fn revoked_token_is_refreshed_once() {
    let server = catalog_server::start(
        ALBUMS,
        CatalogOptions {
            revoke_first_token: true,
            ..CatalogOptions::default()
        },
    );
    let meta = client(&server)
        .lookup("spotify:album:5uRdvUR7xCnHmUW8n64n9y")
        .unwrap();
    assert_eq!(meta.title, "Homework");
    assert_eq!(server.token_requests(), 2);
}

#[test]
fn throttling_is_reported() {
    let server = catalog_server::start(
        ALBUMS,
        CatalogOptions {
            throttle: true,
            ..CatalogOptions::default()
        },
    );
    let err = client(&server)
        .lookup("spotify:album:5uRdvUR7xCnHmUW8n64n9y")
        .unwrap_err();
    assert_eq!(err, LookupError::Throttled);
}

#[test]
fn resolver_builds_filesystem_safe_key() {
    let server = catalog_server::start(ALBUMS, CatalogOptions::default());
    let resolver = Resolver::new(Arc::new(client(&server)));

    let task = resolver
        .resolve("https://open.spotify.com/album/1bt6q2SruMsBtcerNVtpZB")
        .unwrap();
    assert_eq!(task.canonical_key, "AC_DC: Live - AC_DC");

    assert_eq!(
        resolver.resolve("https://open.spotify.com/album/0000000000000000000000"),
        Err(ResolutionError::InvalidIdentifier)
    );
}
