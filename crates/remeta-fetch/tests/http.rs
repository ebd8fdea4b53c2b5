#![cfg(feature = "reqwest")]

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;

use remeta_fetch::{
    ClientError, ClientSetting, FetchError, FetchOptions, FetchOutcome, Fetcher, HttpClient,
    ReqwestClient,
};

/// Serve exactly one response on an ephemeral port and return its base URL.
fn serve_once(status: &'static str, body: &'static [u8]) -> (String, thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
        }
        write!(
            stream,
            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        )
        .unwrap();
        stream.write_all(body).unwrap();
        stream.flush().unwrap();
        request_line
    });

    (format!("http://{addr}"), handle)
}

fn client() -> ReqwestClient {
    ReqwestClient::new(ClientSetting {
        ignore_system_proxy: true,
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn streams_body_into_sink() {
    let (base, server) = serve_once("200 OK", b"tarball bytes");
    let mut sink = Vec::new();

    let written = client().download(&format!("{base}/archive.tar.gz"), &mut sink).unwrap();

    assert_eq!(written, 13);
    assert_eq!(sink, b"tarball bytes");
    assert!(server.join().unwrap().starts_with("GET /archive.tar.gz "));
}

#[test]
fn error_status_is_reported() {
    let (base, server) = serve_once("404 Not Found", b"missing");
    let mut sink = Vec::new();

    let err = client().download(&format!("{base}/nope"), &mut sink).unwrap_err();

    assert!(matches!(err, ClientError::Status { status } if status.as_u16() == 404));
    assert!(sink.is_empty());
    server.join().unwrap();
}

#[test]
fn fetcher_places_file_from_server() {
    let (base, server) = serve_once("200 OK", b"archive");
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("_META.tar.gz");

    let fetcher = Fetcher::new(client(), FetchOptions::default());
    let outcome = fetcher.fetch(&format!("{base}/master.tar.gz"), &dest).unwrap();

    assert!(matches!(outcome, FetchOutcome::Downloaded { bytes: 7, .. }));
    assert_eq!(std::fs::read(&dest).unwrap(), b"archive");
    server.join().unwrap();
}

#[test]
fn fetcher_leaves_nothing_on_http_error() {
    let (base, server) = serve_once("500 Internal Server Error", b"");
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("_META.tar.gz");

    let fetcher = Fetcher::new(client(), FetchOptions::default());
    let err = fetcher.fetch(&format!("{base}/master.tar.gz"), &dest).unwrap_err();

    assert!(matches!(err, FetchError::Download { .. }));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    server.join().unwrap();
}
