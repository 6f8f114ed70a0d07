// Drives the default reqwest transport against a one-shot HTTP server on
// localhost.

use std::io::{BufRead, BufReader, Cursor, Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use oshi_client::{CallContext, Client, ClientConfig, Error, Image};
use pretty_assertions::assert_eq;

/// What the server saw: request line, lower-cased headers and the body.
#[derive(Debug)]
struct Received {
    request_line: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Received {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Accept a single connection, wait `delay`, then answer with `status` and
/// `body`. Returns the endpoint to point the client at.
fn serve_once(status: &'static str, body: &'static str, delay: Duration) -> (String, mpsc::Receiver<Received>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let received = read_request(&mut reader);
        let _ = tx.send(received);

        thread::sleep(delay);
        let mut stream = stream;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        // the client may have given up already
        let _ = stream.write_all(response.as_bytes());
    });

    (endpoint, rx)
}

fn read_request(reader: &mut impl BufRead) -> Received {
    let mut request_line = String::new();
    reader.read_line(&mut request_line).unwrap();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((k, v)) = line.split_once(':') {
            headers.push((k.trim().to_lowercase(), v.trim().to_string()));
        }
    }

    let find = |name: &str| {
        headers
            .iter()
            .find(|(k, _): &&(String, String)| k == name)
            .map(|(_, v)| v.clone())
    };

    let mut body = Vec::new();
    if let Some(len) = find("content-length") {
        let len: usize = len.parse().unwrap();
        body.resize(len, 0);
        reader.read_exact(&mut body).unwrap();
    } else if find("transfer-encoding").as_deref() == Some("chunked") {
        loop {
            let mut size = String::new();
            reader.read_line(&mut size).unwrap();
            let size = usize::from_str_radix(size.trim(), 16).unwrap();
            let mut chunk = vec![0u8; size + 2];
            reader.read_exact(&mut chunk).unwrap();
            if size == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..size]);
        }
    }

    Received {
        request_line: request_line.trim_end().to_string(),
        headers,
        body,
    }
}

fn client(endpoint: &str) -> Client {
    Client::with_config(ClientConfig {
        endpoint: endpoint.to_string(),
    })
    .unwrap()
}

#[test]
fn upload_puts_sized_body_and_query_on_the_wire() {
    let (endpoint, rx) = serve_once(
        "200 OK",
        "http://h/a/1 [Admin]\nhttp://h/1 [Download]\n",
        Duration::ZERO,
    );
    let image = Image::from_bytes(b"hello oshi".to_vec(), "filename")
        .expire(5)
        .autodestroy(true);

    let res = client(&endpoint)
        .upload(&CallContext::background(), image)
        .unwrap();
    assert_eq!(res.admin.as_deref(), Some("http://h/a/1"));
    assert_eq!(res.download.as_deref(), Some("http://h/1"));

    let got = rx.recv().unwrap();
    assert_eq!(got.request_line, "PUT /?expire=5&autodestroy=1 HTTP/1.1");
    assert_eq!(got.header("content-length"), Some("10"));
    assert!(got.header("user-agent").unwrap().starts_with("oshi-client/"));
    assert_eq!(got.body, b"hello oshi");
}

#[test]
fn upload_streams_unsized_reader() {
    let (endpoint, rx) = serve_once("200 OK", "http://h/1 [Download]", Duration::ZERO);
    let image = Image::new(Cursor::new(vec![b'z'; 5000]), "blob.bin");

    let res = client(&endpoint)
        .upload(&CallContext::background(), image)
        .unwrap();
    assert_eq!(res.download.as_deref(), Some("http://h/1"));

    let got = rx.recv().unwrap();
    assert_eq!(got.request_line, "PUT /?filename=blob.bin HTTP/1.1");
    assert_eq!(got.body, vec![b'z'; 5000]);
}

#[test]
fn non_200_keeps_exact_body() {
    let (endpoint, rx) = serve_once("404 Not Found", "File not found\n", Duration::ZERO);

    let err = client(&endpoint)
        .hashsum(&CallContext::background(), "AbCd")
        .unwrap_err();
    match err {
        Error::Service(e) => {
            assert_eq!(e.status, 404);
            assert_eq!(e.body, "File not found\n");
        }
        other => panic!("expected service error, got {other:?}"),
    }

    let got = rx.recv().unwrap();
    assert_eq!(got.request_line, "GET /hashsum/AbCd HTTP/1.1");
}

#[test]
fn delete_sends_delete_to_admin_url() {
    let (endpoint, rx) = serve_once("200 OK", "File deleted", Duration::ZERO);
    let admin = format!("{}/a/AbCd/cat.png", endpoint);

    client(&endpoint)
        .delete(&CallContext::background(), &admin)
        .unwrap();

    let got = rx.recv().unwrap();
    assert_eq!(got.request_line, "DELETE /a/AbCd/cat.png HTTP/1.1");
}

#[test]
fn call_timeout_cuts_slow_response() {
    let (endpoint, _rx) = serve_once("200 OK", "abc.onion", Duration::from_secs(3));

    let err = client(&endpoint)
        .tor_endpoint(&CallContext::with_timeout(Duration::from_millis(300)))
        .unwrap_err();
    assert!(err.is_transport(), "{err:?}");
}

// Outlasts reqwest's built-in 30s client timeout, so it only passes when
// the transport leaves deadlines to the caller.
#[test]
fn background_context_has_no_deadline() {
    let (endpoint, _rx) = serve_once("200 OK", "abc.onion", Duration::from_secs(32));

    let host = client(&endpoint)
        .tor_endpoint(&CallContext::background())
        .unwrap();
    assert_eq!(host, "abc.onion");
}
