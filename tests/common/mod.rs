#![allow(dead_code)]

use assert_cmd::Command;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread::{self, JoinHandle};

pub fn diario_cmd() -> Command {
    let mut cmd = Command::cargo_bin("diario").unwrap();
    cmd.env_remove("DIARIO_ROOT");
    cmd.env_remove("DIARIO_REMOTE_URL");
    cmd.env_remove("DIARIO_REMOTE_KEY");
    cmd.env_remove("DIARIO_LOG");
    cmd
}

/// Initialize a journal at `root` and log `user` in
pub fn logged_in(root: &Path, user: &str) {
    diario_cmd().arg("init").arg(root).assert().success();
    diario_cmd()
        .current_dir(root)
        .args(["login", user, "1606"])
        .assert()
        .success();
}

/// Minimal HTTP server answering each connection with the next canned response.
///
/// The handle yields the raw requests received, in order.
pub fn serve(responses: Vec<(u16, &str)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let responses: Vec<(u16, String)> = responses
        .into_iter()
        .map(|(status, body)| (status, body.to_string()))
        .collect();

    let handle = thread::spawn(move || {
        let mut requests = Vec::new();
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().unwrap();
            requests.push(read_request(&mut stream));

            let response = format!(
                "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
        }
        requests
    });

    (url, handle)
}

fn read_request(stream: &mut impl Read) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = stream.read(&mut chunk).unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let body_len = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|len| len.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).to_string()
}
