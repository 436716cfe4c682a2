//=========================================================================
// Test Support
//=========================================================================
//
// One-shot HTTP responder for exercising the blocking API clients against
// a real socket, plus ready-made page contexts.
//
//=========================================================================

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::core::config::CafeConfig;
use crate::core::credits::{CreditsSession, InMemoryCredits};
use crate::core::globals::GlobalContext;
use crate::core::identity::StaticIdentity;

pub(crate) const TOKEN: &str = "visitor-token";

/// Context for a signed-in visitor holding `account` credits.
pub(crate) fn signed_in_context(account: u64) -> GlobalContext {
    let api = InMemoryCredits::new().with_account(TOKEN, account);
    let mut context = GlobalContext::new(
        CafeConfig::default(),
        CreditsSession::new(Arc::new(api)),
        Arc::new(StaticIdentity::signed_in(TOKEN)),
    );
    context.refresh_credits();
    assert!(context.credits.settle(Duration::from_secs(2)));
    context.credits.poll();
    context
}

/// Context for an anonymous visitor.
pub(crate) fn signed_out_context() -> GlobalContext {
    GlobalContext::new(
        CafeConfig::default(),
        CreditsSession::new(Arc::new(InMemoryCredits::new())),
        Arc::new(StaticIdentity::signed_out()),
    )
}

/// Serves a single request with `status` and a JSON `body`.
///
/// Returns the base URL and a handle yielding the raw request text.
pub(crate) fn serve_once(status: &'static str, body: &'static str) -> (String, thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let request = read_request(&mut stream);
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).unwrap();
        request
    });

    (url, handle)
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = stream.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);

        let text = String::from_utf8_lossy(&data);
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&data).into_owned()
}
