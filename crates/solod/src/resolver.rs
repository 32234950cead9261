//! Port resolver - liveness probing and free-port scanning
//!
//! Probing speaks the application protocol (an HTTP GET to the status
//! resource) rather than raw TCP, so an unrelated service squatting on the
//! port does not read as a live daemon.

use solo_common::Error;
use std::time::Duration;
use tracing::debug;

/// Bounded-time liveness check against a candidate daemon port. Network
/// errors, non-success responses and timeouts all resolve to false.
pub async fn probe(port: u16, timeout: Duration) -> bool {
    let url = format!("http://127.0.0.1:{port}/state");

    let client = match reqwest::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(err) => {
            debug!("probe client construction failed: {err}");
            return false;
        }
    };

    match client.get(&url).send().await {
        Ok(response) => {
            let live = response.status().is_success();
            debug!("probe of port {port}: status {}", response.status());
            live
        }
        Err(err) => {
            debug!("probe of port {port} failed: {err}");
            false
        }
    }
}

/// Scan upward from `start_port`, binding and releasing a throwaway listener
/// per candidate. Returns the first bindable port, or `NoAvailablePort`
/// after `max_attempts` consecutive failures.
pub fn find_available(start_port: u16, max_attempts: u16) -> Result<u16, Error> {
    let mut candidate = Some(start_port);

    for _ in 0..max_attempts {
        let Some(port) = candidate else {
            break;
        };

        match std::net::TcpListener::bind(("127.0.0.1", port)) {
            Ok(listener) => {
                drop(listener);
                return Ok(port);
            }
            Err(err) => debug!("port {port} unavailable: {err}"),
        }

        candidate = port.checked_add(1);
    }

    Err(Error::NoAvailablePort {
        start: start_port,
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_first_unbound_port() {
        // Occupy a port, then scan starting at it.
        let held = std::net::TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let occupied = held.local_addr().unwrap().port();

        let found = find_available(occupied, 10).unwrap();
        assert_ne!(found, occupied);
        assert!(found > occupied);
    }

    #[test]
    fn fails_after_exactly_max_attempts() {
        let held: Vec<_> = {
            // Find three consecutive bindable ports and hold them.
            let base = find_available(41000, 1000).unwrap();
            (base..base + 3)
                .filter_map(|p| std::net::TcpListener::bind(("127.0.0.1", p)).ok())
                .collect()
        };

        if held.len() == 3 {
            let base = held[0].local_addr().unwrap().port();
            let err = find_available(base, 3).unwrap_err();
            assert!(matches!(
                err,
                Error::NoAvailablePort { attempts: 3, .. }
            ));
        }
    }
}
