use beacon::session;
use lumen::logging;
use std::net::TcpListener;
use std::thread;

/// First port probed for the listening socket.
const BASE_PORT: u16 = 6666;
/// Number of ports probed upwards from `BASE_PORT` before giving up.
const PORT_PROBE_LIMIT: u16 = 1000;

fn main() {
    let log = logging::init();

    let listener = bind_probing(&log);

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let peer = stream
                    .peer_addr()
                    .map(|addr| addr.to_string())
                    .unwrap_or_default();

                logging::debug!(log, "connection accepted"; "context" => "accept", "peer" => %peer);

                let session_log = log.new(logging::o!("peer" => peer));

                thread::spawn(move || session::run(stream, session_log));
            }
            Err(err) => {
                logging::warn!(log, "failed to accept connection";
                               "context" => "accept",
                               "error" => %err);
            }
        }
    }
}

/// Binds the first free loopback port at or above `BASE_PORT`.
fn bind_probing(log: &logging::Logger) -> TcpListener {
    for port in BASE_PORT..BASE_PORT + PORT_PROBE_LIMIT {
        match TcpListener::bind(("127.0.0.1", port)) {
            Ok(listener) => {
                println!("Started server on port {}", port);

                logging::info!(log, "server started"; "context" => "startup", "port" => port);

                return listener;
            }
            Err(err) => {
                logging::trace!(log, "port unavailable";
                                "context" => "startup",
                                "port" => port,
                                "error" => %err);
            }
        }
    }

    panic!(
        "No free port in the range {}..{}",
        BASE_PORT,
        BASE_PORT + PORT_PROBE_LIMIT
    );
}
