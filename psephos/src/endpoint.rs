//! Listening endpoints: UNIX-domain path, IPv4 or IPv6.

use std::fmt;
use std::io::ErrorKind;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;

use socket2::{Domain, SockAddr, Socket, Type};

use crate::error::ServerError;

/// Where the server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// UNIX-domain stream socket at a filesystem path.
    Unix(PathBuf),
    /// IPv4; no address means the wildcard.
    Ipv4(Option<Ipv4Addr>, u16),
    /// IPv6; no address means the wildcard.
    Ipv6(Option<Ipv6Addr>, u16),
}

impl Endpoint {
    /// Build an endpoint from the CLI's `-s <family>` and its trailing
    /// arguments: `unix <path>` or `ipv4|ipv6 [<ip>] <port>`.
    pub fn from_family_args(family: &str, args: &[String]) -> Result<Self, ServerError> {
        match family {
            "unix" => {
                let [path] = args else {
                    return Err(ServerError::InvalidArgument(
                        "the unix family takes exactly one path argument".to_string(),
                    ));
                };
                Ok(Endpoint::Unix(PathBuf::from(path)))
            }
            "ipv4" | "ipv6" => {
                let (ip, port) = match args {
                    [port] => (None, port),
                    [ip, port] => (Some(ip.as_str()), port),
                    _ => {
                        return Err(ServerError::InvalidArgument(format!(
                            "the {family} family takes [<ip>] <port>"
                        )))
                    }
                };
                let port: u16 = port.parse().map_err(|_| {
                    ServerError::InvalidArgument(format!("invalid {family} port: {port}"))
                })?;
                if family == "ipv4" {
                    let ip = ip
                        .map(str::parse)
                        .transpose()
                        .map_err(|_| bad_ip(family, ip))?;
                    Ok(Endpoint::Ipv4(ip, port))
                } else {
                    let ip = ip
                        .map(str::parse)
                        .transpose()
                        .map_err(|_| bad_ip(family, ip))?;
                    Ok(Endpoint::Ipv6(ip, port))
                }
            }
            other => Err(ServerError::InvalidArgument(format!(
                "invalid address family: {other}"
            ))),
        }
    }

    /// Create, bind and listen. For UNIX endpoints any stale socket file
    /// is unlinked first and the path must fit `sun_path`.
    pub fn bind(&self, backlog: i32) -> Result<Socket, ServerError> {
        match self {
            Endpoint::Unix(path) => {
                let addr = SockAddr::unix(path).map_err(|_| {
                    ServerError::InvalidArgument(format!(
                        "socket path does not fit sun_path: {}",
                        path.display()
                    ))
                })?;
                match std::fs::remove_file(path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => return Err(ServerError::Io(e)),
                }
                listen_on(Domain::UNIX, &addr, backlog)
            }
            Endpoint::Ipv4(ip, port) => {
                let addr = SocketAddr::from((ip.unwrap_or(Ipv4Addr::UNSPECIFIED), *port));
                listen_on(Domain::IPV4, &addr.into(), backlog)
            }
            Endpoint::Ipv6(ip, port) => {
                let addr = SocketAddr::from((ip.unwrap_or(Ipv6Addr::UNSPECIFIED), *port));
                listen_on(Domain::IPV6, &addr.into(), backlog)
            }
        }
    }
}

fn bad_ip(family: &str, ip: Option<&str>) -> ServerError {
    ServerError::InvalidArgument(format!(
        "invalid {family} address: {}",
        ip.unwrap_or_default()
    ))
}

fn listen_on(domain: Domain, addr: &SockAddr, backlog: i32) -> Result<Socket, ServerError> {
    let socket = Socket::new(domain, Type::STREAM, None)?;
    socket.set_reuse_address(true)?;
    socket.bind(addr)?;
    socket.listen(backlog)?;
    Ok(socket)
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Unix(path) => write!(f, "unix:{}", path.display()),
            Endpoint::Ipv4(ip, port) => {
                write!(f, "ipv4:{}:{port}", ip.unwrap_or(Ipv4Addr::UNSPECIFIED))
            }
            Endpoint::Ipv6(ip, port) => {
                write!(f, "ipv6:[{}]:{port}", ip.unwrap_or(Ipv6Addr::UNSPECIFIED))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_every_family() {
        assert_eq!(
            Endpoint::from_family_args("unix", &strings(&["/tmp/s.sock"])).unwrap(),
            Endpoint::Unix(PathBuf::from("/tmp/s.sock"))
        );
        assert_eq!(
            Endpoint::from_family_args("ipv4", &strings(&["8080"])).unwrap(),
            Endpoint::Ipv4(None, 8080)
        );
        assert_eq!(
            Endpoint::from_family_args("ipv4", &strings(&["127.0.0.1", "8080"])).unwrap(),
            Endpoint::Ipv4(Some(Ipv4Addr::LOCALHOST), 8080)
        );
        assert_eq!(
            Endpoint::from_family_args("ipv6", &strings(&["::1", "9090"])).unwrap(),
            Endpoint::Ipv6(Some(Ipv6Addr::LOCALHOST), 9090)
        );
    }

    #[test]
    fn rejects_malformed_arguments() {
        for (family, args) in [
            ("unix", vec![]),
            ("unix", vec!["/a", "/b"]),
            ("ipv4", vec![]),
            ("ipv4", vec!["1.2.3.4", "notaport"]),
            ("ipv4", vec!["notanip", "80"]),
            ("ipv6", vec!["1.2.3.4.5", "80", "extra"]),
            ("tcp", vec!["80"]),
        ] {
            let args = strings(&args);
            assert!(
                matches!(
                    Endpoint::from_family_args(family, &args),
                    Err(ServerError::InvalidArgument(_))
                ),
                "family {family} with {args:?} should be rejected"
            );
        }
    }

    #[test]
    fn unix_bind_replaces_a_stale_socket_file() {
        let path = std::env::temp_dir().join(format!("psephos-endpoint-{}.sock", std::process::id()));
        std::fs::write(&path, b"stale").unwrap();
        let endpoint = Endpoint::Unix(path.clone());
        let listener = endpoint.bind(4).unwrap();
        drop(listener);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn oversized_unix_paths_are_rejected() {
        let endpoint = Endpoint::Unix(PathBuf::from(format!("/tmp/{}", "x".repeat(200))));
        assert!(matches!(
            endpoint.bind(4),
            Err(ServerError::InvalidArgument(_))
        ));
    }
}
