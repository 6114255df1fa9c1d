//! Syslog handler
//!
//! Sends records to a syslog daemon over UDP, TCP or a local Unix socket.
//! Each message is `<PRI>` + ident + the formatted record, NUL-terminated by
//! default, with `PRI = facility * 8 + severity`.

use crate::core::{Formatter, Handler, HandlerKind, LogLevel, LogRecord, LoggerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs, UdpSocket};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[cfg(unix)]
use std::os::unix::net::{UnixDatagram, UnixStream};

/// Standard syslog UDP port
pub const SYSLOG_UDP_PORT: u16 = 514;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the syslog daemon listens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyslogAddress {
    Inet { host: String, port: u16 },
    /// Local socket such as `/dev/log`
    Unix(PathBuf),
}

impl SyslogAddress {
    pub fn inet(host: impl Into<String>, port: u16) -> Self {
        SyslogAddress::Inet {
            host: host.into(),
            port,
        }
    }

    pub fn unix(path: impl Into<PathBuf>) -> Self {
        SyslogAddress::Unix(path.into())
    }
}

impl Default for SyslogAddress {
    fn default() -> Self {
        SyslogAddress::inet("localhost", SYSLOG_UDP_PORT)
    }
}

impl fmt::Display for SyslogAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyslogAddress::Inet { host, port } if host.contains(':') => {
                write!(f, "[{}]:{}", host, port)
            }
            SyslogAddress::Inet { host, port } => write!(f, "{}:{}", host, port),
            SyslogAddress::Unix(path) => write!(f, "{}", path.display()),
        }
    }
}

impl FromStr for SyslogAddress {
    type Err = LoggerError;

    /// Parses `host:port`, `[v6]:port`, a bare host (port 514) or a socket path
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(LoggerError::config("SyslogHandler", "address must not be empty"));
        }
        if s.contains('/') {
            return Ok(SyslogAddress::unix(s));
        }

        if let Some(rest) = s.strip_prefix('[') {
            let (host, tail) = rest.split_once(']').ok_or_else(|| {
                LoggerError::config("SyslogHandler", format!("invalid address '{}'", s))
            })?;
            let port = match tail.strip_prefix(':') {
                Some(port) => parse_port(s, port)?,
                None => SYSLOG_UDP_PORT,
            };
            return Ok(SyslogAddress::inet(host, port));
        }

        match s.split_once(':') {
            Some((host, port)) if !port.contains(':') => {
                Ok(SyslogAddress::inet(host, parse_port(s, port)?))
            }
            // Bare IPv6 literal
            Some(_) => Ok(SyslogAddress::inet(s, SYSLOG_UDP_PORT)),
            None => Ok(SyslogAddress::inet(s, SYSLOG_UDP_PORT)),
        }
    }
}

fn parse_port(address: &str, port: &str) -> Result<u16> {
    match port.parse::<u16>() {
        Ok(0) | Err(_) => Err(LoggerError::config(
            "SyslogHandler",
            format!("invalid port in address '{}'", address),
        )),
        Ok(port) => Ok(port),
    }
}

/// Syslog facility codes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyslogFacility {
    Kern = 0,
    #[default]
    User = 1,
    Mail = 2,
    Daemon = 3,
    Auth = 4,
    Syslog = 5,
    Lpr = 6,
    News = 7,
    Uucp = 8,
    Cron = 9,
    Authpriv = 10,
    Ftp = 11,
    Local0 = 16,
    Local1 = 17,
    Local2 = 18,
    Local3 = 19,
    Local4 = 20,
    Local5 = 21,
    Local6 = 22,
    Local7 = 23,
}

impl SyslogFacility {
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl FromStr for SyslogFacility {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.trim().to_lowercase().as_str() {
            "kern" => SyslogFacility::Kern,
            "user" => SyslogFacility::User,
            "mail" => SyslogFacility::Mail,
            "daemon" => SyslogFacility::Daemon,
            "auth" | "security" => SyslogFacility::Auth,
            "syslog" => SyslogFacility::Syslog,
            "lpr" => SyslogFacility::Lpr,
            "news" => SyslogFacility::News,
            "uucp" => SyslogFacility::Uucp,
            "cron" => SyslogFacility::Cron,
            "authpriv" => SyslogFacility::Authpriv,
            "ftp" => SyslogFacility::Ftp,
            "local0" => SyslogFacility::Local0,
            "local1" => SyslogFacility::Local1,
            "local2" => SyslogFacility::Local2,
            "local3" => SyslogFacility::Local3,
            "local4" => SyslogFacility::Local4,
            "local5" => SyslogFacility::Local5,
            "local6" => SyslogFacility::Local6,
            "local7" => SyslogFacility::Local7,
            other => {
                return Err(LoggerError::config(
                    "SyslogHandler",
                    format!("unknown facility '{}'", other),
                ))
            }
        })
    }
}

/// Datagram (UDP / Unix datagram) or stream (TCP / Unix stream) transport
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocketKind {
    #[default]
    Datagram,
    Stream,
}

#[derive(Debug)]
enum Transport {
    Udp {
        socket: UdpSocket,
        target: SocketAddr,
    },
    Tcp {
        stream: Option<TcpStream>,
        targets: Vec<SocketAddr>,
    },
    #[cfg(unix)]
    UnixDatagram {
        socket: UnixDatagram,
        path: PathBuf,
    },
    #[cfg(unix)]
    UnixStream {
        stream: Option<UnixStream>,
        path: PathBuf,
    },
}

fn connect_tcp(address: &str, targets: &[SocketAddr]) -> Result<TcpStream> {
    let mut last_err = None;
    for target in targets {
        match TcpStream::connect_timeout(target, CONNECT_TIMEOUT) {
            Ok(stream) => {
                stream.set_write_timeout(Some(CONNECT_TIMEOUT))?;
                stream.set_nodelay(true)?;
                return Ok(stream);
            }
            Err(e) => last_err = Some(e),
        }
    }
    Err(LoggerError::network(
        address,
        match last_err {
            Some(e) => format!("connection failed: {}", e),
            None => "address did not resolve".to_string(),
        },
    ))
}

impl Transport {
    fn connect(address: &SyslogAddress, kind: SocketKind) -> Result<Self> {
        let display = address.to_string();
        match address {
            SyslogAddress::Inet { host, port } => {
                let targets: Vec<SocketAddr> = (host.as_str(), *port)
                    .to_socket_addrs()
                    .map_err(|e| LoggerError::network(&display, format!("cannot resolve: {}", e)))?
                    .collect();

                match kind {
                    SocketKind::Datagram => {
                        let target = *targets.first().ok_or_else(|| {
                            LoggerError::network(&display, "address did not resolve")
                        })?;
                        let bind_addr = if target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
                        let socket = UdpSocket::bind(bind_addr).map_err(|e| {
                            LoggerError::network(&display, format!("cannot bind: {}", e))
                        })?;
                        Ok(Transport::Udp { socket, target })
                    }
                    SocketKind::Stream => {
                        let stream = connect_tcp(&display, &targets)?;
                        Ok(Transport::Tcp {
                            stream: Some(stream),
                            targets,
                        })
                    }
                }
            }
            #[cfg(unix)]
            SyslogAddress::Unix(path) => match kind {
                SocketKind::Datagram => {
                    let socket = UnixDatagram::unbound()
                        .map_err(|e| LoggerError::network(&display, e.to_string()))?;
                    socket.connect(path).map_err(|e| {
                        LoggerError::network(&display, format!("connection failed: {}", e))
                    })?;
                    Ok(Transport::UnixDatagram {
                        socket,
                        path: path.clone(),
                    })
                }
                SocketKind::Stream => {
                    let stream = UnixStream::connect(path).map_err(|e| {
                        LoggerError::network(&display, format!("connection failed: {}", e))
                    })?;
                    Ok(Transport::UnixStream {
                        stream: Some(stream),
                        path: path.clone(),
                    })
                }
            },
            #[cfg(not(unix))]
            SyslogAddress::Unix(_) => Err(LoggerError::config(
                "SyslogHandler",
                "Unix domain sockets are not supported on this platform",
            )),
        }
    }

    fn send(&mut self, address: &str, payload: &[u8]) -> Result<()> {
        match self {
            Transport::Udp { socket, target } => {
                socket
                    .send_to(payload, *target)
                    .map_err(|e| LoggerError::network(address, format!("send failed: {}", e)))?;
                Ok(())
            }
            Transport::Tcp { stream, targets } => {
                let result = match stream {
                    Some(s) => s.write_all(payload),
                    None => Err(std::io::Error::new(
                        std::io::ErrorKind::NotConnected,
                        "not connected",
                    )),
                };
                if let Err(e) = result {
                    // Connection lost: reconnect once and resend
                    *stream = None;
                    let mut fresh = connect_tcp(address, targets).map_err(|reconnect_err| {
                        LoggerError::network(
                            address,
                            format!(
                                "Failed to send log and reconnect: {} (reconnect: {})",
                                e, reconnect_err
                            ),
                        )
                    })?;
                    fresh
                        .write_all(payload)
                        .map_err(|e| LoggerError::network(address, format!("send failed: {}", e)))?;
                    *stream = Some(fresh);
                }
                Ok(())
            }
            #[cfg(unix)]
            Transport::UnixDatagram { socket, .. } => {
                socket
                    .send(payload)
                    .map_err(|e| LoggerError::network(address, format!("send failed: {}", e)))?;
                Ok(())
            }
            #[cfg(unix)]
            Transport::UnixStream { stream, path } => {
                let result = match stream {
                    Some(s) => s.write_all(payload),
                    None => Err(std::io::Error::new(
                        std::io::ErrorKind::NotConnected,
                        "not connected",
                    )),
                };
                if let Err(e) = result {
                    *stream = None;
                    let mut fresh = UnixStream::connect(&*path).map_err(|reconnect_err| {
                        LoggerError::network(
                            address,
                            format!(
                                "Failed to send log and reconnect: {} (reconnect: {})",
                                e, reconnect_err
                            ),
                        )
                    })?;
                    fresh
                        .write_all(payload)
                        .map_err(|e| LoggerError::network(address, format!("send failed: {}", e)))?;
                    *stream = Some(fresh);
                }
                Ok(())
            }
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Transport::Tcp { stream: Some(s), .. } => s.flush(),
            #[cfg(unix)]
            Transport::UnixStream { stream: Some(s), .. } => s.flush(),
            _ => Ok(()),
        }
    }
}

/// Handler that forwards records to syslog
///
/// # Example
///
/// ```no_run
/// use logger_config::core::{Formatter, LogLevel};
/// use logger_config::handlers::{SocketKind, SyslogAddress, SyslogFacility, SyslogHandler};
///
/// let handler = SyslogHandler::new(
///     LogLevel::Warning,
///     Formatter::new("{name}: {message}").unwrap(),
///     SyslogAddress::unix("/dev/log"),
///     SyslogFacility::Daemon,
///     SocketKind::Datagram,
/// )
/// .expect("syslog socket unavailable");
/// ```
#[derive(Debug)]
pub struct SyslogHandler {
    level: LogLevel,
    formatter: Formatter,
    address: SyslogAddress,
    address_display: String,
    facility: SyslogFacility,
    socket_kind: SocketKind,
    ident: String,
    append_nul: bool,
    transport: Transport,
}

impl SyslogHandler {
    /// # Errors
    ///
    /// Returns an error if the address does not resolve, a stream socket
    /// cannot connect, or a Unix socket is requested on a platform without
    /// them.
    pub fn new(
        level: LogLevel,
        formatter: Formatter,
        address: SyslogAddress,
        facility: SyslogFacility,
        socket_kind: SocketKind,
    ) -> Result<Self> {
        if let SyslogAddress::Inet { host, port } = &address {
            if host.is_empty() || *port == 0 {
                return Err(LoggerError::config(
                    "SyslogHandler",
                    format!("invalid address '{}'", address),
                ));
            }
        }

        let transport = Transport::connect(&address, socket_kind)?;
        Ok(Self {
            level,
            formatter,
            address_display: address.to_string(),
            address,
            facility,
            socket_kind,
            ident: String::new(),
            append_nul: true,
            transport,
        })
    }

    /// Prefix prepended to every message after the priority
    #[must_use]
    pub fn with_ident(mut self, ident: impl Into<String>) -> Self {
        self.ident = ident.into();
        self
    }

    /// Whether messages are NUL-terminated (default: true)
    #[must_use]
    pub fn with_append_nul(mut self, append_nul: bool) -> Self {
        self.append_nul = append_nul;
        self
    }

    pub fn address(&self) -> &SyslogAddress {
        &self.address
    }

    pub fn facility(&self) -> SyslogFacility {
        self.facility
    }

    pub fn socket_kind(&self) -> SocketKind {
        self.socket_kind
    }

    /// `facility * 8 + severity`
    pub fn priority(&self, level: LogLevel) -> u8 {
        self.facility.code() * 8 + level.syslog_severity()
    }

    fn payload(&self, record: &LogRecord) -> Vec<u8> {
        let mut message = format!(
            "<{}>{}{}",
            self.priority(record.level),
            self.ident,
            self.formatter.render(record)
        );
        if self.append_nul {
            message.push('\0');
        }
        message.into_bytes()
    }
}

impl Handler for SyslogHandler {
    fn emit(&mut self, record: &LogRecord) -> Result<()> {
        let payload = self.payload(record);
        self.transport.send(&self.address_display, &payload)
    }

    fn flush(&mut self) -> Result<()> {
        self.transport.flush()?;
        Ok(())
    }

    fn kind(&self) -> HandlerKind {
        HandlerKind::Syslog
    }

    fn level(&self) -> LogLevel {
        self.level
    }

    fn set_level(&mut self, level: LogLevel) {
        self.level = level;
    }

    fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    fn set_formatter(&mut self, formatter: Formatter) {
        self.formatter = formatter;
    }
}

impl Drop for SyslogHandler {
    fn drop(&mut self) {
        let _ = self.transport.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpListener;
    use std::thread;

    fn message_only() -> Formatter {
        Formatter::new("{message}").unwrap()
    }

    #[test]
    fn test_address_parsing() {
        assert_eq!(
            "logs.internal:1514".parse::<SyslogAddress>().unwrap(),
            SyslogAddress::inet("logs.internal", 1514)
        );
        assert_eq!(
            "localhost".parse::<SyslogAddress>().unwrap(),
            SyslogAddress::default()
        );
        assert_eq!(
            "[::1]:514".parse::<SyslogAddress>().unwrap(),
            SyslogAddress::inet("::1", 514)
        );
        assert_eq!(
            "/dev/log".parse::<SyslogAddress>().unwrap(),
            SyslogAddress::unix("/dev/log")
        );
        assert!("host:0".parse::<SyslogAddress>().is_err());
        assert!("host:port".parse::<SyslogAddress>().is_err());
        assert!("".parse::<SyslogAddress>().is_err());
    }

    #[test]
    fn test_address_display() {
        assert_eq!(SyslogAddress::default().to_string(), "localhost:514");
        assert_eq!(SyslogAddress::inet("::1", 514).to_string(), "[::1]:514");
    }

    #[test]
    fn test_facility_parsing() {
        assert_eq!("LOCAL3".parse::<SyslogFacility>().unwrap(), SyslogFacility::Local3);
        assert_eq!(SyslogFacility::Local7.code(), 23);
        assert!("nonsense".parse::<SyslogFacility>().is_err());
        let parsed: SyslogFacility = serde_json::from_str("\"daemon\"").unwrap();
        assert_eq!(parsed, SyslogFacility::Daemon);
    }

    #[test]
    fn test_udp_wire_format() {
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        server.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        let port = server.local_addr().unwrap().port();

        let mut handler = SyslogHandler::new(
            LogLevel::Debug,
            message_only(),
            SyslogAddress::inet("127.0.0.1", port),
            SyslogFacility::User,
            SocketKind::Datagram,
        )
        .unwrap();

        handler.emit(&LogRecord::new("s", LogLevel::Debug, "bug is found")).unwrap();
        let mut buf = [0u8; 512];
        let n = server.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"<15>bug is found\0");

        handler.emit(&LogRecord::new("s", LogLevel::Info, "ready")).unwrap();
        let n = server.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"<14>ready\0");
    }

    #[test]
    fn test_ident_and_no_nul() {
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        server.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        let port = server.local_addr().unwrap().port();

        let mut handler = SyslogHandler::new(
            LogLevel::Debug,
            message_only(),
            SyslogAddress::inet("127.0.0.1", port),
            SyslogFacility::Local0,
            SocketKind::Datagram,
        )
        .unwrap()
        .with_ident("app: ")
        .with_append_nul(false);

        handler.emit(&LogRecord::new("s", LogLevel::Error, "disk full")).unwrap();
        let mut buf = [0u8; 512];
        let n = server.recv(&mut buf).unwrap();
        // local0 (16) * 8 + error (3)
        assert_eq!(&buf[..n], b"<131>app: disk full");
    }

    #[test]
    fn test_tcp_transport() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = thread::spawn(move || {
            let (mut conn, _) = listener.accept().unwrap();
            let mut received = Vec::new();
            conn.read_to_end(&mut received).unwrap();
            received
        });

        {
            let mut handler = SyslogHandler::new(
                LogLevel::Debug,
                message_only(),
                SyslogAddress::inet("127.0.0.1", port),
                SyslogFacility::User,
                SocketKind::Stream,
            )
            .unwrap();
            handler.emit(&LogRecord::new("s", LogLevel::Warning, "over tcp")).unwrap();
        }

        assert_eq!(server.join().unwrap(), b"<12>over tcp\0".to_vec());
    }

    #[test]
    fn test_tcp_connection_refused() {
        // Grab a free port, then close the listener so nothing is there
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let result = SyslogHandler::new(
            LogLevel::Debug,
            message_only(),
            SyslogAddress::inet("127.0.0.1", port),
            SyslogFacility::User,
            SocketKind::Stream,
        );
        assert!(matches!(result, Err(LoggerError::NetworkError { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_unix_datagram() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.sock");
        let server = UnixDatagram::bind(&path).unwrap();

        let mut handler = SyslogHandler::new(
            LogLevel::Debug,
            message_only(),
            SyslogAddress::unix(&path),
            SyslogFacility::Daemon,
            SocketKind::Datagram,
        )
        .unwrap();
        handler.emit(&LogRecord::new("s", LogLevel::Critical, "local")).unwrap();

        let mut buf = [0u8; 128];
        let n = server.recv(&mut buf).unwrap();
        // daemon (3) * 8 + critical (2)
        assert_eq!(&buf[..n], b"<26>local\0");
    }
}
