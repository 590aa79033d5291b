//! Mailbox session abstraction and its IMAP implementation
//!
//! The driver talks to a [`Mailbox`] through a [`Connector`], which covers
//! connecting and logging in. [`ImapConnector`] opens a TLS connection with
//! explicit timeouts and delegates the protocol to the `imap` crate.
//! [`SessionGuard`] closes and logs out the session on every exit path.

use crate::credentials::Credentials;
use crate::error::{ExtractError, Result};
use native_tls::{TlsConnector, TlsStream};
use std::net::{TcpStream, ToSocketAddrs};
use std::ops::{Deref, DerefMut};
use std::time::Duration;
use tracing::{debug, info};

/// Operations the driver needs from an authenticated session
pub trait Mailbox {
    /// Select a folder, read-only when `read_only` is set. Returns the
    /// number of messages in the folder.
    fn select(&mut self, folder: &str, read_only: bool) -> Result<u32>;

    /// Sequence numbers matching `criterion`, in ascending order
    fn list(&mut self, criterion: &str) -> Result<Vec<u32>>;

    /// Full RFC 822 bytes of one message
    fn fetch_raw(&mut self, id: u32) -> Result<Vec<u8>>;

    /// Close the selected folder
    fn close(&mut self) -> Result<()>;

    /// End the session
    fn logout(&mut self) -> Result<()>;
}

/// Opens authenticated sessions
pub trait Connector {
    type Session: Mailbox;

    /// Connect and log in. Rejected credentials fail with
    /// [`ExtractError::Auth`], everything else with
    /// [`ExtractError::Transport`].
    fn connect(&self, credentials: &Credentials) -> Result<Self::Session>;
}

/// IMAP over implicit TLS
#[derive(Debug, Clone)]
pub struct ImapConnector {
    /// IMAP server hostname
    pub host: String,

    /// IMAP server port (993 for implicit TLS)
    pub port: u16,

    /// Connect, read and write timeout
    pub timeout: Duration,
}

impl ImapConnector {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    fn open_stream(&self) -> Result<TlsStream<TcpStream>> {
        let addrs = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| ExtractError::Transport(format!("resolve {}: {e}", self.host)))?;

        let mut last_error = None;
        let mut tcp = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(stream) => {
                    tcp = Some(stream);
                    break;
                }
                Err(e) => last_error = Some(e),
            }
        }
        let tcp = tcp.ok_or_else(|| {
            ExtractError::Transport(last_error.map_or_else(
                || format!("no address found for {}", self.host),
                |e| format!("connect {}:{}: {e}", self.host, self.port),
            ))
        })?;

        let io_err = |e: std::io::Error| ExtractError::Transport(e.to_string());
        tcp.set_read_timeout(Some(self.timeout)).map_err(io_err)?;
        tcp.set_write_timeout(Some(self.timeout)).map_err(io_err)?;

        let tls = TlsConnector::builder()
            .build()
            .map_err(|e| ExtractError::Transport(e.to_string()))?;
        tls.connect(&self.host, tcp)
            .map_err(|e| ExtractError::Transport(format!("TLS handshake: {e}")))
    }
}

impl Connector for ImapConnector {
    type Session = ImapMailbox;

    fn connect(&self, credentials: &Credentials) -> Result<ImapMailbox> {
        info!("Connecting to {}:{}", self.host, self.port);
        let stream = self.open_stream()?;

        let mut client = imap::Client::new(stream);
        client.read_greeting()?;

        info!("Logging in as {}", credentials.username);
        let session = client
            .login(&credentials.username, credentials.password())
            .map_err(|(e, _client)| match e {
                imap::error::Error::No(msg) | imap::error::Error::Bad(msg) => {
                    ExtractError::Auth(msg)
                }
                other => ExtractError::Transport(other.to_string()),
            })?;

        Ok(ImapMailbox { session })
    }
}

/// An authenticated IMAP session
pub struct ImapMailbox {
    session: imap::Session<TlsStream<TcpStream>>,
}

impl Mailbox for ImapMailbox {
    fn select(&mut self, folder: &str, read_only: bool) -> Result<u32> {
        let mailbox = if read_only {
            self.session.examine(folder)?
        } else {
            self.session.select(folder)?
        };
        Ok(mailbox.exists)
    }

    fn list(&mut self, criterion: &str) -> Result<Vec<u32>> {
        let mut ids: Vec<u32> = self.session.search(criterion)?.into_iter().collect();
        ids.sort_unstable();
        Ok(ids)
    }

    fn fetch_raw(&mut self, id: u32) -> Result<Vec<u8>> {
        let fetches = self.session.fetch(id.to_string(), "RFC822")?;
        fetches
            .iter()
            .find_map(imap::types::Fetch::body)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| ExtractError::Transport(format!("message {id} returned no body")))
    }

    fn close(&mut self) -> Result<()> {
        Ok(self.session.close()?)
    }

    fn logout(&mut self) -> Result<()> {
        Ok(self.session.logout()?)
    }
}

/// Owns a session and releases it when dropped
///
/// The folder is closed (if one was selected) and the session logged out
/// exactly once. Errors during release are discarded.
pub struct SessionGuard<M: Mailbox> {
    session: M,
    selected: bool,
}

impl<M: Mailbox> SessionGuard<M> {
    pub const fn new(session: M) -> Self {
        Self {
            session,
            selected: false,
        }
    }

    /// Select a folder and remember to close it on release
    pub fn select(&mut self, folder: &str, read_only: bool) -> Result<u32> {
        let exists = self.session.select(folder, read_only)?;
        self.selected = true;
        Ok(exists)
    }
}

impl<M: Mailbox> Deref for SessionGuard<M> {
    type Target = M;

    fn deref(&self) -> &M {
        &self.session
    }
}

impl<M: Mailbox> DerefMut for SessionGuard<M> {
    fn deref_mut(&mut self) -> &mut M {
        &mut self.session
    }
}

impl<M: Mailbox> Drop for SessionGuard<M> {
    fn drop(&mut self) {
        if self.selected
            && let Err(e) = self.session.close()
        {
            debug!("Ignoring error while closing folder: {e}");
        }
        if let Err(e) = self.session.logout() {
            debug!("Ignoring error while logging out: {e}");
        }
    }
}
