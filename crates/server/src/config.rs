use std::net::SocketAddr;

#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct ServerConfig {
    pub listen: SocketAddr,

    /// Public URL of the service.
    pub root_url: String,

    pub cors: bool,
}

impl ServerConfig {
    #[must_use]
    pub const fn new(listen: SocketAddr, root_url: String, cors: bool) -> Self {
        Self {
            listen,
            root_url,
            cors,
        }
    }
}
