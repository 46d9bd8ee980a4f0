use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to accept connection on {address}: {source}")]
    Accept {
        address: String,
        #[source]
        source: std::io::Error,
    },
}
