/// Errors raised while talking to a CREOSON server.
#[derive(Debug, thiserror::Error)]
pub enum CreosonError {
    #[error("HTTP request to CREOSON failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CREOSON {command}/{function} failed: {message}")]
    Server {
        command: &'static str,
        function: &'static str,
        message: String,
    },

    #[error("CREOSON {command}/{function} response has no `{field}` field")]
    MissingField {
        command: &'static str,
        function: &'static str,
        field: &'static str,
    },

    #[error("could not decode `{field}` from CREOSON {command}/{function}: {source}")]
    Decode {
        command: &'static str,
        function: &'static str,
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("no CREOSON session, connect first")]
    NotConnected,
}
