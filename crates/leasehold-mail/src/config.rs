//! Email dispatcher configuration.

/// Settings for the hosted email function.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Full URL of the email function endpoint.
    pub function_url: String,
    /// Bearer key sent in the `Authorization` header, if the function
    /// requires one.
    pub api_key: Option<String>,
    /// Per-request timeout in seconds (default: 10).
    pub timeout_secs: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            function_url: "http://127.0.0.1:54321/functions/v1/send-email".into(),
            api_key: None,
            timeout_secs: 10,
        }
    }
}
