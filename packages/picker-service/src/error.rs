pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Transport error: {message}")]
	Transport { message: String },
	#[error("Search backend error: {message}")]
	UpstreamQuery { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
}
impl From<picker_providers::Error> for Error {
	fn from(err: picker_providers::Error) -> Self {
		if err.is_transport() {
			Self::Transport { message: err.to_string() }
		} else {
			Self::Provider { message: err.to_string() }
		}
	}
}
