pub mod completions;
pub mod env;
pub mod whoami;

pub use completions::CompletionsCommand;
pub use env::EnvCommand;
pub use whoami::WhoamiCommand;
