use clap::Args;

use crate::initializer::InvocationContext;

/// Prints `export` statements so the resolved identity can be used by other
/// tools, e.g. `eval "$(aws-utility --assumeRole --assumedRoleArn ... env)"`.
#[derive(Debug, Clone, Args)]
pub struct EnvCommand {}

impl EnvCommand {
    pub fn execute(self, context: &InvocationContext) {
        print!("{}", render_exports(context));
    }
}

fn render_exports(context: &InvocationContext) -> String {
    let credentials = context.effective_credentials();

    let mut exports = vec![
        export_line("AWS_REGION", context.region()),
        export_line("AWS_ACCESS_KEY_ID", credentials.access_key_id()),
        export_line("AWS_SECRET_ACCESS_KEY", credentials.secret_access_key()),
    ];
    exports.push(match credentials.session_token() {
        Some(token) => export_line("AWS_SESSION_TOKEN", token),
        None => "unset AWS_SESSION_TOKEN\n".to_string(),
    });

    exports.concat()
}

fn export_line(name: &str, value: &str) -> String {
    // Single-quote for POSIX shells
    format!("export {name}='{}'\n", value.replace('\'', r"'\''"))
}
