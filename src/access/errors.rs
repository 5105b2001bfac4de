use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("Failed to read access file `{path}`")]
    #[diagnostic(
        code(warden::access::read),
        help("Check that the file exists and is readable by the bot")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("KDL parse error: {0}")]
    #[diagnostic(
        code(warden::access::kdl_parse),
        help("Each top-level node is a user and each child is `<command> #true|#false` (https://kdl.dev)")
    )]
    Syntax(String),

    #[error("User `{0}` is defined more than once")]
    #[diagnostic(
        code(warden::access::duplicate_user),
        help("User names are case insensitive; merge the rules into a single node")
    )]
    DuplicateUser(String),

    #[error("Command `{command}` is defined more than once for user `{user}`")]
    #[diagnostic(
        code(warden::access::duplicate_command),
        help("Command names are case insensitive; keep exactly one flag per command")
    )]
    DuplicateCommand { user: String, command: String },

    #[error("Flag for command `{command}` of user `{user}` is `{found}`, expected a boolean")]
    #[diagnostic(
        code(warden::access::not_boolean),
        help("Use #true (requires verification) or #false (denied)")
    )]
    NotBoolean {
        user: String,
        command: String,
        found: String,
    },

    #[error("Command `{command}` of user `{user}` needs exactly one flag argument")]
    #[diagnostic(
        code(warden::access::missing_flag),
        help("Rule syntax: <command> #true")
    )]
    MissingFlag { user: String, command: String },

    #[error("Command `{command}` of user `{user}` has unexpected property `{property}`")]
    #[diagnostic(code(warden::access::unexpected_property))]
    UnexpectedProperty {
        user: String,
        command: String,
        property: String,
    },

    #[error("Command `{command}` of user `{user}` must not have children")]
    #[diagnostic(code(warden::access::unexpected_children))]
    UnexpectedChildren { user: String, command: String },

    #[error("User node `{0}` must not have arguments or properties")]
    #[diagnostic(
        code(warden::access::user_arguments),
        help("User syntax: <user> {{ <command> #true ... }}")
    )]
    UserWithArguments(String),
}
