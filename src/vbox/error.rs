use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("VBoxManage {command} failed (exit code {code:?}): {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("VBoxManage {command} produced non UTF-8 output")]
    InvalidOutput { command: String },

    #[error("unrecognized VirtualBox version: {0}")]
    UnknownVersion(String),
}

impl DriverError {
    /// Whether VBoxManage reported that the queried object does not exist.
    pub fn is_object_not_found(&self) -> bool {
        match self {
            DriverError::CommandFailed { stderr, .. } => {
                stderr.contains("VBOX_E_OBJECT_NOT_FOUND") || stderr.contains("Could not find")
            }
            _ => false,
        }
    }
}
