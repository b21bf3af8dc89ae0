use std::path::PathBuf;

use habita_application::AccessRequirement;
use habita_core::{AppError, AppResult};

pub const USAGE: &str = "usage: habita <command>

commands:
  resolve <user.json>                     resolve capabilities for a backend user payload
  login <email-or-username> <password>    sign in and store the session
  register <username> <email> <password>  create an account and sign in
  whoami                                  show capabilities of the stored session
  refresh                                 refetch the profile and resolve again
  check <requirement>                     exit non-zero unless the session satisfies it
                                          (authenticated, privileged, permission:<name>,
                                           capability:<name>, property_slot:<count>)
  logout                                  end the session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Resolve { payload_path: PathBuf },
    Session(SessionCommand),
}

/// Commands that run against the stored session and the auth backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Login { identifier: String, password: String },
    Register { username: String, email: String, password: String },
    Whoami,
    Refresh,
    Check { requirement: AccessRequirement },
    Logout,
}

impl Command {
    pub fn parse(args: impl IntoIterator<Item = String>) -> AppResult<Self> {
        let args: Vec<String> = args.into_iter().collect();
        let arguments: Vec<&str> = args.iter().map(String::as_str).collect();

        let session_command = match arguments.as_slice() {
            ["resolve", path] => {
                return Ok(Self::Resolve {
                    payload_path: PathBuf::from(path),
                });
            }
            ["login", identifier, password] => SessionCommand::Login {
                identifier: (*identifier).to_owned(),
                password: (*password).to_owned(),
            },
            ["register", username, email, password] => SessionCommand::Register {
                username: (*username).to_owned(),
                email: (*email).to_owned(),
                password: (*password).to_owned(),
            },
            ["whoami"] => SessionCommand::Whoami,
            ["refresh"] => SessionCommand::Refresh,
            ["check", requirement] => SessionCommand::Check {
                requirement: requirement.parse()?,
            },
            ["logout"] => SessionCommand::Logout,
            _ => return Err(AppError::Validation(USAGE.to_owned())),
        };

        Ok(Self::Session(session_command))
    }
}
