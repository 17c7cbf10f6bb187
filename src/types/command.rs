//! Typed console commands
//!
//! Each [`ConsoleCommand`] renders to exactly one console line. Arguments are
//! wrapped in double quotes; the console has no escape syntax, so arguments
//! that would break the quoting or the line are rejected by
//! [`ConsoleCommand::to_line`] instead of being sent corrupted.

use std::fmt;

use crate::error::{HeadlessError, Result};

/// World selector for the `focus` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldRef {
    /// Position in the `worlds` listing
    Index(u32),
    /// World name
    Name(String),
}

impl From<u32> for WorldRef {
    fn from(index: u32) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for WorldRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for WorldRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// Who may join the focused world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    /// Only invited users
    Private,
    /// Users on the local network
    Lan,
    /// Contacts of the host
    Friends,
    /// Contacts of contacts
    FriendsOfFriends,
    /// Any registered account
    RegisteredUsers,
    /// Everyone
    Anyone,
}

impl AccessLevel {
    /// Console spelling of the access level
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Private => "Private",
            Self::Lan => "LAN",
            Self::Friends => "Friends",
            Self::FriendsOfFriends => "FriendsOfFriends",
            Self::RegisteredUsers => "RegisteredUsers",
            Self::Anyone => "Anyone",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A command understood by the headless console
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// `login "<user>" "<password>"`
    Login {
        /// Username or email
        user: String,
        /// Account password
        password: String,
    },
    /// `message "<user>" "<message>"`
    Message {
        /// Recipient
        user: String,
        /// Text to send
        message: String,
    },
    /// `invite "<user>"`
    Invite {
        /// User to invite
        user: String,
    },
    /// `friendRequests`
    FriendRequests,
    /// `acceptFriendRequest "<user>"`
    AcceptFriendRequest {
        /// Requesting user
        user: String,
    },
    /// `worlds`
    Worlds,
    /// `focus <index>` or `focus "<name>"`
    Focus(WorldRef),
    /// `startWorldURL "<record>"`
    StartWorldUrl {
        /// World record URL
        record: String,
    },
    /// `startWorldTemplate <template>`
    StartWorldTemplate {
        /// Template name
        template: String,
    },
    /// `status`
    Status,
    /// `sessionURL`
    SessionUrl,
    /// `sessionID`
    SessionId,
    /// `users`
    Users,
    /// `close`
    Close,
    /// `save`
    Save,
    /// `restart`
    Restart,
    /// `kick "<user>"`
    Kick {
        /// Target user
        user: String,
    },
    /// `silence "<user>"`
    Silence {
        /// Target user
        user: String,
    },
    /// `unsilence "<user>"`
    Unsilence {
        /// Target user
        user: String,
    },
    /// `ban "<user>"`
    Ban {
        /// Target user
        user: String,
    },
    /// `unban "<user>"`
    Unban {
        /// Target user
        user: String,
    },
    /// `respawn "<user>"`
    Respawn {
        /// Target user
        user: String,
    },
    /// `role "<user>" "<role>"`
    Role {
        /// Target user
        user: String,
        /// Role name
        role: String,
    },
    /// `accessLevel "<level>"`
    AccessLevel(AccessLevel),
    /// `gc`
    Gc,
    /// `saveConfig` or `saveConfig <filename>`
    SaveConfig {
        /// Target file, saves in place when absent
        filename: Option<String>,
    },
    /// `log`
    Log,
}

impl ConsoleCommand {
    /// Validate arguments and render the console line
    ///
    /// # Errors
    /// Returns `InvalidArgument` if an argument contains a double quote or a
    /// line break, or if an unquoted argument contains whitespace.
    pub fn to_line(&self) -> Result<String> {
        self.validate()?;
        Ok(self.to_string())
    }

    /// Check every argument against the quoting rules
    ///
    /// # Errors
    /// Returns `InvalidArgument` naming the offending argument
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Login { user, password } => {
                quoted("user", user)?;
                quoted("password", password)
            }
            Self::Message { user, message } => {
                quoted("user", user)?;
                quoted("message", message)
            }
            Self::Role { user, role } => {
                quoted("user", user)?;
                quoted("role", role)
            }
            Self::Invite { user }
            | Self::AcceptFriendRequest { user }
            | Self::Kick { user }
            | Self::Silence { user }
            | Self::Unsilence { user }
            | Self::Ban { user }
            | Self::Unban { user }
            | Self::Respawn { user } => quoted("user", user),
            Self::Focus(WorldRef::Name(name)) => quoted("world", name),
            Self::StartWorldUrl { record } => quoted("record", record),
            Self::StartWorldTemplate { template } => bare("template", template),
            Self::SaveConfig {
                filename: Some(filename),
            } => bare("filename", filename),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for ConsoleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login { user, password } => write!(f, "login \"{user}\" \"{password}\""),
            Self::Message { user, message } => write!(f, "message \"{user}\" \"{message}\""),
            Self::Invite { user } => write!(f, "invite \"{user}\""),
            Self::FriendRequests => f.write_str("friendRequests"),
            Self::AcceptFriendRequest { user } => write!(f, "acceptFriendRequest \"{user}\""),
            Self::Worlds => f.write_str("worlds"),
            Self::Focus(WorldRef::Index(index)) => write!(f, "focus {index}"),
            Self::Focus(WorldRef::Name(name)) => write!(f, "focus \"{name}\""),
            Self::StartWorldUrl { record } => write!(f, "startWorldURL \"{record}\""),
            Self::StartWorldTemplate { template } => write!(f, "startWorldTemplate {template}"),
            Self::Status => f.write_str("status"),
            Self::SessionUrl => f.write_str("sessionURL"),
            Self::SessionId => f.write_str("sessionID"),
            Self::Users => f.write_str("users"),
            Self::Close => f.write_str("close"),
            Self::Save => f.write_str("save"),
            Self::Restart => f.write_str("restart"),
            Self::Kick { user } => write!(f, "kick \"{user}\""),
            Self::Silence { user } => write!(f, "silence \"{user}\""),
            Self::Unsilence { user } => write!(f, "unsilence \"{user}\""),
            Self::Ban { user } => write!(f, "ban \"{user}\""),
            Self::Unban { user } => write!(f, "unban \"{user}\""),
            Self::Respawn { user } => write!(f, "respawn \"{user}\""),
            Self::Role { user, role } => write!(f, "role \"{user}\" \"{role}\""),
            Self::AccessLevel(level) => write!(f, "accessLevel \"{level}\""),
            Self::Gc => f.write_str("gc"),
            Self::SaveConfig { filename: None } => f.write_str("saveConfig"),
            Self::SaveConfig {
                filename: Some(filename),
            } => write!(f, "saveConfig {filename}"),
            Self::Log => f.write_str("log"),
        }
    }
}

/// Reject raw command text that would span more than one console line
///
/// # Errors
/// Returns `InvalidArgument` if the text contains `\r` or `\n`
pub fn check_single_line(text: &str) -> Result<()> {
    if text.contains(['\r', '\n']) {
        return Err(HeadlessError::invalid_argument(
            "command text must be a single line",
        ));
    }
    Ok(())
}

fn quoted(name: &str, value: &str) -> Result<()> {
    if value.contains(['"', '\r', '\n']) {
        return Err(HeadlessError::invalid_argument(format!(
            "{name} may not contain double quotes or line breaks"
        )));
    }
    Ok(())
}

fn bare(name: &str, value: &str) -> Result<()> {
    if value.is_empty() || value.contains('"') || value.chars().any(char::is_whitespace) {
        return Err(HeadlessError::invalid_argument(format!(
            "{name} must be a single non-empty word without quotes"
        )));
    }
    Ok(())
}
