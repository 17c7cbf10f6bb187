//! Typed console commands
//!
//! One method per console command. Each renders its line, queues it and
//! resolves with the raw response line; interpreting the response is left
//! to the caller.

use super::HeadlessClient;
use crate::error::Result;
use crate::types::command::{AccessLevel, ConsoleCommand, WorldRef};

impl HeadlessClient {
    /// Log in to an account
    ///
    /// # Errors
    /// Returns `InvalidArgument` if an argument contains a double quote or a
    /// line break, otherwise as [`run_command`](Self::run_command)
    pub async fn login(&self, user: impl Into<String>, password: impl Into<String>) -> Result<String> {
        self.execute(ConsoleCommand::Login {
            user: user.into(),
            password: password.into(),
        })
        .await
    }

    /// Send a direct message to a user
    ///
    /// # Errors
    /// As [`login`](Self::login)
    pub async fn message(
        &self,
        user: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<String> {
        self.execute(ConsoleCommand::Message {
            user: user.into(),
            message: message.into(),
        })
        .await
    }

    /// Invite a user to the focused world
    ///
    /// # Errors
    /// As [`login`](Self::login)
    pub async fn invite(&self, user: impl Into<String>) -> Result<String> {
        self.execute(ConsoleCommand::Invite { user: user.into() })
            .await
    }

    /// List pending friend requests
    ///
    /// # Errors
    /// As [`run_command`](Self::run_command)
    pub async fn friend_requests(&self) -> Result<String> {
        self.execute(ConsoleCommand::FriendRequests).await
    }

    /// Accept a friend request
    ///
    /// # Errors
    /// As [`login`](Self::login)
    pub async fn accept_friend_request(&self, user: impl Into<String>) -> Result<String> {
        self.execute(ConsoleCommand::AcceptFriendRequest { user: user.into() })
            .await
    }

    /// List running worlds
    ///
    /// # Errors
    /// As [`run_command`](Self::run_command)
    pub async fn worlds(&self) -> Result<String> {
        self.execute(ConsoleCommand::Worlds).await
    }

    /// Focus a world by index or by name
    ///
    /// # Errors
    /// As [`login`](Self::login)
    pub async fn focus(&self, world: impl Into<WorldRef>) -> Result<String> {
        self.execute(ConsoleCommand::Focus(world.into())).await
    }

    /// Start a world from a record URL
    ///
    /// # Errors
    /// As [`login`](Self::login)
    pub async fn start_world_url(&self, record: impl Into<String>) -> Result<String> {
        self.execute(ConsoleCommand::StartWorldUrl {
            record: record.into(),
        })
        .await
    }

    /// Start a world from a named template
    ///
    /// The template name is written unquoted.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the name is empty or contains whitespace,
    /// a double quote or a line break
    pub async fn start_world_template(&self, template: impl Into<String>) -> Result<String> {
        self.execute(ConsoleCommand::StartWorldTemplate {
            template: template.into(),
        })
        .await
    }

    /// Status of the focused world
    ///
    /// # Errors
    /// As [`run_command`](Self::run_command)
    pub async fn status(&self) -> Result<String> {
        self.execute(ConsoleCommand::Status).await
    }

    /// URL of the focused session
    ///
    /// # Errors
    /// As [`run_command`](Self::run_command)
    pub async fn session_url(&self) -> Result<String> {
        self.execute(ConsoleCommand::SessionUrl).await
    }

    /// Raw `sessionID` response for the focused world
    ///
    /// Unlike [`get_session_id`](Self::get_session_id) this neither validates
    /// nor caches the answer.
    ///
    /// # Errors
    /// As [`run_command`](Self::run_command)
    pub async fn fetch_session_id(&self) -> Result<String> {
        self.execute(ConsoleCommand::SessionId).await
    }

    /// Users in the focused world
    ///
    /// # Errors
    /// As [`run_command`](Self::run_command)
    pub async fn users(&self) -> Result<String> {
        self.execute(ConsoleCommand::Users).await
    }

    /// Close the focused world
    ///
    /// # Errors
    /// As [`run_command`](Self::run_command)
    pub async fn close_world(&self) -> Result<String> {
        self.execute(ConsoleCommand::Close).await
    }

    /// Save the focused world
    ///
    /// # Errors
    /// As [`run_command`](Self::run_command)
    pub async fn save(&self) -> Result<String> {
        self.execute(ConsoleCommand::Save).await
    }

    /// Restart the focused world
    ///
    /// # Errors
    /// As [`run_command`](Self::run_command)
    pub async fn restart(&self) -> Result<String> {
        self.execute(ConsoleCommand::Restart).await
    }

    /// Kick a user from the focused world
    ///
    /// # Errors
    /// As [`login`](Self::login)
    pub async fn kick(&self, user: impl Into<String>) -> Result<String> {
        self.execute(ConsoleCommand::Kick { user: user.into() }).await
    }

    /// Silence a user in the focused world
    ///
    /// # Errors
    /// As [`login`](Self::login)
    pub async fn silence(&self, user: impl Into<String>) -> Result<String> {
        self.execute(ConsoleCommand::Silence { user: user.into() })
            .await
    }

    /// Lift a silence
    ///
    /// # Errors
    /// As [`login`](Self::login)
    pub async fn unsilence(&self, user: impl Into<String>) -> Result<String> {
        self.execute(ConsoleCommand::Unsilence { user: user.into() })
            .await
    }

    /// Ban a user from all worlds of this headless client
    ///
    /// # Errors
    /// As [`login`](Self::login)
    pub async fn ban(&self, user: impl Into<String>) -> Result<String> {
        self.execute(ConsoleCommand::Ban { user: user.into() }).await
    }

    /// Lift a ban
    ///
    /// # Errors
    /// As [`login`](Self::login)
    pub async fn unban(&self, user: impl Into<String>) -> Result<String> {
        self.execute(ConsoleCommand::Unban { user: user.into() }).await
    }

    /// Respawn a user
    ///
    /// # Errors
    /// As [`login`](Self::login)
    pub async fn respawn(&self, user: impl Into<String>) -> Result<String> {
        self.execute(ConsoleCommand::Respawn { user: user.into() })
            .await
    }

    /// Assign a role to a user
    ///
    /// # Errors
    /// As [`login`](Self::login)
    pub async fn role(&self, user: impl Into<String>, role: impl Into<String>) -> Result<String> {
        self.execute(ConsoleCommand::Role {
            user: user.into(),
            role: role.into(),
        })
        .await
    }

    /// Set who may join the focused world
    ///
    /// # Errors
    /// As [`run_command`](Self::run_command)
    pub async fn access_level(&self, level: AccessLevel) -> Result<String> {
        self.execute(ConsoleCommand::AccessLevel(level)).await
    }

    /// Force a garbage collection
    ///
    /// # Errors
    /// As [`run_command`](Self::run_command)
    pub async fn gc(&self) -> Result<String> {
        self.execute(ConsoleCommand::Gc).await
    }

    /// Save the running configuration, in place or to `filename`
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the file name is empty or contains
    /// whitespace, a double quote or a line break
    pub async fn save_config(&self, filename: Option<&str>) -> Result<String> {
        self.execute(ConsoleCommand::SaveConfig {
            filename: filename.map(str::to_string),
        })
        .await
    }
}
