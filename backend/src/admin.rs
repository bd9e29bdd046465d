//! Account administration behind the `grouptrack-admin` binary.
//!
//! Commands run against whichever storage backend the settings select, so
//! operators provision accounts in the same store the server reads.

use std::io::{self, Write};

use chrono::{DateTime, Duration, Local, Utc};
use clap::{Parser, Subcommand};

use crate::domain::ports::{CredentialRepositoryError, LocationRepositoryError, StoragePorts};
use crate::domain::{FriendGroup, UserValidationError, Username};

/// `grouptrack-admin` command line.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "grouptrack-admin",
    about = "Provision accounts and inspect group activity",
    version
)]
pub struct AdminCli {
    /// Operation to run.
    #[command(subcommand)]
    pub command: AdminCommand,
}

/// Supported operations.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum AdminCommand {
    /// Provision an account whose password is set on first login.
    CreateUser {
        /// Login name.
        username: String,
        /// Group whose members see each other.
        friend_group: String,
    },
    /// Return an account to claim-on-first-login.
    ResetPassword {
        /// Login name.
        username: String,
    },
    /// Show when each member of a group last reported.
    ListUpdates {
        /// Group to inspect.
        friend_group: String,
    },
}

/// Failures surfaced to the operator.
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    /// An argument is not a valid username or group.
    #[error(transparent)]
    InvalidArgument(#[from] UserValidationError),
    /// The credential store rejected the operation.
    #[error(transparent)]
    Credentials(#[from] CredentialRepositoryError),
    /// The location store could not be read.
    #[error(transparent)]
    Locations(#[from] LocationRepositoryError),
    /// Output could not be written.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// Run `command` against `ports`, writing human-readable output to `out`.
///
/// `now` anchors the relative ages printed by `list-updates`.
///
/// # Errors
///
/// Returns [`AdminError`] when the arguments are invalid, the account state
/// does not allow the operation, or storage fails.
pub async fn execute(
    command: &AdminCommand,
    ports: &StoragePorts,
    now: DateTime<Utc>,
    out: &mut impl Write,
) -> Result<(), AdminError> {
    match command {
        AdminCommand::CreateUser {
            username,
            friend_group,
        } => {
            let username = Username::new(username.as_str())?;
            let friend_group = FriendGroup::new(friend_group.as_str())?;
            ports
                .credentials
                .create_user(&username, &friend_group)
                .await?;
            writeln!(
                out,
                "Created user '{username}' in group '{friend_group}'; the first login sets the password."
            )?;
        }
        AdminCommand::ResetPassword { username } => {
            let username = Username::new(username.as_str())?;
            ports.credentials.reset_password(&username).await?;
            writeln!(
                out,
                "Reset password for '{username}'; the next login sets a new one."
            )?;
        }
        AdminCommand::ListUpdates { friend_group } => {
            let friend_group = FriendGroup::new(friend_group.as_str())?;
            let members = ports
                .locations
                .get_user_locations_in_group(&friend_group)
                .await?;
            if members.is_empty() {
                writeln!(out, "No locations recorded for group '{friend_group}'.")?;
                return Ok(());
            }
            writeln!(out, "Last updates for group '{friend_group}':")?;
            for member in members {
                let username = member.username.as_str();
                let updated_at = member
                    .location
                    .timestamp()
                    .and_then(|tst| DateTime::from_timestamp(tst, 0));
                match updated_at {
                    Some(at) => writeln!(
                        out,
                        "{username:<20} {} ({})",
                        at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
                        format_last_update(now.signed_duration_since(at)),
                    )?,
                    None => writeln!(out, "{username:<20} no timestamp available")?,
                }
            }
        }
    }
    Ok(())
}

/// Describe how long ago an update happened.
///
/// Ages under a minute, including fixes stamped slightly in the future, read
/// as "just now".
///
/// # Examples
/// ```
/// use chrono::Duration;
/// use grouptrack::admin::format_last_update;
///
/// assert_eq!(format_last_update(Duration::minutes(90)), "1 hour ago");
/// ```
pub fn format_last_update(elapsed: Duration) -> String {
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();
    if minutes < 1 {
        "just now".to_owned()
    } else if minutes < 60 {
        plural(minutes, "minute")
    } else if hours < 24 {
        plural(hours, "hour")
    } else {
        plural(days, "day")
    }
}

fn plural(count: i64, unit: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count} {unit}{suffix} ago")
}
