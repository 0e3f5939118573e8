// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;
use std::str::FromStr;

use logfollow::bounded_channel::BoundedReceiver;
use logfollow::follow::{EntryParser, LogFollower};
use tracing::{info, warn};

/// A command read from stdin, one per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Pause,
    Resume,
    Path(PathBuf),
    Start,
    Stop,
    Status,
    Quit,
}

impl FromStr for Control {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        let (cmd, arg) = match line.split_once(char::is_whitespace) {
            Some((cmd, arg)) => (cmd, arg.trim()),
            None => (line, ""),
        };

        match (cmd.to_lowercase().as_str(), arg) {
            ("pause", "") => Ok(Control::Pause),
            ("resume", "") => Ok(Control::Resume),
            ("start", "") => Ok(Control::Start),
            ("stop", "") => Ok(Control::Stop),
            ("status", "") => Ok(Control::Status),
            ("quit" | "exit", "") => Ok(Control::Quit),
            ("path", "") => Err("path requires a file argument".to_string()),
            ("path", file) => Ok(Control::Path(PathBuf::from(file))),
            _ => Err(format!(
                "Unknown command '{}'. Valid commands: pause, resume, path <FILE>, start, stop, status, quit",
                line
            )),
        }
    }
}

/// Apply commands to the follower until `Quit` arrives or every sender is
/// dropped. The follower is dropped on return, which joins its loop.
pub fn control_loop<P: EntryParser + 'static>(
    mut follower: LogFollower<P>,
    commands: BoundedReceiver<Control>,
) {
    while let Some(command) = commands.recv_blocking() {
        match command {
            Control::Pause => {
                follower.set_paused(true);
            }
            Control::Resume => {
                follower.set_paused(false);
            }
            Control::Path(path) => follower.set_path(path),
            Control::Start => {
                if let Err(e) = follower.start() {
                    warn!("Unable to start following: {}", e);
                }
            }
            Control::Stop => follower.stop(),
            Control::Status => {
                info!(
                    path = ?follower.path(),
                    paused = follower.is_paused(),
                    running = follower.is_running(),
                    state = %follower.loop_state(),
                    offset = ?follower.offset(),
                    file_size = follower.file_size(),
                    "Follower status"
                );
            }
            Control::Quit => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("pause".parse::<Control>(), Ok(Control::Pause));
        assert_eq!("  Resume \n".parse::<Control>(), Ok(Control::Resume));
        assert_eq!(
            "path /var/log/my app.log".parse::<Control>(),
            Ok(Control::Path(PathBuf::from("/var/log/my app.log")))
        );
        assert_eq!("exit".parse::<Control>(), Ok(Control::Quit));
    }

    #[test]
    fn test_parse_rejects_bad_commands() {
        assert!("path".parse::<Control>().is_err());
        assert!("pause now".parse::<Control>().is_err());
        assert!("rewind".parse::<Control>().is_err());
    }
}
