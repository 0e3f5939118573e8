// SPDX-License-Identifier: Apache-2.0

use std::io::{self, BufRead};
use std::thread::{self, JoinHandle};

use logfollow::bounded_channel::BoundedSender;
use tracing::{debug, warn};

const THREAD_NAME: &str = "logfollow-stdin";

/// Forward lines from `reader` into `lines` on a plain thread.
///
/// A blocking read can't be cancelled, so the thread is never joined. It
/// exits on EOF, on a read error, or once the receiver is dropped, and
/// otherwise dies with the process.
pub fn spawn_line_reader<R>(reader: R, lines: BoundedSender<String>) -> io::Result<JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name(THREAD_NAME.to_string())
        .spawn(move || {
            for line in reader.lines() {
                match line {
                    Ok(line) => {
                        if lines.send_blocking(line).is_err() {
                            debug!("Command receiver dropped, stopping stdin reader");
                            return;
                        }
                    }
                    Err(e) => {
                        warn!("Failed to read stdin: {}", e);
                        return;
                    }
                }
            }
            debug!("Stdin closed, no further commands");
        })
}
