use std::io::{self, BufRead};
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use seqex_core::Key;
use tracing::{debug, warn};

/// Maps one line typed on stdin to a key.
///
/// An empty line is Enter and a line of blanks is Space, anything else is
/// looked up by key name.
pub fn parse_line(line: &str) -> Option<Key> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return Some(Key::Enter);
    }
    if line.trim().is_empty() {
        return Some(Key::Space);
    }
    match line.parse() {
        Ok(key) => Some(key),
        Err(err) => {
            warn!(%err, "ignoring input");
            None
        }
    }
}

/// Reads keys from stdin on a background thread. The channel disconnects when
/// stdin closes.
pub fn spawn_key_reader() -> Receiver<Key> {
    let (tx, rx) = crossbeam_channel::unbounded();
    thread::spawn(move || read_keys(io::stdin().lock(), tx));
    rx
}

fn read_keys(reader: impl BufRead, tx: Sender<Key>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!(%err, "stdin read failed");
                break;
            }
        };
        let Some(key) = parse_line(&line) else {
            continue;
        };
        debug!(%key, "key read");
        if tx.send(key).is_err() {
            break;
        }
    }
    debug!("key reader finished");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_map_to_enter_and_space() {
        assert_eq!(parse_line(""), Some(Key::Enter));
        assert_eq!(parse_line("\r\n"), Some(Key::Enter));
        assert_eq!(parse_line("   "), Some(Key::Space));
    }

    #[test]
    fn test_named_keys_and_unknown_input() {
        assert_eq!(parse_line("Escape"), Some(Key::Escape));
        assert_eq!(parse_line("shift_left\n"), Some(Key::ShiftLeft));
        assert_eq!(parse_line("hyper"), None);
    }

    #[test]
    fn test_reader_forwards_keys_in_order_and_disconnects() {
        let (tx, rx) = crossbeam_channel::unbounded();
        read_keys("a\n\nnope\n \nb\n".as_bytes(), tx);

        let keys: Vec<Key> = rx.iter().collect();
        assert_eq!(keys, vec![Key::A, Key::Enter, Key::Space, Key::B]);
    }
}
