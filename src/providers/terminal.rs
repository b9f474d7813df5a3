//! Shared line-oriented terminal input
//!
//! The interactive session and the location permission prompt both read
//! lines from stdin. They must go through one buffered reader, otherwise
//! the first reader swallows lines meant for the other.

use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::Mutex;

type BoxedLines = Lines<Box<dyn AsyncBufRead + Send + Unpin>>;

/// Cloneable handle to a single line source
#[derive(Clone)]
pub struct LineInput {
    lines: Arc<Mutex<BoxedLines>>,
}

impl LineInput {
    /// Lines from the process's standard input
    pub fn stdin() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }

    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncBufRead + Send + Unpin + 'static,
    {
        let boxed: Box<dyn AsyncBufRead + Send + Unpin> = Box::new(reader);
        Self {
            lines: Arc::new(Mutex::new(boxed.lines())),
        }
    }

    /// Next line without its terminator; `None` at end of input
    pub async fn next_line(&self) -> io::Result<Option<String>> {
        self.lines.lock().await.next_line().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clones_share_one_cursor() {
        let input = LineInput::from_reader(&b"first\nsecond\nthird\n"[..]);
        let other = input.clone();

        assert_eq!(input.next_line().await.unwrap().as_deref(), Some("first"));
        assert_eq!(other.next_line().await.unwrap().as_deref(), Some("second"));
        assert_eq!(input.next_line().await.unwrap().as_deref(), Some("third"));
        assert_eq!(other.next_line().await.unwrap(), None);
    }
}
