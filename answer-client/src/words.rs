//! Re-segments decoded answer fragments into whole words for incremental
//! display. The trailing piece of the buffer may still be completed by the
//! next fragment, so it is held back until [`WordChunker::finish`].

/// Buffers fragment text and emits completed words, split on the single space
/// delimiter. Used only by the streaming path.
#[derive(Debug, Default)]
pub struct WordChunker {
    buf: String,
}

impl WordChunker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fragment and returns every word completed by it, in order.
    /// Consecutive spaces yield empty words; callers render them as-is.
    pub fn push(&mut self, fragment: &str) -> Vec<String> {
        self.buf.push_str(fragment);

        let mut words = Vec::new();
        while let Some(pos) = self.buf.find(' ') {
            let mut word: String = self.buf.drain(..=pos).collect();
            word.pop(); // drop the delimiter
            words.push(word);
        }
        words
    }

    /// Flushes the possibly-incomplete trailing word at stream end.
    pub fn finish(self) -> Option<String> {
        if self.buf.is_empty() {
            None
        } else {
            Some(self.buf)
        }
    }
}
