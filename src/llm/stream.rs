//! Incremental Server-Sent Events decoder
//!
//! Response bodies arrive as arbitrary byte chunks; a frame (terminated by a
//! blank line) may span several chunks, and a chunk may hold several frames.
//! Lines may end in `\n`, `\r\n` or a lone `\r`.

/// One decoded SSE frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: Option<String>,
    pub data: String,
}

/// Accumulates bytes and yields complete frames
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    /// Last chunk ended in `\r`; a leading `\n` in the next one completes it
    pending_cr: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk, returning every frame it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.reserve(chunk.len());
        for &byte in chunk {
            if std::mem::take(&mut self.pending_cr) && byte == b'\n' {
                continue;
            }
            if byte == b'\r' {
                self.buffer.push(b'\n');
                self.pending_cr = true;
            } else {
                self.buffer.push(byte);
            }
        }

        let mut frames = Vec::new();
        while let Some(end) = find_frame_end(&self.buffer) {
            let raw: Vec<u8> = self.buffer.drain(..end + 2).collect();
            if let Some(frame) = parse_frame(&raw[..end]) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Bytes held back waiting for the rest of a frame
    #[cfg(test)]
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }
}

fn find_frame_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

fn parse_frame(raw: &[u8]) -> Option<SseFrame> {
    let text = String::from_utf8_lossy(raw);
    let mut event = None;
    let mut data: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.starts_with(':') {
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => event = Some(value.to_string()),
            "data" => data.push(value),
            _ => {}
        }
    }

    if data.is_empty() {
        return None;
    }

    Some(SseFrame {
        event,
        data: data.join("\n"),
    })
}
