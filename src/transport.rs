use crate::error::ProtocolError;
use crate::protocol::{parse_line, Incoming, TurnResponse};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

pub trait Transport {
    /// `Ok(None)` once the channel is closed.
    fn read_message(&mut self) -> Result<Option<Incoming>, ProtocolError>;
    fn post_message(&mut self, response: &TurnResponse) -> Result<(), ProtocolError>;
}

/// One JSON value per line in each direction. Blank lines are skipped.
pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
    buf: String,
}

impl<R: BufRead, W: Write> LineTransport<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            buf: String::new(),
        }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<R: BufRead, W: Write> Transport for LineTransport<R, W> {
    fn read_message(&mut self) -> Result<Option<Incoming>, ProtocolError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            if self.buf.trim().is_empty() {
                continue;
            }
            return parse_line(&self.buf).map(Some);
        }
    }

    fn post_message(&mut self, response: &TurnResponse) -> Result<(), ProtocolError> {
        serde_json::to_writer(&mut self.writer, response).map_err(io::Error::from)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

pub type StdioTransport = LineTransport<io::StdinLock<'static>, io::Stdout>;

pub fn stdio() -> StdioTransport {
    LineTransport::new(io::stdin().lock(), io::stdout())
}

/// In-memory channel for tests and replays that do not need real i/o.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    inbox: VecDeque<Incoming>,
    pub posted: Vec<TurnResponse>,
}

impl ScriptedTransport {
    pub fn new(messages: impl IntoIterator<Item = Incoming>) -> Self {
        Self {
            inbox: messages.into_iter().collect(),
            posted: Vec::new(),
        }
    }
}

impl Transport for ScriptedTransport {
    fn read_message(&mut self) -> Result<Option<Incoming>, ProtocolError> {
        Ok(self.inbox.pop_front())
    }

    fn post_message(&mut self, response: &TurnResponse) -> Result<(), ProtocolError> {
        self.posted.push(response.clone());
        Ok(())
    }
}
