//! Scripted stand-in for a serial port, used by unit tests.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

#[derive(Debug)]
enum Step {
    Bytes(VecDeque<u8>),
    Silence(Duration),
}

#[derive(Debug, Default)]
pub struct MockChannel {
    script: VecDeque<Step>,
    silence_started: Option<Instant>,
    written: Vec<u8>,
    silent_when_drained: bool,
}

impl MockChannel {
    pub fn new(replies: &[u8]) -> Self {
        Self::default().then_reply(replies)
    }

    /// Queue more reply bytes after whatever is already scripted.
    pub fn then_reply(mut self, replies: &[u8]) -> Self {
        self.script
            .push_back(Step::Bytes(replies.iter().copied().collect()));
        self
    }

    /// Report `TimedOut` for `duration` before moving on in the script.
    pub fn then_silence(mut self, duration: Duration) -> Self {
        self.script.push_back(Step::Silence(duration));
        self
    }

    /// Report `TimedOut` instead of EOF once the script ran out, like an
    /// open port whose device went quiet.
    pub fn silent_when_drained(mut self) -> Self {
        self.silent_when_drained = true;
        self
    }

    pub fn written(&self) -> &[u8] {
        &self.written
    }

    pub fn remaining(&self) -> usize {
        self.script
            .iter()
            .map(|step| match step {
                Step::Bytes(bytes) => bytes.len(),
                Step::Silence(_) => 0,
            })
            .sum()
    }

    fn timed_out() -> io::Error {
        io::Error::new(io::ErrorKind::TimedOut, "Operation timed out")
    }
}

impl Read for MockChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.script.front_mut() {
                Some(Step::Silence(duration)) => {
                    let started = *self.silence_started.get_or_insert_with(Instant::now);
                    if started.elapsed() < *duration {
                        return Err(Self::timed_out());
                    }
                    self.silence_started = None;
                    self.script.pop_front();
                }
                Some(Step::Bytes(bytes)) if bytes.is_empty() => {
                    self.script.pop_front();
                }
                Some(Step::Bytes(bytes)) => {
                    let mut count = 0;
                    while count < buf.len() {
                        match bytes.pop_front() {
                            Some(byte) => {
                                buf[count] = byte;
                                count += 1;
                            }
                            None => break,
                        }
                    }
                    return Ok(count);
                }
                None if self.silent_when_drained => return Err(Self::timed_out()),
                None => return Ok(0),
            }
        }
    }
}

impl Write for MockChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
