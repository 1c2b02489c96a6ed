/// Report stream
///
/// Every report is one line, flushed before the write returns, so an
/// observer of the stream sees progress up to the instant the process is
/// killed.
use crate::config::types::Result;
use std::fmt;
use std::io::Write;

/// Line-oriented, unbuffered report writer
pub struct Reporter<W: Write> {
    out: W,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Reporter { out }
    }

    /// Write one report line and flush it
    pub fn line(&mut self, args: fmt::Arguments<'_>) -> Result<()> {
        self.out.write_fmt(args)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /// Records how many bytes were written before each flush
    #[derive(Default)]
    struct FlushLog {
        buf: Vec<u8>,
        flushed_at: Vec<usize>,
    }

    impl Write for FlushLog {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            self.buf.extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushed_at.push(self.buf.len());
            Ok(())
        }
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_each_line_is_flushed() {
        let mut reporter = Reporter::new(FlushLog::default());
        reporter.line(format_args!("Allocated {} MB", 10)).unwrap();
        reporter.line(format_args!("Allocated {} MB", 20)).unwrap();

        let log = reporter.into_inner();
        assert_eq!(String::from_utf8(log.buf.clone()).unwrap(), "Allocated 10 MB\nAllocated 20 MB\n");
        assert_eq!(log.flushed_at, vec![16, 32]);
    }

    #[test]
    fn test_write_failure_propagates() {
        let mut reporter = Reporter::new(ClosedPipe);
        let err = reporter.line(format_args!("lost")).unwrap_err();
        assert_eq!(err.exit_code(), 74);
    }
}
