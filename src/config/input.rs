/// Probe input channel: one non-negative integer from an argument or stdin
use crate::config::types::{ProbeError, Result};
use std::io::{BufRead, ErrorKind};

/// Parse a probe target, rejecting negative and malformed values
pub fn parse_target(raw: &str) -> Result<u64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ProbeError::InvalidInput("empty target".to_string()));
    }
    trimmed
        .parse::<u64>()
        .map_err(|e| ProbeError::InvalidInput(format!("target '{}' is not a non-negative integer: {}", trimmed, e)))
}

/// Read the first whitespace-separated token from `reader` as the target
pub fn read_target<R: BufRead>(reader: R) -> Result<u64> {
    for line in reader.lines() {
        let line = line.map_err(|e| match e.kind() {
            ErrorKind::InvalidData => ProbeError::InvalidInput(format!("unreadable target: {}", e)),
            _ => ProbeError::Io(e),
        })?;
        if let Some(token) = line.split_whitespace().next() {
            return parse_target(token);
        }
    }
    Err(ProbeError::InvalidInput("no target on standard input".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_target() {
        assert_eq!(parse_target("5").unwrap(), 5);
        assert_eq!(parse_target(" 100000\n").unwrap(), 100000);
        assert_eq!(parse_target("0").unwrap(), 0);
    }

    #[test]
    fn test_parse_target_rejects_negative_and_garbage() {
        assert!(matches!(parse_target("-3"), Err(ProbeError::InvalidInput(_))));
        assert!(matches!(parse_target("ten"), Err(ProbeError::InvalidInput(_))));
        assert!(matches!(parse_target(""), Err(ProbeError::InvalidInput(_))));
    }

    #[test]
    fn test_read_target_skips_blank_lines() {
        let input = Cursor::new("\n   \n  42 17\n");
        assert_eq!(read_target(input).unwrap(), 42);
    }

    #[test]
    fn test_read_target_non_utf8_is_invalid_input() {
        let input = Cursor::new(vec![0xff, 0xfe, b'5', b'\n']);
        let err = read_target(input).unwrap_err();
        assert!(matches!(err, ProbeError::InvalidInput(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_read_target_empty_stream() {
        let err = read_target(Cursor::new("")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
