//! Pose frame input
//!
//! One JSON object per line: `{"timestamp": 1.25, "landmarks": [...]}`,
//! with `"landmarks": null` (or no field) when no pose was detected.
//! Blank lines are skipped. A read error ends the stream.

use rep_coach::PoseFrame;
use std::error::Error;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::warn;

/// Reads pose frames from a JSON-lines source
pub struct FrameReader<R> {
    lines: std::io::Lines<R>,
    line_number: usize,
    failed: bool,
}

impl FrameReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let file = File::open(path.as_ref())
            .map_err(|e| format!("Cannot open {}: {}", path.as_ref().display(), e))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        FrameReader {
            lines: reader.lines(),
            line_number: 0,
            failed: false,
        }
    }
}

impl<R: BufRead> Iterator for FrameReader<R> {
    type Item = Result<PoseFrame, Box<dyn Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(format!("Read failed after line {}: {}", self.line_number, e).into()));
                }
            };
            self.line_number += 1;

            if line.trim().is_empty() {
                continue;
            }

            return Some(
                serde_json::from_str(&line)
                    .map_err(|e| format!("Line {}: {}", self.line_number, e).into()),
            );
        }
    }
}

/// Drop frames that could not be read, logging each one
pub fn skip_unreadable<I>(frames: I) -> impl Iterator<Item = PoseFrame>
where
    I: Iterator<Item = Result<PoseFrame, Box<dyn Error>>>,
{
    frames.filter_map(|frame| match frame {
        Ok(frame) => Some(frame),
        Err(e) => {
            warn!("Skipping frame: {}", e);
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_frames_and_skips_blank_lines() {
        let input = "{\"timestamp\": 0.0, \"landmarks\": null}\n\n{\"timestamp\": 0.033}\n";
        let frames: Vec<PoseFrame> = FrameReader::new(Cursor::new(input))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(frames, vec![PoseFrame::lost(0.0), PoseFrame::lost(0.033)]);
    }

    #[test]
    fn test_reports_line_number() {
        let input = "{\"timestamp\": 0.0}\nnot json\n";
        let mut reader = FrameReader::new(Cursor::new(input));
        assert!(reader.next().unwrap().is_ok());
        let err = reader.next().unwrap().unwrap_err();
        assert!(err.to_string().starts_with("Line 2:"));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_malformed_line_does_not_end_stream() {
        let input = "{\"timestamp\": 0.0}\n{\"timestamp\": \n{\"timestamp\": 0.066}\n";
        let frames: Vec<PoseFrame> = skip_unreadable(FrameReader::new(Cursor::new(input))).collect();
        assert_eq!(frames, vec![PoseFrame::lost(0.0), PoseFrame::lost(0.066)]);
    }

    #[test]
    fn test_read_error_ends_stream() {
        // invalid UTF-8 on the second line
        let input: &[u8] = b"{\"timestamp\": 0.0}\n\xff\xfe\n{\"timestamp\": 0.066}\n";
        let mut reader = FrameReader::new(Cursor::new(input));
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }
}
