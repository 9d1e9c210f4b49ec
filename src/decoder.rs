/// Byte-at-a-time decoder for the radar's ASCII report lines.
///
/// Report lines have a fixed layout:
///
/// ```text
/// position  0 1 2 3 4 5 6 7 8 9 10 11 12
///           m o v ,   d i s = 1 .  2  3  \r \n
/// ```
///
/// Each byte is validated against its position. A failed check only marks the
/// line invalid; the remaining bytes are still counted so the next `\n` is
/// recognised. No byte is buffered beyond the two fixed token arrays.
use crate::defaults::{ACK_TOKEN, MOVEMENT_TOKEN, OCCUPANCY_TOKEN, SEPARATOR};

/// Index of the last byte of a well-formed report line
const LAST_POSITION: usize = 12;

/// Leading-token classification of a report line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
    /// `mov` — a moving target
    Movement,
    /// `occ` — a stationary (occupying) target
    Occupancy,
}

/// One decoded report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotionRecord {
    /// `None` when the leading token was neither `mov` nor `occ`
    pub kind: Option<MotionKind>,
    /// Distance in centimetres (0..=999)
    pub distance_cm: u16,
    /// Whether every byte of the line matched the report layout
    pub valid: bool,
}

impl MotionRecord {
    pub fn is_movement(&self) -> bool {
        self.kind == Some(MotionKind::Movement)
    }

    pub fn is_occupancy(&self) -> bool {
        self.kind == Some(MotionKind::Occupancy)
    }

    /// Distance in metres
    pub fn distance(&self) -> f32 {
        self.distance_cm as f32 / 100.0
    }

    /// A line worth publishing: framing intact and a recognised leading token.
    pub fn is_motion_event(&self) -> bool {
        self.valid && self.kind.is_some()
    }
}

/// What a single byte produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Mid-line, nothing to report
    InProgress,
    /// A line ended with intact framing
    LineComplete(MotionRecord),
    /// A line ended after a framing error (or before it was complete)
    Discarded,
    /// The line opened with `rec`: the radar accepted the last command
    AckDetected,
}

/// Decoder state for the line currently being received.
pub struct FrameDecoder {
    position: usize,
    token: [u8; 3],
    separator: [u8; 6],
    kind: Option<MotionKind>,
    distance_cm: u16,
    valid: bool,
}

impl FrameDecoder {
    pub const fn new() -> Self {
        Self {
            position: 0,
            token: [0; 3],
            separator: [0; 6],
            kind: None,
            distance_cm: 0,
            valid: true,
        }
    }

    /// Position of the next byte within the current line
    pub fn position(&self) -> usize {
        self.position
    }

    /// Feed one byte from the radar.
    pub fn consume(&mut self, byte: u8) -> Outcome {
        match byte {
            b'\n' => self.finish_line(),
            // always precedes '\n', carries nothing
            b'\r' => Outcome::InProgress,
            _ => {
                let outcome = self.classify(byte);
                self.position = self.position.saturating_add(1);
                outcome
            }
        }
    }

    fn classify(&mut self, byte: u8) -> Outcome {
        if !self.valid {
            return Outcome::InProgress;
        }

        match self.position {
            0..=2 => {
                self.token[self.position] = byte;
                if self.position == 2 {
                    return self.classify_token();
                }
            }
            3..=8 => {
                self.separator[self.position - 3] = byte;
                if self.position == 8 && self.separator != SEPARATOR {
                    self.valid = false;
                }
            }
            9 | 11 | 12 => match digit_value(byte) {
                Some(d) => match self.position {
                    9 => self.distance_cm = d * 100,
                    11 => self.distance_cm += d * 10,
                    _ => self.distance_cm += d,
                },
                None => self.valid = false,
            },
            10 => {
                if byte != b'.' {
                    self.valid = false;
                }
            }
            // line too long
            _ => self.valid = false,
        }
        Outcome::InProgress
    }

    /// Both checks run on the same three bytes: a line can be an
    /// acknowledgment and still be parsed for framing.
    fn classify_token(&mut self) -> Outcome {
        self.kind = if self.token == MOVEMENT_TOKEN {
            Some(MotionKind::Movement)
        } else if self.token == OCCUPANCY_TOKEN {
            Some(MotionKind::Occupancy)
        } else {
            None
        };

        if self.token == ACK_TOKEN {
            Outcome::AckDetected
        } else {
            Outcome::InProgress
        }
    }

    fn finish_line(&mut self) -> Outcome {
        let outcome = if self.valid && self.position == LAST_POSITION + 1 {
            Outcome::LineComplete(MotionRecord {
                kind: self.kind,
                distance_cm: self.distance_cm,
                valid: true,
            })
        } else {
            Outcome::Discarded
        };
        self.reset();
        outcome
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

fn digit_value(byte: u8) -> Option<u16> {
    if byte.is_ascii_digit() {
        Some((byte - b'0') as u16)
    } else {
        None
    }
}
