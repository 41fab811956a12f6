use std::{
    error::Error,
    fs::File,
    io::{BufRead as _, BufReader},
    path::Path,
};

use crossbeam::channel::Sender;
use glam::Vec2;
use pcd_capture::{
    CameraParams, CaptureError, FrameSnapshot, MeshUpdate, Orientation, PixelBuffer, PixelFormat,
    Plane, SessionEvent,
};
use serde::Deserialize;

/// One line of a recorded capture (JSON Lines).
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecordedEvent {
    Frame(RecordedFrame),
    Mesh(MeshUpdate),
}

#[derive(Debug, Deserialize)]
pub struct RecordedFrame {
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub planes: Vec<Plane>,
    pub camera: CameraParams,
    #[serde(default)]
    pub orientation: Orientation,
    pub viewport_size: Vec2,
}

impl RecordedFrame {
    pub fn into_snapshot(self) -> Result<FrameSnapshot, CaptureError> {
        let image = PixelBuffer::new(self.format, self.width, self.height, self.planes)?;
        Ok(FrameSnapshot::new(
            image,
            self.camera,
            self.orientation,
            self.viewport_size,
        ))
    }
}

pub fn parse_event(line: &str) -> Result<SessionEvent, Box<dyn Error>> {
    let event = match serde_json::from_str::<RecordedEvent>(line)? {
        RecordedEvent::Frame(frame) => SessionEvent::Frame(frame.into_snapshot()?),
        RecordedEvent::Mesh(update) => SessionEvent::Mesh(update),
    };
    Ok(event)
}

/// Streams every event of a capture file into `sender`. Returns the event count.
pub fn replay_file(path: &Path, sender: &Sender<SessionEvent>) -> Result<usize, Box<dyn Error>> {
    let reader = BufReader::new(File::open(path)?);
    let mut count = 0;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let event = parse_event(&line)
            .map_err(|e| format!("{}:{}: {}", path.display(), index + 1, e))?;
        sender.send(event)?;
        count += 1;
    }

    Ok(count)
}
