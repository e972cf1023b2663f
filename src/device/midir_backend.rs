use midir::{MidiOutput, MidiOutputConnection};

use super::{NoteSink, OutputBackend};
use crate::error::OpenError;
use crate::events::NoteCommand;

pub struct MidirBackend {
    client_name: String,
    output: MidiOutput,
}

impl MidirBackend {
    pub fn new(client_name: &str) -> Result<Self, OpenError> {
        let output = MidiOutput::new(client_name).map_err(|e| OpenError::Init(e.to_string()))?;
        Ok(Self {
            client_name: client_name.to_owned(),
            output,
        })
    }
}

impl OutputBackend for MidirBackend {
    fn port_names(&self) -> Vec<String> {
        self.output
            .ports()
            .iter()
            .map(|port| self.output.port_name(port).unwrap_or_default())
            .collect()
    }

    fn open(&self, index: usize) -> Result<Box<dyn NoteSink>, OpenError> {
        // `connect` consumes the client, so each connection gets its own.
        let output =
            MidiOutput::new(&self.client_name).map_err(|e| OpenError::Init(e.to_string()))?;
        let ports = output.ports();
        let port = ports.get(index).ok_or(OpenError::NoSuchPort { index })?;
        let name = output.port_name(port).unwrap_or_default();

        let connection = output
            .connect(port, "keyfall-out")
            .map_err(|e| OpenError::Connect {
                name: name.clone(),
                message: e.to_string(),
            })?;
        tracing::info!("Connected to MIDI output {}", name);

        Ok(Box::new(MidirSink {
            connection: Some(connection),
            name,
        }))
    }
}

struct MidirSink {
    connection: Option<MidiOutputConnection>,
    name: String,
}

impl NoteSink for MidirSink {
    fn send(&mut self, command: NoteCommand) {
        let Some(connection) = self.connection.as_mut() else {
            tracing::warn!("Dropped {:?}, {} is closed", command, self.name);
            return;
        };
        if let Err(e) = connection.send(&command.to_bytes()) {
            tracing::warn!("Failed to send {:?} to {}: {}", command, self.name, e);
        }
    }

    fn close(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.close();
            tracing::info!("Closed MIDI output {}", self.name);
        }
    }
}

impl Drop for MidirSink {
    fn drop(&mut self) {
        self.close();
    }
}
