mod midir_backend;

pub use midir_backend::MidirBackend;

use crate::error::{OpenError, PlayerError};
use crate::events::NoteCommand;

/// Where note on/off commands go. Sending never fails from the caller's
/// point of view; implementations log what they could not deliver.
pub trait NoteSink {
    fn send(&mut self, command: NoteCommand);

    fn close(&mut self) {}
}

impl<S: NoteSink + ?Sized> NoteSink for Box<S> {
    fn send(&mut self, command: NoteCommand) {
        (**self).send(command)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

pub trait OutputBackend {
    fn port_names(&self) -> Vec<String>;

    fn open(&self, index: usize) -> Result<Box<dyn NoteSink>, OpenError>;
}

/// Lists the ports, lets `choose` pick one and opens it. Nothing is opened
/// when there are no ports.
pub fn open_output<B, F>(backend: &B, choose: F) -> Result<Box<dyn NoteSink>, PlayerError>
where
    B: OutputBackend + ?Sized,
    F: FnOnce(&[String]) -> Result<usize, PlayerError>,
{
    let ports = backend.port_names();
    if ports.is_empty() {
        return Err(PlayerError::NoOutputDevice);
    }
    let index = choose(&ports)?;
    Ok(backend.open(index)?)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Keeps every command it was sent.
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        pub sent: Vec<NoteCommand>,
        pub closed: bool,
    }

    impl NoteSink for RecordingSink {
        fn send(&mut self, command: NoteCommand) {
            assert!(!self.closed, "send after close");
            self.sent.push(command);
        }

        fn close(&mut self) {
            self.closed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FakeBackend {
        ports: Vec<String>,
        opened: Cell<Option<usize>>,
    }

    impl OutputBackend for FakeBackend {
        fn port_names(&self) -> Vec<String> {
            self.ports.clone()
        }

        fn open(&self, index: usize) -> Result<Box<dyn NoteSink>, OpenError> {
            if index >= self.ports.len() {
                return Err(OpenError::NoSuchPort { index });
            }
            self.opened.set(Some(index));
            Ok(Box::new(testing::RecordingSink::default()))
        }
    }

    #[test]
    fn test_no_ports_aborts_before_choosing() {
        let backend = FakeBackend {
            ports: vec![],
            opened: Cell::new(None),
        };
        let result = open_output(&backend, |_| panic!("should not prompt"));

        assert!(matches!(result, Err(PlayerError::NoOutputDevice)));
        assert_eq!(backend.opened.get(), None);
    }

    #[test]
    fn test_opens_chosen_port() {
        let backend = FakeBackend {
            ports: vec!["a".into(), "b".into()],
            opened: Cell::new(None),
        };
        let result = open_output(&backend, |ports| {
            assert_eq!(ports.len(), 2);
            Ok(1)
        });

        assert!(result.is_ok());
        assert_eq!(backend.opened.get(), Some(1));
    }
}
