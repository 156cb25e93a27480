use super::commands::{UciInput, UciOutput};
use super::decoder::Decoder;
use super::encoder::Encoder;
use log::debug;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

/// Engine side of a UCI conversation over stdin/stdout.
pub struct UciConnection {
    output_tx: Option<Sender<UciOutput>>,
    printer: Option<JoinHandle<()>>,
}

impl Default for UciConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl UciConnection {
    pub fn new() -> Self {
        let (output_tx, output_rx) = channel();
        let printer = Self::spawn_output_handler(output_rx);

        Self {
            output_tx: Some(output_tx),
            printer: Some(printer),
        }
    }

    // Takes a callback that handles commands and may answer through the sender.
    // Returns once `quit` is received or stdin is closed.
    pub fn listen<F>(&mut self, mut callback: F) -> io::Result<()>
    where
        F: FnMut(&UciInput, Sender<UciOutput>) -> Result<(), Box<dyn Error>>,
    {
        let Some(output_tx) = self.output_tx.clone() else {
            return Ok(());
        };

        let decoder = Decoder::new();
        let stdin = io::stdin();
        let mut reader = stdin.lock();

        loop {
            let mut in_line = String::new();
            if reader.read_line(&mut in_line)? == 0 {
                debug!("Input closed");
                break;
            }

            let in_line = in_line.trim();
            debug!("Input: {:?}", in_line);

            let input = decoder.decode_input(in_line);

            if let Err(e) = callback(&input, output_tx.clone()) {
                debug!("Callback error: {:?}", e);
            }

            if matches!(input, UciInput::Quit) {
                break;
            }
        }

        Ok(())
    }

    fn spawn_output_handler(output_rx: Receiver<UciOutput>) -> JoinHandle<()> {
        thread::spawn(move || {
            let encoder = Encoder {};
            let stdout = io::stdout();

            while let Ok(output) = output_rx.recv() {
                let out_line = encoder.encode_output(&output);
                debug!("Output: {:?}", out_line);

                let mut handle = stdout.lock();
                if writeln!(handle, "{}", out_line)
                    .and_then(|_| handle.flush())
                    .is_err()
                {
                    break;
                }
            }
        })
    }
}

impl Drop for UciConnection {
    // Closing the channel lets the printer drain what is queued and exit.
    fn drop(&mut self) {
        self.output_tx.take();
        if let Some(printer) = self.printer.take() {
            let _ = printer.join();
        }
    }
}
