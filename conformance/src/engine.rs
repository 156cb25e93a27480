use std::error::Error;
use std::fmt;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};
use std::sync::mpsc::{sync_channel, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};
use uci::{Decoder, Encoder, SearchLimit, UciInput, UciOutput};

use crate::driver::Player;
use crate::moves::Move;

const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_MOVE_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_QUIT_GRACE: Duration = Duration::from_millis(500);

// Added on top of what a search limit implies, so a `depth 1` search that
// answers instantly can never be reported as late.
const MIN_RESPONSE_MARGIN: Duration = Duration::from_millis(50);
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(10);
// Lines buffered ahead of the reader; a flooding engine blocks on its pipe.
const LINE_BUFFER: usize = 1024;

#[derive(Debug)]
pub enum EngineError {
    ProcessSpawn {
        path: PathBuf,
        source: io::Error,
    },
    HandshakeTimeout {
        engine: String,
        awaiting: &'static str,
        waited: Duration,
    },
    EngineTimeout {
        engine: String,
        waited: Duration,
    },
    ProtocolParse {
        engine: String,
        line: String,
        reason: String,
    },
    EngineExited {
        engine: String,
        awaiting: &'static str,
    },
    Io {
        engine: String,
        source: io::Error,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::ProcessSpawn { path, source } => {
                write!(f, "failed to start engine {}: {}", path.display(), source)
            }
            EngineError::HandshakeTimeout {
                engine,
                awaiting,
                waited,
            } => write!(
                f,
                "{} did not answer with {} within {:?}",
                engine, awaiting, waited
            ),
            EngineError::EngineTimeout { engine, waited } => {
                write!(f, "{} did not send bestmove within {:?}", engine, waited)
            }
            EngineError::ProtocolParse {
                engine,
                line,
                reason,
            } => write!(f, "{} sent malformed {:?}: {}", engine, line, reason),
            EngineError::EngineExited { engine, awaiting } => {
                write!(f, "{} exited while the harness awaited {}", engine, awaiting)
            }
            EngineError::Io { engine, source } => {
                write!(f, "I/O error talking to {}: {}", engine, source)
            }
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EngineError::ProcessSpawn { source, .. } | EngineError::Io { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}

/// How to launch an engine and how long to wait on it.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub path: PathBuf,
    pub args: Vec<String>,
    // Name used in logs and diagnostics, defaults to the executable's file name.
    pub label: Option<String>,
    pub handshake_timeout: Duration,
    // Allowance on top of the time the search limit implies.
    pub move_timeout: Duration,
    pub quit_grace: Duration,
}

impl EngineConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            args: Vec::new(),
            label: None,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            move_timeout: DEFAULT_MOVE_TIMEOUT,
            quit_grace: DEFAULT_QUIT_GRACE,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    pub fn move_timeout(mut self, timeout: Duration) -> Self {
        self.move_timeout = timeout;
        self
    }

    pub fn quit_grace(mut self, grace: Duration) -> Self {
        self.quit_grace = grace;
        self
    }

    fn display_name(&self) -> String {
        self.label.clone().unwrap_or_else(|| file_label(&self.path))
    }
}

/// What the engine said about itself during the handshake.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineIdentity {
    pub name: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Awaiting {
    UciOk,
    ReadyOk,
    BestMove,
}

impl Awaiting {
    fn as_str(self) -> &'static str {
        match self {
            Awaiting::UciOk => "uciok",
            Awaiting::ReadyOk => "readyok",
            Awaiting::BestMove => "bestmove",
        }
    }
}

/// One running engine subprocess.
///
/// The process is shut down by [`EngineProcess::stop`] or, failing that, when
/// the value is dropped, so every way out of a scenario releases it.
pub struct EngineProcess {
    name: String,
    config: EngineConfig,
    identity: EngineIdentity,
    child: Child,
    stdin: BufWriter<ChildStdin>,
    lines: Receiver<String>,
    encoder: Encoder,
    decoder: Decoder,
    exit_status: Option<ExitStatus>,
}

impl EngineProcess {
    /// Spawns the engine and completes the `uci`/`isready` handshake.
    pub fn start(config: EngineConfig) -> Result<Self, EngineError> {
        let name = config.display_name();
        debug!("Starting {} ({})", name, config.path.display());

        let mut child = Command::new(&config.path)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| EngineError::ProcessSpawn {
                path: config.path.clone(),
                source,
            })?;

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(EngineError::ProcessSpawn {
                    path: config.path.clone(),
                    source: io::Error::new(io::ErrorKind::BrokenPipe, "stdio was not captured"),
                });
            }
        };

        let mut engine = Self {
            name,
            config,
            identity: EngineIdentity::default(),
            child,
            stdin: BufWriter::new(stdin),
            lines: spawn_reader(stdout),
            encoder: Encoder {},
            decoder: Decoder::new(),
            exit_status: None,
        };

        // A failed handshake drops `engine`, which tears the process down.
        engine.handshake()?;

        debug!(
            "{} is ready (id name {:?}, author {:?})",
            engine.name, engine.identity.name, engine.identity.author
        );

        Ok(engine)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn identity(&self) -> &EngineIdentity {
        &self.identity
    }

    /// OS process id, stable for the lifetime of this value.
    #[inline]
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    #[inline]
    pub fn exit_status(&self) -> Option<ExitStatus> {
        self.exit_status
    }

    pub fn new_game(&mut self) -> Result<(), EngineError> {
        self.send(&UciInput::UciNewGame)?;
        self.sync()
    }

    /// Sets the position, starts a search bounded by `limit` and waits for the
    /// `bestmove` answer.
    pub fn request_move(
        &mut self,
        position: &dyn fmt::Display,
        limit: &SearchLimit,
    ) -> Result<Move, EngineError> {
        if limit.is_unbounded() {
            warn!("{} asked to search without a limit", self.name);
        }

        self.send(&UciInput::Position {
            fen: Some(position.to_string()),
            moves: Vec::new(),
        })?;
        self.send(&UciInput::Go(limit.clone()))?;

        let margin = self.config.move_timeout.max(MIN_RESPONSE_MARGIN);
        let timeout = limit.implied_duration() + margin;
        let best_move = self.wait_for(Awaiting::BestMove, timeout, |output| match output {
            UciOutput::BestMove { best_move, .. } => Some(best_move),
            _ => None,
        })?;

        best_move
            .parse::<Move>()
            .map_err(|e| EngineError::ProtocolParse {
                engine: self.name.clone(),
                line: format!("bestmove {}", best_move),
                reason: e.to_string(),
            })
    }

    /// Sends `quit`, waits the grace period, then kills and reaps the process.
    /// Calling it again returns the status recorded the first time.
    pub fn stop(&mut self) -> Result<ExitStatus, EngineError> {
        if let Some(status) = self.exit_status {
            return Ok(status);
        }

        let status = self.terminate().map_err(|source| EngineError::Io {
            engine: self.name.clone(),
            source,
        })?;
        debug!("{} stopped: {}", self.name, status);

        self.exit_status = Some(status);
        Ok(status)
    }

    fn handshake(&mut self) -> Result<(), EngineError> {
        self.send(&UciInput::Uci)?;

        let mut identity = EngineIdentity::default();
        let timeout = self.config.handshake_timeout;
        self.wait_for(Awaiting::UciOk, timeout, |output| match output {
            UciOutput::IdName(name) => {
                identity.name = Some(name);
                None
            }
            UciOutput::IdAuthor(author) => {
                identity.author = Some(author);
                None
            }
            UciOutput::UciOk => Some(()),
            _ => None,
        })?;
        self.identity = identity;

        self.sync()
    }

    fn sync(&mut self) -> Result<(), EngineError> {
        self.send(&UciInput::IsReady)?;

        let timeout = self.config.handshake_timeout;
        self.wait_for(Awaiting::ReadyOk, timeout, |output| {
            matches!(output, UciOutput::ReadyOk).then_some(())
        })
    }

    fn send(&mut self, input: &UciInput) -> Result<(), EngineError> {
        let line = self.encoder.encode_input(input);
        debug!("{} << {}", self.name, line);

        writeln!(self.stdin, "{}", line)
            .and_then(|_| self.stdin.flush())
            .map_err(|source| EngineError::Io {
                engine: self.name.clone(),
                source,
            })
    }

    // Reads lines until `accept` returns a value or `timeout` runs out.
    // Only a malformed line that is itself the awaited answer is an error.
    fn wait_for<T>(
        &mut self,
        awaiting: Awaiting,
        timeout: Duration,
        mut accept: impl FnMut(UciOutput) -> Option<T>,
    ) -> Result<T, EngineError> {
        let deadline = Instant::now() + timeout;

        loop {
            let now = Instant::now();
            if now >= deadline {
                return Err(self.timeout_error(awaiting, timeout));
            }

            let line = match self.lines.recv_timeout(deadline - now) {
                Ok(line) => line,
                Err(RecvTimeoutError::Timeout) => {
                    return Err(self.timeout_error(awaiting, timeout));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(EngineError::EngineExited {
                        engine: self.name.clone(),
                        awaiting: awaiting.as_str(),
                    });
                }
            };
            debug!("{} >> {}", self.name, line);

            match self.decoder.decode_output(&line) {
                Ok(output) => {
                    if let Some(value) = accept(output) {
                        return Ok(value);
                    }
                }
                Err(e) if awaiting == Awaiting::BestMove => {
                    return Err(EngineError::ProtocolParse {
                        engine: self.name.clone(),
                        line,
                        reason: e.to_string(),
                    });
                }
                Err(e) => debug!("{}: ignoring {}", self.name, e),
            }
        }
    }

    fn timeout_error(&self, awaiting: Awaiting, waited: Duration) -> EngineError {
        match awaiting {
            Awaiting::UciOk | Awaiting::ReadyOk => EngineError::HandshakeTimeout {
                engine: self.name.clone(),
                awaiting: awaiting.as_str(),
                waited,
            },
            Awaiting::BestMove => EngineError::EngineTimeout {
                engine: self.name.clone(),
                waited,
            },
        }
    }

    fn terminate(&mut self) -> io::Result<ExitStatus> {
        if self.send(&UciInput::Quit).is_ok() {
            let deadline = Instant::now() + self.config.quit_grace;
            loop {
                if let Some(status) = self.child.try_wait()? {
                    return Ok(status);
                }
                if Instant::now() >= deadline {
                    break;
                }
                thread::sleep(EXIT_POLL_INTERVAL);
            }
            debug!("{} ignored quit, killing it", self.name);
        }

        if let Err(e) = self.child.kill() {
            debug!("Killing {} failed: {}", self.name, e);
        }
        self.child.wait()
    }
}

impl Player for EngineProcess {
    fn name(&self) -> &str {
        &self.name
    }

    fn new_game(&mut self) -> Result<(), EngineError> {
        EngineProcess::new_game(self)
    }

    fn request_move(
        &mut self,
        position: &dyn fmt::Display,
        limit: &SearchLimit,
    ) -> Result<Move, EngineError> {
        EngineProcess::request_move(self, position, limit)
    }
}

impl Drop for EngineProcess {
    fn drop(&mut self) {
        if self.exit_status.is_none() {
            if let Err(e) = self.stop() {
                warn!("Could not shut down {}: {}", self.name, e);
            }
        }
    }
}

// Forwards stdout lines into a channel so every read can be bounded by a
// timeout. The thread ends when the process closes its stdout.
fn spawn_reader(stdout: ChildStdout) -> Receiver<String> {
    let (tx, rx) = sync_channel(LINE_BUFFER);

    thread::spawn(move || {
        let mut reader = BufReader::new(stdout);
        let mut buffer = Vec::new();
        loop {
            buffer.clear();
            match reader.read_until(b'\n', &mut buffer) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buffer).trim_end().to_string();
                    if tx.send(line).is_err() {
                        break;
                    }
                }
            }
        }
    });

    rx
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
