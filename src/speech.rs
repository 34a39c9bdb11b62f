use std::collections::HashMap;
use std::io::{Read, Write};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::sentence::Sentence;

/// Placeholder replaced by the sentence text in command arguments
pub const TEXT_PLACEHOLDER: &str = "{text}";

/// Extra wait in `fetch_audio` so a synthesizer can report its own timeout
const SYNTH_GRACE: Duration = Duration::from_millis(250);

/// Turns text into playable audio bytes, giving up after `timeout`
pub trait Synthesizer: Send + Sync {
    fn synthesize(&self, text: &str, timeout: Duration) -> Result<Vec<u8>, SpeechError>;
}

/// Runs an external TTS program and takes its stdout as the audio,
/// e.g. `espeak-ng --stdout {text}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSynthesizer {
    program: String,
    args: Vec<String>,
}

impl CommandSynthesizer {
    /// First element is the program, the rest its arguments
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    fn args_for(&self, text: &str) -> Vec<String> {
        if self.args.iter().any(|a| a.contains(TEXT_PLACEHOLDER)) {
            self.args
                .iter()
                .map(|a| a.replace(TEXT_PLACEHOLDER, text))
                .collect()
        } else {
            let mut args = self.args.clone();
            args.push(text.to_string());
            args
        }
    }

    fn io_error(&self, source: std::io::Error) -> SpeechError {
        SpeechError::Spawn {
            program: self.program.clone(),
            source,
        }
    }

    /// Kill and reap the program. Only the direct child is signalled, so
    /// wrapper scripts should `exec` the real synthesizer.
    fn abandon(&self, child: &mut Child) {
        if let Err(e) = child.kill() {
            debug!(program = %self.program, "kill failed: {e}");
        }
        let _ = child.wait();
    }
}

impl Synthesizer for CommandSynthesizer {
    fn synthesize(&self, text: &str, timeout: Duration) -> Result<Vec<u8>, SpeechError> {
        let mut child = Command::new(&self.program)
            .args(self.args_for(text))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| self.io_error(e))?;

        let Some(mut stdout) = child.stdout.take() else {
            self.abandon(&mut child);
            return Err(SpeechError::Empty {
                program: self.program.clone(),
            });
        };
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut audio = Vec::new();
            let _ = tx.send(stdout.read_to_end(&mut audio).map(|_| audio));
        });

        let audio = match rx.recv_timeout(timeout) {
            Ok(Ok(audio)) => audio,
            Ok(Err(e)) => {
                self.abandon(&mut child);
                return Err(self.io_error(e));
            }
            Err(_) => {
                self.abandon(&mut child);
                return Err(SpeechError::Timeout(timeout));
            }
        };

        let status = child.wait().map_err(|e| self.io_error(e))?;
        if !status.success() {
            return Err(SpeechError::Failed {
                program: self.program.clone(),
                status: status.to_string(),
            });
        }
        if audio.is_empty() {
            return Err(SpeechError::Empty {
                program: self.program.clone(),
            });
        }
        Ok(audio)
    }
}

/// Synthesize on a worker thread, waiting at most about `timeout`. Any
/// failure means no audio; the caller carries on without it.
pub fn fetch_audio(synth: Arc<dyn Synthesizer>, text: &str, timeout: Duration) -> Option<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    let text = text.to_string();
    thread::spawn(move || {
        let _ = tx.send(synth.synthesize(&text, timeout));
    });

    match rx.recv_timeout(timeout + SYNTH_GRACE) {
        Ok(Ok(audio)) => {
            debug!(bytes = audio.len(), "speech synthesized");
            Some(audio)
        }
        Ok(Err(e)) => {
            warn!("speech unavailable: {e}");
            None
        }
        Err(RecvTimeoutError::Timeout) => {
            warn!("speech unavailable: {}", SpeechError::Timeout(timeout));
            None
        }
        Err(RecvTimeoutError::Disconnected) => {
            warn!("speech worker exited without a result");
            None
        }
    }
}

/// Audio per sentence text. Misses are remembered too, so a broken
/// synthesizer is tried once per sentence rather than on every request.
#[derive(Debug, Default)]
pub struct AudioCache {
    entries: HashMap<String, Option<Vec<u8>>>,
}

impl AudioCache {
    pub fn get_or_fetch(
        &mut self,
        synth: &Arc<dyn Synthesizer>,
        text: &str,
        timeout: Duration,
    ) -> Option<&[u8]> {
        self.entries
            .entry(text.to_string())
            .or_insert_with(|| fetch_audio(Arc::clone(synth), text, timeout))
            .as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Feeds audio bytes to an external player on stdin, e.g. `aplay -q` or
/// `ffplay -nodisp -autoexit -`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    program: String,
    args: Vec<String>,
}

impl Player {
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    /// Plays in the background; the handle reports how it went.
    pub fn play(&self, audio: Vec<u8>) -> JoinHandle<Result<(), SpeechError>> {
        let player = self.clone();
        thread::spawn(move || {
            let result = player.run(&audio);
            if let Err(ref e) = result {
                warn!("playback failed: {e}");
            }
            result
        })
    }

    fn run(&self, audio: &[u8]) -> Result<(), SpeechError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| SpeechError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // A player that exits early closes the pipe; its exit status tells the story
            let _ = stdin.write_all(audio);
        }

        let status = child.wait().map_err(|source| SpeechError::Spawn {
            program: self.program.clone(),
            source,
        })?;
        if status.success() {
            Ok(())
        } else {
            Err(SpeechError::Failed {
                program: self.program.clone(),
                status: status.to_string(),
            })
        }
    }
}

/// How a request to hear a sentence ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechOutcome {
    /// Audio handed to the player
    Playing,
    Unavailable,
    NoPlayer,
}

struct Voice {
    synth: Arc<dyn Synthesizer>,
    player: Option<Player>,
    cache: Mutex<AudioCache>,
    timeout: Duration,
}

impl Voice {
    fn audio_for(&self, sentence: &Sentence) -> Option<Vec<u8>> {
        if let Some(audio) = &sentence.audio {
            return Some(audio.clone());
        }
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache
            .get_or_fetch(&self.synth, &sentence.text, self.timeout)
            .map(<[u8]>::to_vec)
    }

    fn speak(&self, sentence: &Sentence) -> SpeechOutcome {
        let Some(audio) = self.audio_for(sentence) else {
            return SpeechOutcome::Unavailable;
        };
        match &self.player {
            Some(player) => {
                player.play(audio);
                SpeechOutcome::Playing
            }
            None => {
                warn!("audio ready but no player command configured");
                SpeechOutcome::NoPlayer
            }
        }
    }
}

/// Everything needed to read a sentence aloud. Requests run off the
/// caller's thread; outcomes are collected with `poll`.
pub struct Speech {
    voice: Arc<Voice>,
    tx: Sender<SpeechOutcome>,
    rx: Receiver<SpeechOutcome>,
}

impl Speech {
    pub fn new(synth: Arc<dyn Synthesizer>, player: Option<Player>, timeout: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            voice: Arc::new(Voice {
                synth,
                player,
                cache: Mutex::new(AudioCache::default()),
                timeout,
            }),
            tx,
            rx,
        }
    }

    /// `None` when no synthesizer command is configured
    pub fn from_config(config: &SpeechConfig) -> Option<Self> {
        let synth = CommandSynthesizer::from_command(&config.synth_command)?;
        Some(Self::new(
            Arc::new(synth),
            Player::from_command(&config.player_command),
            Duration::from_millis(config.timeout_ms),
        ))
    }

    /// Audio for a sentence: what it already carries, else synthesized.
    /// Blocks for up to the synthesis timeout.
    pub fn audio_for(&self, sentence: &Sentence) -> Option<Vec<u8>> {
        self.voice.audio_for(sentence)
    }

    /// Fetch and play in the background
    pub fn speak(&self, sentence: &Sentence) {
        let voice = Arc::clone(&self.voice);
        let sentence = sentence.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let _ = tx.send(voice.speak(&sentence));
        });
    }

    /// The next finished request, if any
    pub fn poll(&self) -> Option<SpeechOutcome> {
        self.rx.try_recv().ok()
    }
}
