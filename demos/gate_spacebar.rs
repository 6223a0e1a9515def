//! Interactive multistage envelope demo.
//!
//! Hold SPACE to raise the gate, release it to lower the gate.
//! Keys 1-9 pick a preset, H toggles hard reset, UP/DOWN transpose by a
//! semitone. Press Q or ESC to quit.

mod common;

use anyhow::Result;
use common::{DemoVoice, KeyAction, run_interactive_demo};
use crossterm::{
    ExecutableCommand,
    event::{KeyCode, KeyEvent, KeyEventKind},
};
use multistage::{
    CurveTables, Envelope, EnvelopeConfig, GatedEnvelope, MultistageEnvelope, PitchTables, Signal,
    Stage,
};
use std::f64::consts::TAU;
use std::io::{Write, stdout};
use std::sync::Arc;

const BASE_FREQUENCY: f64 = 220.0;

const PRESETS: [(&str, fn() -> EnvelopeConfig); 9] = [
    ("AD", || EnvelopeConfig::ad(0.2, 0.45)),
    ("AR", || EnvelopeConfig::ar(0.2, 0.45)),
    ("ADR", || EnvelopeConfig::adr(0.2, 0.35, 0.5, 0.45)),
    ("ADSR", || EnvelopeConfig::adsr(0.2, 0.35, 0.5, 0.45)),
    ("ADSAR", || EnvelopeConfig::adsar(0.2, 0.35, 0.5, 0.45)),
    ("ADAR", || EnvelopeConfig::adar(0.2, 0.35, 0.5, 0.45)),
    ("AD loop", || EnvelopeConfig::ad_loop(0.2, 0.3)),
    ("ADR loop", || EnvelopeConfig::adr_loop(0.2, 0.3, 0.5, 0.3)),
    ("ADAR loop", || EnvelopeConfig::adar_loop(0.2, 0.3, 0.5, 0.3)),
];

struct Voice {
    envelope: Option<GatedEnvelope>,
    pitch: PitchTables,
    preset: usize,
    hard_reset: bool,
    transpose: f64,
    sample_rate: f64,
    phase: f64,
}

impl Voice {
    fn new() -> Self {
        Self {
            envelope: None,
            pitch: PitchTables::new(),
            preset: 3,
            hard_reset: false,
            transpose: 0.0,
            sample_rate: 0.0,
            phase: 0.0,
        }
    }

    fn select(&mut self, preset: usize) -> Result<()> {
        self.preset = preset;
        let hard_reset = self.hard_reset;
        if let Some(envelope) = self.envelope.as_mut() {
            envelope.envelope_mut().configure(|config| {
                *config = PRESETS[preset].1();
                config.set_hard_reset(hard_reset);
                Ok(())
            })?;
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode, kind: KeyEventKind) -> Result<()> {
        match (code, kind) {
            (KeyCode::Char(' '), KeyEventKind::Press) => {
                if let Some(envelope) = self.envelope.as_mut()
                    && !envelope.is_gate_high()
                {
                    envelope.trigger(1.0);
                }
            }
            (KeyCode::Char(' '), KeyEventKind::Release) => {
                if let Some(envelope) = self.envelope.as_mut() {
                    envelope.release();
                }
            }
            (KeyCode::Char(c @ '1'..='9'), KeyEventKind::Press) => {
                self.select(c as usize - '1' as usize)?;
            }
            (KeyCode::Char('h'), KeyEventKind::Press) => {
                self.hard_reset = !self.hard_reset;
                self.select(self.preset)?;
            }
            (KeyCode::Up, KeyEventKind::Press) => self.transpose = (self.transpose + 1.0).min(48.0),
            (KeyCode::Down, KeyEventKind::Press) => {
                self.transpose = (self.transpose - 1.0).max(-48.0);
            }
            _ => {}
        }
        Ok(())
    }

    fn stage(&self) -> Option<Stage> {
        self.envelope.as_ref().map(|envelope| envelope.envelope().stage())
    }
}

impl DemoVoice for Voice {
    fn prepare(&mut self, sample_rate: f64) -> Result<()> {
        self.sample_rate = sample_rate;
        let tables = Arc::new(CurveTables::new(sample_rate)?);
        let engine = MultistageEnvelope::new(tables)
            .with_increment_scale(1.0)
            .with_config(PRESETS[self.preset].1())?;
        self.envelope = Some(GatedEnvelope::from_envelope(engine));
        Ok(())
    }

    fn next_sample(&mut self) -> f64 {
        let Some(envelope) = self.envelope.as_mut() else {
            return 0.0;
        };
        let frequency = BASE_FREQUENCY * self.pitch.semitones_to_ratio(self.transpose);
        self.phase = (self.phase + frequency / self.sample_rate).fract();
        (self.phase * TAU).sin() * envelope.next_sample() * 0.3
    }
}

fn draw_ui(voice: &Voice) -> Result<()> {
    let mut stdout = stdout();
    stdout.execute(crossterm::terminal::Clear(
        crossterm::terminal::ClearType::All,
    ))?;
    stdout.execute(crossterm::cursor::MoveTo(0, 0))?;
    write!(
        stdout,
        "Preset: {} | hard reset: {} | transpose: {:+} | stage: {:?}\r\n",
        PRESETS[voice.preset].0,
        voice.hard_reset,
        voice.transpose,
        voice.stage()
    )?;
    write!(
        stdout,
        "HOLD SPACE=gate  1-9=preset  H=hard reset  UP/DOWN=transpose  Q=quit"
    )?;
    stdout.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    run_interactive_demo(
        Voice::new(),
        |voice| {
            let guard = voice
                .lock()
                .map_err(|_| anyhow::anyhow!("voice lock poisoned"))?;
            draw_ui(&guard)
        },
        |voice, key_event: &KeyEvent| {
            if matches!(
                key_event.code,
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc
            ) && key_event.kind == KeyEventKind::Press
            {
                return Ok(KeyAction::Exit);
            }

            let mut guard = voice
                .lock()
                .map_err(|_| anyhow::anyhow!("voice lock poisoned"))?;
            guard.handle_key(key_event.code, key_event.kind)?;
            draw_ui(&guard)?;
            Ok(KeyAction::Continue)
        },
    )?;

    println!("\nGoodbye!");
    Ok(())
}
