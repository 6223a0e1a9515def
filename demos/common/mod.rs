//! Shared plumbing for the interactive demos.

use anyhow::Result;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, StreamConfig};
use crossterm::{
    ExecutableCommand,
    event::{
        self, Event, KeyEvent, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use std::io::stdout;
use std::panic;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Audio source rendered by the output stream.
pub trait DemoVoice: Send + 'static {
    /// Called once before the stream starts with the device's sample rate.
    fn prepare(&mut self, sample_rate: f64) -> Result<()>;

    fn next_sample(&mut self) -> f64;
}

/// Whether the event loop should keep running.
pub enum KeyAction {
    Continue,
    Exit,
}

/// Runs `voice` on the default output device while feeding key presses and
/// releases to `key_handler`.
///
/// Keyboard enhancements are always requested so that key release events
/// arrive; terminals without them only report presses.
pub fn run_interactive_demo<V, F, K>(voice: V, initial_ui: F, key_handler: K) -> Result<()>
where
    V: DemoVoice,
    F: FnOnce(&Arc<Mutex<V>>) -> Result<()>,
    K: Fn(&Arc<Mutex<V>>, &KeyEvent) -> Result<KeyAction>,
{
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow::anyhow!("No output device available"))?;
    let config = device.default_output_config()?;

    let mut voice = voice;
    voice.prepare(f64::from(config.sample_rate().0))?;
    let voice = Arc::new(Mutex::new(voice));

    let _stream = match config.sample_format() {
        SampleFormat::F32 => build_stream::<f32, V>(&device, &config.into(), voice.clone())?,
        SampleFormat::I16 => build_stream::<i16, V>(&device, &config.into(), voice.clone())?,
        SampleFormat::U16 => build_stream::<u16, V>(&device, &config.into(), voice.clone())?,
        sample_format => {
            return Err(anyhow::anyhow!(
                "Unsupported sample format: {}",
                sample_format
            ));
        }
    };

    // Keyboard enhancements must be pushed before entering the alternate screen
    stdout().execute(PushKeyboardEnhancementFlags(
        KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
    ))?;
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(crossterm::cursor::Hide)?;

    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        original_hook(panic_info);
    }));

    initial_ui(&voice)?;

    loop {
        if event::poll(Duration::from_millis(20))?
            && let Event::Key(key_event) = event::read()?
        {
            match key_handler(&voice, &key_event)? {
                KeyAction::Continue => {}
                KeyAction::Exit => break,
            }
        }
    }

    restore_terminal();
    Ok(())
}

fn build_stream<T, V>(
    device: &cpal::Device,
    config: &StreamConfig,
    voice: Arc<Mutex<V>>,
) -> Result<cpal::Stream>
where
    T: Sample + FromSample<f64> + cpal::SizedSample,
    V: DemoVoice,
{
    let channels = config.channels as usize;

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let Ok(mut voice) = voice.lock() else {
                return;
            };
            for frame in data.chunks_mut(channels) {
                let value: T = T::from_sample(voice.next_sample());
                frame.fill(value);
            }
        },
        |err| eprintln!("Audio stream error: {}", err),
        None,
    )?;

    stream.play()?;
    Ok(stream)
}

fn restore_terminal() {
    let _ = stdout().execute(PopKeyboardEnhancementFlags);
    let _ = stdout().execute(crossterm::cursor::Show);
    let _ = stdout().execute(LeaveAlternateScreen);
    let _ = disable_raw_mode();
}
