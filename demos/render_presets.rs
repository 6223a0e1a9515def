//! Renders every preset's response to a gate pulse into WAV files.
//!
//! Usage: `cargo run --example render_presets [output-dir]`
//!
//! Each file holds the envelope itself (not an audio tone): the gate is held
//! for one second, then released for two.

use anyhow::{Context, Result};
use multistage::{CurveTables, EnvelopeConfig, GateFlags, MultistageEnvelope};
use std::path::PathBuf;
use std::sync::Arc;

const SAMPLE_RATE: u32 = 48000;
const BLOCK_SIZE: usize = 32;

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("multistage"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let presets = [
        ("ad", EnvelopeConfig::ad(0.2, 0.4)),
        ("ar", EnvelopeConfig::ar(0.2, 0.4)),
        ("adr", EnvelopeConfig::adr(0.2, 0.3, 0.5, 0.4)),
        ("adsr", EnvelopeConfig::adsr(0.2, 0.3, 0.5, 0.4)),
        ("adsar", EnvelopeConfig::adsar(0.2, 0.3, 0.5, 0.4)),
        ("adar", EnvelopeConfig::adar(0.2, 0.3, 0.5, 0.4)),
        ("ad_loop", EnvelopeConfig::ad_loop(0.2, 0.3)),
        ("adr_loop", EnvelopeConfig::adr_loop(0.2, 0.3, 0.5, 0.3)),
        ("adar_loop", EnvelopeConfig::adar_loop(0.2, 0.3, 0.5, 0.3)),
    ];

    let tables = Arc::new(CurveTables::new(f64::from(SAMPLE_RATE))?);
    let held = SAMPLE_RATE as usize;
    let total = 3 * SAMPLE_RATE as usize;

    for (name, config) in presets {
        let mut envelope = MultistageEnvelope::new(tables.clone()).with_config(config)?;
        let mut gate = GateFlags::new();

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let path = out_dir.join(format!("{name}.wav"));
        let mut writer = hound::WavWriter::create(&path, spec)
            .with_context(|| format!("creating {}", path.display()))?;

        let mut gates = [false; BLOCK_SIZE];
        let mut flags = [0u8; BLOCK_SIZE];
        let mut out = [0.0; BLOCK_SIZE];
        for block_start in (0..total).step_by(BLOCK_SIZE) {
            for (offset, level) in gates.iter_mut().enumerate() {
                *level = block_start + offset < held;
            }
            gate.process_block(&gates, &mut flags);
            envelope.process_block(&flags, &mut out);
            for sample in out {
                writer.write_sample(sample as f32)?;
            }
        }
        writer.finalize()?;
        println!("wrote {}", path.display());
    }

    Ok(())
}
