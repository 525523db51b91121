use crate::domain::tts::SynthesisError;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::Cursor;
use std::path::Path;

/// Peak level after normalization, in dBFS
pub const TARGET_PEAK_DBFS: f32 = -0.1;

const THRESHOLD_DBFS: f32 = -20.0;
const RATIO: f32 = 4.0;
const ATTACK_MS: f32 = 5.0;
const RELEASE_MS: f32 = 50.0;
/// Files whose peak already sits this close to the target are left alone
const NORMALIZED_TOLERANCE_DB: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NormalizeOutcome {
    Normalized { gain_db: f32 },
    AlreadyNormalized,
    Silent,
}

/// Compress dynamic range, then peak-normalize a WAV file in place
pub fn normalize_wav_in_place(path: &Path) -> Result<NormalizeOutcome, SynthesisError> {
    let (spec, mut samples) = read_samples(path)?;

    let peak = peak_of(&samples);
    if peak <= f32::EPSILON {
        return Ok(NormalizeOutcome::Silent);
    }
    if (to_db(peak) - TARGET_PEAK_DBFS).abs() <= NORMALIZED_TOLERANCE_DB {
        return Ok(NormalizeOutcome::AlreadyNormalized);
    }

    compress(&mut samples, spec.channels as usize, spec.sample_rate as f32);

    let compressed_peak = peak_of(&samples);
    let gain = from_db(TARGET_PEAK_DBFS) / compressed_peak.max(f32::EPSILON);
    for sample in samples.iter_mut() {
        *sample *= gain;
    }

    write_samples(path, spec, &samples)?;

    Ok(NormalizeOutcome::Normalized {
        gain_db: to_db(gain),
    })
}

/// Join WAV chunks that share one format into a single WAV payload
pub fn concat_wav(chunks: &[Vec<u8>]) -> Result<Vec<u8>, SynthesisError> {
    let mut spec: Option<WavSpec> = None;
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer: Option<WavWriter<&mut Cursor<Vec<u8>>>> = None;
        let mut sink = Some(&mut cursor);

        for chunk in chunks {
            let mut reader = WavReader::new(Cursor::new(chunk.as_slice())).map_err(audio_err)?;
            let chunk_spec = reader.spec();

            match spec {
                None => {
                    spec = Some(chunk_spec);
                    if let Some(out) = sink.take() {
                        writer = Some(WavWriter::new(out, chunk_spec).map_err(audio_err)?);
                    }
                }
                Some(existing) if existing != chunk_spec => {
                    return Err(SynthesisError::Audio(
                        "audio chunks use different formats".to_string(),
                    ));
                }
                Some(_) => {}
            }

            let Some(writer) = writer.as_mut() else {
                continue;
            };
            match chunk_spec.sample_format {
                SampleFormat::Float => {
                    for sample in reader.samples::<f32>() {
                        writer.write_sample(sample.map_err(audio_err)?).map_err(audio_err)?;
                    }
                }
                SampleFormat::Int => {
                    for sample in reader.samples::<i32>() {
                        writer.write_sample(sample.map_err(audio_err)?).map_err(audio_err)?;
                    }
                }
            }
        }

        match writer {
            Some(writer) => writer.finalize().map_err(audio_err)?,
            None => return Err(SynthesisError::Audio("no audio chunks to merge".to_string())),
        }
    }

    Ok(cursor.into_inner())
}

/// Feed-forward compressor with a peak envelope follower
fn compress(samples: &mut [f32], channels: usize, sample_rate: f32) {
    let channels = channels.max(1);
    let attack = (-1.0 / (ATTACK_MS / 1000.0 * sample_rate)).exp();
    let release = (-1.0 / (RELEASE_MS / 1000.0 * sample_rate)).exp();
    let mut envelope = 0.0f32;

    for frame in samples.chunks_mut(channels) {
        let level = frame.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
        let coef = if level > envelope { attack } else { release };
        envelope = coef * envelope + (1.0 - coef) * level;

        let envelope_db = to_db(envelope.max(1e-9));
        if envelope_db > THRESHOLD_DBFS {
            let target_db = THRESHOLD_DBFS + (envelope_db - THRESHOLD_DBFS) / RATIO;
            let gain = from_db(target_db - envelope_db);
            for sample in frame.iter_mut() {
                *sample *= gain;
            }
        }
    }
}

fn read_samples(path: &Path) -> Result<(WavSpec, Vec<f32>), SynthesisError> {
    let mut reader = WavReader::open(path).map_err(audio_err)?;
    let spec = reader.spec();

    let samples = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(audio_err)?,
        SampleFormat::Int => {
            let scale = int_scale(spec.bits_per_sample);
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, _>>()
                .map_err(audio_err)?
        }
    };

    Ok((spec, samples))
}

fn write_samples(path: &Path, spec: WavSpec, samples: &[f32]) -> Result<(), SynthesisError> {
    let mut writer = WavWriter::create(path, spec).map_err(audio_err)?;

    match spec.sample_format {
        SampleFormat::Float => {
            for &sample in samples {
                writer.write_sample(sample).map_err(audio_err)?;
            }
        }
        SampleFormat::Int => {
            let scale = int_scale(spec.bits_per_sample);
            for &sample in samples {
                let value = (sample * scale).round().clamp(-scale, scale - 1.0) as i32;
                writer.write_sample(value).map_err(audio_err)?;
            }
        }
    }

    writer.finalize().map_err(audio_err)
}

fn int_scale(bits: u16) -> f32 {
    (1u64 << (bits.clamp(1, 32) - 1)) as f32
}

fn peak_of(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
}

fn to_db(amplitude: f32) -> f32 {
    20.0 * amplitude.log10()
}

fn from_db(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

fn audio_err(e: hound::Error) -> SynthesisError {
    match e {
        hound::Error::IoError(io) => SynthesisError::Io(io),
        other => SynthesisError::Audio(other.to_string()),
    }
}
