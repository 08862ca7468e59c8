//! Integration tests for the voxshift binary.
//!
//! Each test runs the built binary with a private config directory so user
//! presets on the machine running the tests never leak in.

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;
use voxshift_io::{WavSpec, read_wav, write_wav};

/// The `voxshift` binary, configured against `config_home`.
fn voxshift(config_home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_voxshift"));
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env("RUST_LOG", "warn");
    cmd
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn write_tone(path: &Path, sample_rate: u32, seconds: f32) {
    let len = (sample_rate as f32 * seconds) as usize;
    let samples: Vec<f32> = (0..len)
        .map(|i| 0.3 * (std::f32::consts::TAU * 220.0 * i as f32 / sample_rate as f32).sin())
        .collect();
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
    };
    write_wav(path, &samples, spec).expect("write test tone");
}

// ---------------------------------------------------------------------------
// presets
// ---------------------------------------------------------------------------

#[test]
fn presets_lists_factory_voices() {
    let home = TempDir::new().unwrap();
    let output = voxshift(home.path()).arg("presets").output().unwrap();
    assert!(output.status.success());

    let text = stdout(&output);
    for id in [
        "natural", "girl", "woman", "man", "uncle", "demon", "robot", "radio",
    ] {
        assert!(text.contains(id), "listing should contain '{id}'");
    }
    assert!(text.contains("Vintage Radio"));
}

#[test]
fn presets_show_prints_values() {
    let home = TempDir::new().unwrap();
    let output = voxshift(home.path())
        .args(["presets", "show", "demon"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("Underworld"));
    assert!(text.contains("robotFreq"));
    assert!(text.contains("resonance"));
}

#[test]
fn unknown_preset_fails() {
    let home = TempDir::new().unwrap();
    let output = voxshift(home.path())
        .args(["presets", "show", "no-such-voice"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no-such-voice"));
}

#[test]
fn copied_preset_shows_up_in_listing() {
    let home = TempDir::new().unwrap();
    let copy = voxshift(home.path())
        .args(["presets", "copy", "robot", "--name", "My Robot"])
        .output()
        .unwrap();
    assert!(copy.status.success(), "{}", String::from_utf8_lossy(&copy.stderr));

    let list = voxshift(home.path()).arg("presets").output().unwrap();
    let text = stdout(&list);
    assert!(text.contains("User Presets"));
    assert!(text.contains("my_robot"));

    // A second copy under the same name needs --force.
    let again = voxshift(home.path())
        .args(["presets", "copy", "robot", "--name", "My Robot"])
        .output()
        .unwrap();
    assert!(!again.status.success());
}

// ---------------------------------------------------------------------------
// render
// ---------------------------------------------------------------------------

#[test]
fn render_writes_processed_wav() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    let output_path = dir.path().join("out.wav");
    write_tone(&input, 16_000, 1.0);

    let output = voxshift(home.path())
        .arg("render")
        .arg(&input)
        .arg(&output_path)
        .args(["--preset", "radio", "--tail", "0.25"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let (samples, spec) = read_wav(&output_path).unwrap();
    assert_eq!(spec.sample_rate, 16_000);
    assert_eq!(spec.channels, 1);
    assert_eq!(samples.len(), 16_000 + 4_000);
    assert!(samples.iter().all(|s| s.is_finite()));
    assert!(samples.iter().any(|s| s.abs() > 1e-3));
}

#[test]
fn render_missing_input_fails() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    let output = voxshift(home.path())
        .arg("render")
        .arg(dir.path().join("missing.wav"))
        .arg(dir.path().join("out.wav"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(!dir.path().join("out.wav").exists());
}

// ---------------------------------------------------------------------------
// generate-apply
// ---------------------------------------------------------------------------

const RESPONSE: &str = r#"```json
{"pitch": -6, "robotFreq": 40, "distortion": 0.6, "filterFreq": 900,
 "gain": 1.4, "dryWet": 0.8, "bypass": false, "clarity": 0.2, "resonance": 4}
```"#;

#[test]
fn generate_apply_reads_response_file() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    let response = dir.path().join("response.txt");
    std::fs::write(&response, RESPONSE).unwrap();

    let output = voxshift(home.path())
        .arg("generate-apply")
        .arg("--response")
        .arg(&response)
        .args(["--prompt", "grumpy robot", "--save", "Grumpy"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let text = stdout(&output);
    assert!(text.contains("robotFreq"));
    assert!(text.contains("40.00"));

    let show = voxshift(home.path())
        .args(["presets", "show", "grumpy"])
        .output()
        .unwrap();
    assert!(show.status.success());
    assert!(stdout(&show).contains("grumpy robot"));
}

#[test]
fn generate_apply_rejects_malformed_response() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    let response = dir.path().join("response.txt");
    std::fs::write(&response, "I could not think of a voice.").unwrap();

    let output = voxshift(home.path())
        .arg("generate-apply")
        .arg("--response")
        .arg(&response)
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn generate_apply_previews_on_wav() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    let response = dir.path().join("response.txt");
    let input = dir.path().join("in.wav");
    let preview = dir.path().join("preview.wav");
    std::fs::write(&response, RESPONSE).unwrap();
    write_tone(&input, 16_000, 0.5);

    let output = voxshift(home.path())
        .arg("generate-apply")
        .arg("--response")
        .arg(&response)
        .arg("--preview-in")
        .arg(&input)
        .arg("--preview-out")
        .arg(&preview)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    let (samples, _) = read_wav(&preview).unwrap();
    assert_eq!(samples.len(), 8_000 + 8_000);
}
