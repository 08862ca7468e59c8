//! Session lifecycle against a recording host.

mod common;

use common::{Event, RecordingHost};
use voxshift_core::{DEFAULT_TIME_CONSTANT, FilterType};
use voxshift_engine::{
    DeviceAcquisitionError, EffectSettings, GeneratorError, JsonSettingsGenerator, MonitorMode,
    ParamName, SessionState, SettingsGenerator, VoiceSession, apply_generated,
};
use voxshift_io::CaptureConstraints;

fn manual_session() -> (std::sync::Arc<RecordingHost>, VoiceSession<RecordingHost>) {
    let host = RecordingHost::new();
    let session = VoiceSession::with_monitor_mode(host.clone(), MonitorMode::Manual).with_seed(1);
    (host, session)
}

#[test]
fn stop_before_initialize_and_twice_is_harmless() {
    let (host, mut session) = manual_session();
    session.stop();
    session.stop();
    assert_eq!(session.state(), SessionState::Uninitialized);
    assert!(host.events().is_empty());
}

#[test]
fn updates_before_initialize_are_ignored() {
    let (host, mut session) = manual_session();
    let plan = session.update_settings(&EffectSettings {
        robot_freq: 50.0,
        ..EffectSettings::default()
    });
    assert!(plan.is_none());
    assert!(session.settings().is_none());
    assert!(host.events().is_empty());
    assert_eq!(session.state(), SessionState::Uninitialized);
}

#[test]
fn initialize_builds_and_starts_the_graph() {
    let (host, mut session) = manual_session();
    session.initialize(Some("Desk Mic")).unwrap();

    assert_eq!(session.state(), SessionState::Active);
    assert_eq!(host.live_nodes(), 21);
    assert_eq!(host.open_captures(), 1);

    let handles = session.handles().unwrap().clone();
    let events = host.events();
    assert!(matches!(
        &events[0],
        Event::Acquire(_, c) if *c == CaptureConstraints::voice(Some("Desk Mic"))
    ));
    assert!(events.contains(&Event::Start(handles.ring_mod_osc)));
    assert!(events.contains(&Event::ConnectParam(
        handles.ring_mod_osc,
        handles.ring_mod_gain,
        ParamName::Gain
    )));
    assert!(events.contains(&Event::Connect(handles.preamp, handles.gate_key)));
    assert!(events.contains(&Event::Connect(handles.echo_feedback, handles.echo_delay)));
    assert!(session.analysis_tap().is_some());
}

#[test]
fn failed_acquisition_leaves_nothing_behind() {
    let (host, mut session) = manual_session();
    host.fail_next_acquire(DeviceAcquisitionError::PermissionDenied("user said no".into()));

    let err = session.initialize(None).unwrap_err();
    assert!(matches!(err, DeviceAcquisitionError::PermissionDenied(_)));
    assert!(!session.is_active());
    assert_eq!(host.live_nodes(), 0);
    assert_eq!(host.open_captures(), 0);
    assert!(session.analysis_tap().is_none());
    session.stop();
}

#[test]
fn failed_reinitialize_closes_the_previous_session() {
    let (host, mut session) = manual_session();
    session.initialize(None).unwrap();
    host.fail_next_acquire(DeviceAcquisitionError::DeviceNotFound("Headset".into()));

    let err = session.initialize(Some("Headset")).unwrap_err();
    assert!(matches!(err, DeviceAcquisitionError::DeviceNotFound(ref d) if d == "Headset"));
    assert!(!session.is_active());
    assert_eq!(host.live_nodes(), 0);
    assert_eq!(host.open_captures(), 0);
}

#[test]
fn second_initialize_replaces_the_first() {
    let (host, mut session) = manual_session();
    session.initialize(None).unwrap();
    let first = session.handles().unwrap().clone();

    session.initialize(None).unwrap();
    let second = session.handles().unwrap().clone();

    for node in first.all_nodes() {
        assert!(!host.is_live(node), "{node:?} survived re-initialize");
    }
    for node in second.all_nodes() {
        assert!(host.is_live(node));
    }
    assert_eq!(host.live_nodes(), 21);
    assert_eq!(host.open_captures(), 1);
    assert_eq!(host.count(|e| matches!(e, Event::Release(_))), 1);
}

#[test]
fn stop_tears_everything_down() {
    let (host, mut session) = manual_session();
    session.initialize(None).unwrap();
    session.stop();

    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(host.live_nodes(), 0);
    assert_eq!(host.open_captures(), 0);
    assert!(session.handles().is_none());

    host.clear_events();
    session.stop();
    assert!(session.update_settings(&EffectSettings::default()).is_none());
    assert!(host.events().is_empty());
}

#[test]
fn dropping_the_session_stops_it() {
    let host = RecordingHost::new();
    {
        let mut session = VoiceSession::with_monitor_mode(host.clone(), MonitorMode::Manual);
        session.initialize(None).unwrap();
    }
    assert_eq!(host.live_nodes(), 0);
    assert_eq!(host.open_captures(), 0);
}

#[test]
fn settings_reach_their_nodes() {
    let (host, mut session) = manual_session();
    session.initialize(None).unwrap();
    let h = session.handles().unwrap().clone();

    session.update_settings(&EffectSettings {
        pitch: -5.0,
        robot_freq: 30.0,
        distortion: 0.4,
        filter_freq: 3000.0,
        gain: 1.2,
        dry_wet: 0.7,
        bypass: false,
        clarity: 0.5,
        resonance: 2.0,
    });

    assert!((host.last_target(h.dry_gain, ParamName::Gain).unwrap() - 0.3).abs() < 1e-6);
    assert_eq!(host.last_target(h.wet_bus, ParamName::Gain), Some(0.7));
    assert_eq!(host.last_target(h.tone_filter, ParamName::Frequency), Some(3000.0));
    assert_eq!(host.last_target(h.tone_filter, ParamName::Q), Some(2.0));
    assert_eq!(host.last_target(h.presence_shelf, ParamName::GainDb), Some(6.0));
    assert_eq!(host.last_target(h.ring_mod_osc, ParamName::Frequency), Some(30.0));
    assert_eq!(host.last_target(h.master_gain, ParamName::Gain), Some(1.2));
    assert!(host.events().contains(&Event::SetFilterType(h.tone_filter, FilterType::Lowpass)));
    assert_eq!(host.count(|e| matches!(e, Event::SetCurve(n, _) if *n == h.shaper)), 1);

    let all_smoothed = host.events().iter().all(|e| match e {
        Event::SetTarget { time_constant, .. } => *time_constant == DEFAULT_TIME_CONSTANT,
        _ => true,
    });
    assert!(all_smoothed);
}

#[test]
fn bypass_only_touches_the_mix() {
    let (host, mut session) = manual_session();
    session.initialize(None).unwrap();
    let h = session.handles().unwrap().clone();
    host.clear_events();

    session.update_settings(&EffectSettings {
        dry_wet: 0.3,
        robot_freq: 80.0,
        ..EffectSettings::default().with_bypass(true)
    });

    assert_eq!(host.last_target(h.dry_gain, ParamName::Gain), Some(1.0));
    assert_eq!(host.last_target(h.wet_bus, ParamName::Gain), Some(0.0));
    assert_eq!(host.events().len(), 2);
}

#[test]
fn last_settings_survive_reinitialize() {
    let (host, mut session) = manual_session();
    session.initialize(None).unwrap();
    let settings = EffectSettings {
        robot_freq: 42.0,
        ..EffectSettings::default()
    };
    session.update_settings(&settings);
    session.stop();

    session.initialize(None).unwrap();
    let h = session.handles().unwrap().clone();
    assert_eq!(host.last_target(h.ring_mod_osc, ParamName::Frequency), Some(42.0));
    assert_eq!(session.settings(), Some(settings));
}

#[test]
fn generated_values_are_not_clamped() {
    let (host, mut session) = manual_session();
    session.initialize(None).unwrap();
    let h = session.handles().unwrap().clone();

    let generator = JsonSettingsGenerator::new(|_: &str| {
        Ok::<_, String>(r#"{"robotFreq": 900, "gain": 5, "dryWet": 1.5, "resonance": 80}"#.into())
    });
    let settings = apply_generated(&mut session, &generator, "very loud robot").unwrap();

    assert_eq!(settings.robot_freq, 900.0);
    assert_eq!(host.last_target(h.ring_mod_osc, ParamName::Frequency), Some(900.0));
    assert_eq!(host.last_target(h.master_gain, ParamName::Gain), Some(5.0));
    assert_eq!(host.last_target(h.wet_bus, ParamName::Gain), Some(1.5));
    assert_eq!(host.last_target(h.dry_gain, ParamName::Gain), Some(-0.5));
    assert_eq!(host.last_target(h.tone_filter, ParamName::Q), Some(80.0));
}

struct Unavailable;

impl SettingsGenerator for Unavailable {
    fn generate(&self, _prompt: &str) -> Result<EffectSettings, GeneratorError> {
        Err(GeneratorError::Request("service unavailable".into()))
    }
}

#[test]
fn generator_failure_applies_nothing() {
    let (host, mut session) = manual_session();
    session.initialize(None).unwrap();
    host.clear_events();

    let err = apply_generated(&mut session, &Unavailable, "anything").unwrap_err();
    assert!(matches!(err, GeneratorError::Request(ref msg) if msg == "service unavailable"));
    assert!(host.events().is_empty());
    assert!(session.settings().is_none());
}
