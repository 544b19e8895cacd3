// Session aggregation rules: total duration, combined status, and the
// start-time-ordered transcript text.

use chrono::{Duration, Utc};
use std::path::PathBuf;
use uuid::Uuid;

use segscribe::{RecordingSession, Segment, SessionStatus, Transcription, TranscriptionStatus};

fn segment(session: &RecordingSession, offset_secs: i64, duration: f64) -> Segment {
    Segment {
        id: Uuid::new_v4(),
        session_id: session.id,
        start_time: session.started_at + Duration::seconds(offset_secs),
        duration_secs: duration,
        audio_path: PathBuf::from("/tmp/a.wav"),
        transcription: None,
    }
}

fn completed(text: &str) -> Option<Transcription> {
    Some(Transcription::completed(text.to_string()))
}

fn failed() -> Option<Transcription> {
    let mut t = Transcription::pending();
    t.status = TranscriptionStatus::Failed;
    Some(t)
}

#[test]
fn total_duration_sums_segment_durations() {
    let mut session = RecordingSession::new();
    session.segments.push(segment(&session, 0, 30.0));
    session.segments.push(segment(&session, 30, 25.5));

    assert!((session.total_duration() - 55.5).abs() < f64::EPSILON);
}

#[test]
fn empty_session_is_in_progress() {
    let session = RecordingSession::new();
    assert_eq!(session.transcription_status(), SessionStatus::InProgress);
    assert_eq!(session.full_transcription_text(), "");
}

#[test]
fn any_failed_segment_fails_the_session() {
    let mut session = RecordingSession::new();
    let mut a = segment(&session, 0, 30.0);
    a.transcription = completed("Hello");
    let mut b = segment(&session, 30, 30.0);
    b.transcription = failed();
    session.segments.extend([a, b]);

    assert_eq!(session.transcription_status(), SessionStatus::Failed);
    assert_eq!(session.full_transcription_text(), "Hello");
    assert!((session.total_duration() - 60.0).abs() < f64::EPSILON);
}

#[test]
fn all_completed_session_is_completed() {
    let mut session = RecordingSession::new();
    let mut a = segment(&session, 0, 30.0);
    a.transcription = completed("Hello");
    let mut b = segment(&session, 30, 30.0);
    b.transcription = completed("world");
    session.segments.extend([a, b]);

    assert_eq!(session.transcription_status(), SessionStatus::Completed);
}

#[test]
fn pending_segment_keeps_session_in_progress() {
    let mut session = RecordingSession::new();
    let mut a = segment(&session, 0, 30.0);
    a.transcription = completed("Hello");
    let b = segment(&session, 30, 30.0); // no transcription record -> pending
    session.segments.extend([a, b]);

    assert_eq!(session.transcription_status(), SessionStatus::InProgress);
}

#[test]
fn transcript_text_is_ordered_by_start_time_not_completion_order() {
    let mut session = RecordingSession::new();
    let mut later = segment(&session, 1, 30.0);
    later.transcription = completed("world");
    let mut earlier = segment(&session, 0, 30.0);
    earlier.transcription = completed("Hello");

    // Inserted in reverse chronological order.
    session.segments.extend([later, earlier]);

    assert_eq!(session.full_transcription_text(), "Hello world");
}

#[test]
fn pending_segments_contribute_no_text() {
    let mut session = RecordingSession::new();
    let mut a = segment(&session, 0, 30.0);
    a.transcription = completed("Hello");
    let mut b = segment(&session, 30, 30.0);
    b.transcription = Some(Transcription::pending());
    session.segments.extend([a, b]);

    assert_eq!(session.full_transcription_text(), "Hello");
}

#[test]
fn zero_duration_segment_is_counted_without_panic() {
    let mut session = RecordingSession::new();
    session.started_at = Utc::now();
    let mut a = segment(&session, 0, 30.0);
    a.transcription = completed("Hello");
    let z = segment(&session, 30, 0.0);
    session.segments.extend([a, z]);

    assert!((session.total_duration() - 30.0).abs() < f64::EPSILON);
    assert_eq!(session.transcription_status(), SessionStatus::InProgress);
}
