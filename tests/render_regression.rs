use std::io::Cursor;
use std::sync::{Arc, Mutex};

use cosynth::engine::{from_fn, Command, Program, RunState, Scheduler, SchedulerError, TaskEvent};
use cosynth::io::wav::write_wav_to;
use cosynth::sequencing::{beat_seconds, random_walk, Scale};
use cosynth::synth::{Melody, PlayNote};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn constant(value: f32, samples: usize) -> impl Program {
    let mut left = samples;
    from_fn(move |_, _| {
        if left == 0 {
            return None;
        }
        left -= 1;
        Some(Command::Emit(value))
    })
}

#[test]
fn constant_tone_then_drained() {
    let mut scheduler = Scheduler::with_sample_rate(44_100);
    scheduler.spawn(constant(0.5, 100));

    let frames: Vec<f32> = scheduler.frames().collect::<Result<_, _>>().unwrap();
    assert_eq!(frames, vec![0.5; 100]);
    assert_eq!(scheduler.state(), RunState::Drained);
    assert_eq!(scheduler.clock(), 100);
    assert_eq!(scheduler.tick(), Ok(None));
}

#[test]
fn two_voices_mix_then_drain() {
    let mut scheduler = Scheduler::with_sample_rate(44_100);
    scheduler.spawn(constant(0.3, 50));
    scheduler.spawn(constant(0.3, 50));

    let frames: Vec<f32> = scheduler.frames().collect::<Result<_, _>>().unwrap();
    assert_eq!(frames, vec![0.6; 50]);
    assert_eq!(scheduler.state(), RunState::Drained);
}

#[test]
fn earlier_deadline_wakes_first_and_ties_keep_order() {
    let woke = Arc::new(Mutex::new(Vec::new()));
    let mut scheduler = Scheduler::with_sample_rate(1_000);

    let mut spawn_sleeper = |name: &'static str, seconds: f64, value: f32| {
        let woke = woke.clone();
        let mut step = 0;
        scheduler.spawn(from_fn(move |_, _| {
            step += 1;
            match step {
                1 => Some(Command::Wait(seconds)),
                2 => {
                    woke.lock().unwrap().push(name);
                    Some(Command::Emit(value))
                }
                _ => None,
            }
        }))
    };
    let a = spawn_sleeper("a", 0.003, 1.0);
    let b = spawn_sleeper("b", 0.001, 0.25);
    let c = spawn_sleeper("c", 0.001, 0.5);

    assert_eq!(scheduler.tick(), Ok(Some(0.0)));
    assert_eq!(scheduler.waiting(), vec![(1, b), (1, c), (3, a)]);

    let rest: Vec<f32> = scheduler.frames().collect::<Result<_, _>>().unwrap();
    assert_eq!(rest, vec![0.75, 0.0, 1.0]);
    assert_eq!(*woke.lock().unwrap(), vec!["b", "c", "a"]);
}

#[test]
fn zero_wait_resumes_on_the_next_tick() {
    let mut scheduler = Scheduler::with_sample_rate(48_000);
    let mut step = 0;
    scheduler.spawn(from_fn(move |_, _| {
        step += 1;
        match step {
            1 => Some(Command::Wait(0.0)),
            2 => Some(Command::Emit(0.5)),
            _ => None,
        }
    }));

    let frames: Vec<f32> = scheduler.frames().collect::<Result<_, _>>().unwrap();
    assert_eq!(frames, vec![0.0, 0.5]);
}

#[test]
fn events_arrive_once_at_the_next_resume() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut scheduler = Scheduler::with_sample_rate(1_000);
    let log = seen.clone();
    let listener = scheduler.spawn(from_fn(move |resume, _| {
        log.lock().unwrap().push(resume.events().to_vec());
        if resume.events().contains(&TaskEvent::NoteOff) {
            None
        } else {
            Some(Command::Emit(0.1))
        }
    }));

    // Posted before the task ever ran: held until the resume after start.
    assert!(scheduler.post_event(listener, TaskEvent::Gain { level: 0.5 }));
    scheduler.tick().unwrap();
    scheduler.tick().unwrap();
    scheduler.tick().unwrap();

    scheduler.post_event(listener, TaskEvent::PitchBend { cents: 100.0 });
    scheduler.post_event(listener, TaskEvent::NoteOff);
    assert_eq!(scheduler.tick(), Ok(None));
    assert!(!scheduler.post_event(listener, TaskEvent::NoteOff));

    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            vec![],
            vec![TaskEvent::Gain { level: 0.5 }],
            vec![],
            vec![TaskEvent::PitchBend { cents: 100.0 }, TaskEvent::NoteOff],
        ]
    );
}

#[test]
fn seeded_walk_renders_identically() {
    fn render(seed: u64) -> Vec<u8> {
        let ladder = Scale::Major.ladder(1, -9, 2);
        let notes = random_walk(&mut StdRng::seed_from_u64(seed), &ladder, 6, beat_seconds(600.0));
        let mut scheduler = Scheduler::with_sample_rate(8_000);
        scheduler.spawn(Melody::new(notes));

        let mut buf = Cursor::new(Vec::new());
        write_wav_to(&mut buf, scheduler.frames(), 8_000).unwrap();
        buf.into_inner()
    }

    let first = render(42);
    assert_eq!(first, render(42));
    assert!(first.len() > 44, "no audio rendered");
}

#[test]
fn note_sounds_then_releases_to_silence() {
    let mut scheduler = Scheduler::with_sample_rate(8_000);
    scheduler.spawn(PlayNote::new(220.0, 0.01));

    let frames: Vec<f32> = scheduler.frames().collect::<Result<_, _>>().unwrap();
    // 80 held samples plus the 4000-sample release, give or take the
    // tick the note-off takes to land.
    assert!(frames.len() > 4_000 && frames.len() < 4_200, "{} frames", frames.len());
    assert!(frames.iter().all(|s| s.abs() <= 5.0 * 0.06 + 1e-6));
    assert!(frames.iter().any(|s| s.abs() > 0.01));
    assert_eq!(scheduler.live_tasks(), 0);
}

#[test]
fn negative_wait_aborts_the_run() {
    let mut scheduler = Scheduler::with_sample_rate(1_000);
    scheduler.spawn(constant(0.2, 1_000));
    let bad = scheduler.spawn(from_fn(|_, _| Some(Command::Wait(-1.0))));

    let err = scheduler.tick().unwrap_err();
    assert!(matches!(err, SchedulerError::ProtocolViolation { task, .. } if task == bad));
    assert_eq!(scheduler.state(), RunState::Aborted);
    assert_eq!(scheduler.live_tasks(), 0);
    assert_eq!(scheduler.tick(), Ok(None));
}

#[test]
fn spawning_after_drain_starts_a_fresh_run() {
    let mut scheduler = Scheduler::with_sample_rate(1_000);
    scheduler.spawn(constant(0.1, 3));
    assert_eq!(scheduler.frames().count(), 3);

    scheduler.spawn(constant(0.2, 2));
    assert_eq!(scheduler.state(), RunState::Idle);
    assert_eq!(scheduler.clock(), 0);
    let frames: Vec<f32> = scheduler.frames().collect::<Result<_, _>>().unwrap();
    assert_eq!(frames, vec![0.2, 0.2]);
}
