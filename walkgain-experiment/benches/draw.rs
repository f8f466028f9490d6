use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use walkgain_core::{ParticipantId, TrialEnd};
use walkgain_experiment::{StudyConfig, StudySession};
use walkgain_log::MemorySink;

fn full_main_block(c: &mut Criterion) {
    let config = StudyConfig::default();
    let pid = ParticipantId::parse("001", 3).unwrap();

    c.bench_function("draw_full_main_block", |b| {
        b.iter(|| {
            let mut session = StudySession::open(
                config.clone(),
                pid.clone(),
                StdRng::seed_from_u64(5),
                MemorySink::new(),
            )
            .unwrap();
            while session.trials_remain() {
                let setup = session.begin_trial().unwrap();
                black_box(setup.acceleration);
                session.state_mut().set_reported_time(1.0);
                session.mark_trial_finished(TrialEnd::Distance);
                session.advance_phase().unwrap();
            }
        })
    });
}

criterion_group!(benches, full_main_block);
criterion_main!(benches);
