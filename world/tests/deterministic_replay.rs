use std::time::Duration;

use fortune_wheel_core::{
    Command, Event, Prize, PrizeId, PrizeSet, SelectionModel, SpinRequest, WheelConfig,
};
use fortune_wheel_world::{self as world, query, Wheel};

fn frozen_clock() -> u64 {
    42
}

#[test]
fn seeded_wheels_replay_identically() {
    let script = spin_script(40);
    let first = replay(0xfeed, script.clone());
    let second = replay(0xfeed, script);

    assert_eq!(first, second, "wheel replay diverged");
    assert_eq!(first.winners.len(), 40, "every scripted spin resolves");
}

#[test]
fn different_seeds_draw_different_sequences() {
    let script = spin_script(40);

    let first = replay(1, script.clone());
    let second = replay(2, script);

    assert_ne!(first.winners, second.winners);
}

#[test]
fn replay_honours_scripted_overrides() {
    let mut script = vec![Command::StartSpin {
        prizes: prizes(),
        model: SelectionModel::Weight,
        request: SpinRequest::random(),
    }];
    script.push(Command::OverridePrize {
        prize_id: PrizeId::new(6),
    });
    script.push(Command::Tick {
        dt: Duration::from_millis(250),
    });
    script.push(Command::EndSpin);

    let outcome = replay(9, script);

    assert_eq!(outcome.winners, vec![PrizeId::new(6)]);
    assert!(outcome.resting_angles[0] >= 0.0 && outcome.resting_angles[0] < 360.0);
}

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    winners: Vec<PrizeId>,
    angles: Vec<f64>,
    resting_angles: Vec<f64>,
}

fn replay(seed: u64, commands: Vec<Command>) -> ReplayOutcome {
    let mut wheel = Wheel::with_seed(seed).with_clock(frozen_clock);
    let mut outcome = ReplayOutcome {
        winners: Vec::new(),
        angles: Vec::new(),
        resting_angles: Vec::new(),
    };

    for command in commands {
        let mut events = Vec::new();
        world::apply(&mut wheel, command, &mut events);

        for event in events {
            if let Event::SpinResolved { result } = event {
                outcome.winners.push(result.prize_id());
                outcome.angles.push(result.target_angle_degrees());
                outcome.resting_angles.push(query::resting_angle(&wheel));
            }
        }
    }

    outcome
}

fn spin_script(spins: usize) -> Vec<Command> {
    let mut script = vec![Command::ConfigureWheel {
        config: WheelConfig {
            use_weight: true,
            angle_base: 3.0,
            ..WheelConfig::default()
        },
    }];
    for _ in 0..spins {
        script.push(Command::StartSpin {
            prizes: prizes(),
            model: SelectionModel::Weight,
            request: SpinRequest::random(),
        });
        script.push(Command::Tick {
            dt: Duration::from_millis(16),
        });
        script.push(Command::EndSpin);
    }
    script
}

fn prizes() -> PrizeSet {
    PrizeSet::new(
        (1..=6)
            .map(|id| Prize::new(PrizeId::new(id), id * 10).with_weight(f64::from(id)))
            .collect(),
    )
}
