// SPDX-FileCopyrightText: 2025 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use gpiommio::am62::{BANK23, GPIO0_42};
use gpiommio::sim::{SimClock, SimulatedBank};
use gpiommio::{
    rt, Level, MemBlock, MonotonicClock, OutputPin, Period, RegisterBlock, StopToken, Timestamp,
    Toggler, Transition, DEFAULT_HALF_PERIOD,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const NANOS_PER_SEC: i128 = 1_000_000_000;

#[test]
fn advance_carries_nanoseconds() {
    let mut p = Period::new(Timestamp::new(10, 800_000_000), Duration::from_millis(500)).unwrap();
    let next = p.advance();
    assert_eq!(next.sec(), 11);
    assert_eq!(next.nsec(), 300_000_000);
}

#[test]
fn advance_stays_normalised() {
    let starts = [0, 1, 250_000_000, 499_999_999, 500_000_000, 999_999_998, 999_999_999];
    let periods = [
        Duration::from_nanos(1),
        Duration::from_micros(333),
        Duration::from_millis(500),
        Duration::from_nanos(999_999_999),
        Duration::from_secs(1),
        Duration::new(1, 1),
        Duration::new(3, 700_000_000),
    ];
    for start in starts {
        for period in periods {
            let origin = Timestamp::new(100, start);
            let mut p = Period::new(origin, period).unwrap();
            let mut prev = origin;
            for n in 1..=50i128 {
                let next = p.advance();
                assert!(next.nsec() < 1_000_000_000);
                assert!(next > prev);
                // seconds reflect every carry
                let expected = origin.as_nanos() + n * period.as_nanos() as i128;
                assert_eq!(next.sec() as i128, expected / NANOS_PER_SEC);
                assert_eq!(next.nsec() as i128, expected % NANOS_PER_SEC);
                prev = next;
            }
        }
    }
}

#[test]
fn deadlines_do_not_drift() {
    let works = [
        Duration::ZERO,
        Duration::from_micros(10),
        Duration::from_millis(120),
        Duration::from_millis(499),
        // longer than the period - every deadline is overrun
        Duration::from_millis(1200),
    ];
    for work in works {
        let mut clock = SimClock::starting_at(Timestamp::new(7, 900_000_000)).with_work(work);
        let pin = OutputPin::new(MemBlock::new(), BANK23, GPIO0_42);
        let mut t = Toggler::new(pin, &mut clock, DEFAULT_HALF_PERIOD).unwrap();
        t.run_cycles(20).unwrap();
        drop(t);

        let deadlines = clock.deadlines();
        assert_eq!(deadlines.len(), 40);
        assert_eq!(deadlines[0], Timestamp::new(8, 400_000_000));
        for pair in deadlines.windows(2) {
            assert!(pair[1] > pair[0]);
            assert_eq!(
                pair[1].duration_since(&pair[0]),
                Some(DEFAULT_HALF_PERIOD),
                "work {:?}",
                work
            );
        }
    }
}

#[test]
fn overrun_is_reported() {
    let mut clock = SimClock::new().with_work(Duration::from_millis(600));
    let pin = OutputPin::new(MemBlock::new(), BANK23, GPIO0_42);
    Toggler::new(pin, &mut clock, DEFAULT_HALF_PERIOD)
        .unwrap()
        .run_cycles(2)
        .unwrap();
    assert_eq!(clock.overruns(), 4);
}

#[test]
fn alternates_levels() {
    let regs = SimulatedBank::new();
    regs.write(BANK23.dir, 0xffff_ffff);
    let pin = OutputPin::new(&regs, BANK23, GPIO0_42);
    let dir = regs.read(BANK23.dir);
    assert_eq!(dir, 0xffff_fbff);

    let mut t = Toggler::new(pin, SimClock::new(), DEFAULT_HALF_PERIOD).unwrap();
    t.run_cycles(5).unwrap();

    let levels = regs.levels(BANK23, GPIO0_42);
    assert_eq!(levels.len(), 10);
    for (i, level) in levels.iter().enumerate() {
        let expected = if i % 2 == 0 { Level::High } else { Level::Low };
        assert_eq!(*level, expected);
    }
    // toggling leaves the direction alone
    assert_eq!(regs.read(BANK23.dir), dir);
    assert_eq!(regs.read(BANK23.out_data), 0);
}

#[test]
fn observer_sees_each_transition() {
    let seen = Arc::new(Mutex::new(Vec::<Transition>::new()));
    let sink = seen.clone();
    let mut clock = SimClock::starting_at(Timestamp::new(1, 0));
    let pin = OutputPin::new(SimulatedBank::new(), BANK23, GPIO0_42);
    Toggler::new(pin, &mut clock, Duration::from_millis(250))
        .unwrap()
        .on_transition(move |t| sink.lock().unwrap().push(*t))
        .run_cycles(2)
        .unwrap();

    let seen = seen.lock().unwrap();
    let levels: Vec<Level> = seen.iter().map(|t| t.level).collect();
    assert_eq!(levels, [Level::High, Level::Low, Level::High, Level::Low]);
    let deadlines: Vec<Timestamp> = seen.iter().map(|t| t.deadline).collect();
    assert_eq!(deadlines, clock.deadlines());
    assert_eq!(deadlines[3], Timestamp::new(2, 0));
    // each transition is scheduled at the previous deadline
    assert_eq!(seen[0].at, Timestamp::new(1, 0));
    for pair in seen.windows(2) {
        assert_eq!(pair[1].at, pair[0].deadline);
    }
}

#[test]
fn stop_from_another_thread() {
    let regs = Arc::new(SimulatedBank::new());
    let pin = OutputPin::new(regs.clone(), BANK23, GPIO0_42);
    let stop = StopToken::new();
    let mut t = Toggler::new(pin, MonotonicClock, Duration::from_millis(1))
        .unwrap()
        .with_stop_token(stop.clone());

    let h = std::thread::spawn(move || {
        let res = t.run();
        (res, t.state())
    });
    std::thread::sleep(Duration::from_millis(30));
    stop.stop();
    let (res, state) = h.join().unwrap();

    res.unwrap();
    assert_eq!(state, Some(Level::Low));
    assert_eq!(regs.read(BANK23.out_data) & GPIO0_42.mask(), 0);
    assert!(regs.levels(BANK23, GPIO0_42).len() >= 2);
}

#[test]
fn stopped_mid_cycle_leaves_line_low() {
    let regs = SimulatedBank::new();
    let pin = OutputPin::new(&regs, BANK23, GPIO0_42);
    let stop = StopToken::new();
    let trip = stop.clone();
    // stop after the line is first driven high
    Toggler::new(pin, SimClock::new(), DEFAULT_HALF_PERIOD)
        .unwrap()
        .with_stop_token(stop)
        .on_transition(move |_| trip.stop())
        .run()
        .unwrap();
    assert_eq!(regs.levels(BANK23, GPIO0_42), [Level::High, Level::Low]);
}

#[test]
fn toggle_on_worker() {
    let regs = Arc::new(SimulatedBank::new());
    let pin = OutputPin::new(regs.clone(), BANK23, GPIO0_42);
    let mut t = Toggler::new(pin, SimClock::new(), DEFAULT_HALF_PERIOD).unwrap();
    // explicit SCHED_OTHER is available to unprivileged processes
    let config = rt::RtConfig {
        policy: rt::SchedPolicy::Other,
        priority: 0,
        ..Default::default()
    };
    let worker = rt::spawn(&config, move || t.run_cycles(3)).unwrap();
    worker.join().unwrap().unwrap();
    assert_eq!(regs.levels(BANK23, GPIO0_42).len(), 6);
}

#[test]
fn set_and_clear_registers_are_independent() {
    let regs = MemBlock::new();
    regs.configure_as_output(BANK23.dir, GPIO0_42);
    assert_eq!(regs.read(BANK23.dir), 0);
    regs.set_bit(BANK23.set_data, GPIO0_42);
    assert_eq!(regs.read(BANK23.set_data), 0x0000_0400);
    regs.set_bit(BANK23.clr_data, GPIO0_42);
    assert_eq!(regs.read(BANK23.set_data), 0x0000_0400);
    assert_eq!(regs.read(BANK23.clr_data), 0x0000_0400);
}
