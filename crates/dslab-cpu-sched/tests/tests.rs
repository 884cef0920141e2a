use std::collections::HashMap;

use rand::prelude::*;
use rand_pcg::Pcg64;
use rstest::rstest;

use dslab_cpu_sched::algorithm::Algorithm;
use dslab_cpu_sched::request::{ProcessSpec, ProcessorSpec, Request};
use dslab_cpu_sched::response::Response;
use dslab_cpu_sched::scheduler::{simulate, Scheduler};
use dslab_cpu_sched::ValidationError;

const EPS: f64 = 1e-9;

fn request(algorithm: Algorithm, processors: usize, processes: &[(&str, u64, u64)]) -> Request {
    Request {
        processes: processes
            .iter()
            .map(|(id, arrival, workload)| ProcessSpec::new(id, *arrival, *workload))
            .collect(),
        processors: (0..processors as u32).map(|id| ProcessorSpec::new(id, 0.5, 3.)).collect(),
        algorithm,
        time_quantum: algorithm.requires_time_quantum().then_some(2),
    }
}

fn gen_request(rng: &mut Pcg64, algorithm: Algorithm) -> Request {
    let num_processes = rng.gen_range(1..25);
    let num_processors = rng.gen_range(1..5);
    Request {
        processes: (0..num_processes)
            .map(|i| ProcessSpec::new(&format!("P{}", i), rng.gen_range(0..30), rng.gen_range(1..12)))
            .collect(),
        processors: (0..num_processors)
            .map(|i| ProcessorSpec::new(i, rng.gen_range(0.0..1.0), rng.gen_range(1.0..4.0)))
            .collect(),
        algorithm,
        time_quantum: Some(rng.gen_range(1..5)),
    }
}

/// Ticks at which each process was bound to a processor, with the processor id.
fn running_ticks(response: &Response) -> HashMap<String, Vec<(u64, u32)>> {
    let mut res: HashMap<String, Vec<(u64, u32)>> = HashMap::new();
    for snapshot in response.snapshots.iter() {
        for pair in snapshot.pairs.iter() {
            res.entry(pair.process.clone())
                .or_default()
                .push((snapshot.tick, pair.processor));
        }
    }
    res
}

fn start_tick(response: &Response, process: &str) -> u64 {
    running_ticks(response)[process][0].0
}

// SCENARIOS ///////////////////////////////////////////////////////////////////////////////////////

#[test]
fn test_spn_shortest_first() {
    let response = simulate(&request(Algorithm::Spn, 1, &[("A", 0, 5), ("B", 0, 3)])).unwrap();
    assert_eq!(start_tick(&response, "B"), 0);
    assert_eq!(start_tick(&response, "A"), 3);

    let b = response.result("B").unwrap();
    assert_eq!(b.finish_time, 3);
    assert_eq!(b.waiting_time, 0);
    let a = response.result("A").unwrap();
    assert_eq!(a.finish_time, 8);
    assert_eq!(a.waiting_time, 3);
    assert_eq!(a.turnaround_time, 8);
    assert_eq!(response.results[0].id, "B");
}

#[test]
fn test_srtn_preemption() {
    let response = simulate(&request(Algorithm::Srtn, 1, &[("A", 0, 5), ("B", 2, 2)])).unwrap();
    let ticks = running_ticks(&response);
    let a_ticks: Vec<u64> = ticks["A"].iter().map(|(t, _)| *t).collect();
    let b_ticks: Vec<u64> = ticks["B"].iter().map(|(t, _)| *t).collect();
    assert_eq!(a_ticks, vec![0, 1, 4, 5, 6]);
    assert_eq!(b_ticks, vec![2, 3]);

    assert_eq!(response.snapshots[2].ready_queue[0].id, "A");
    assert_eq!(response.snapshots[2].ready_queue[0].remaining_workload, 3);

    let b = response.result("B").unwrap();
    assert_eq!(b.finish_time, 4);
    assert_eq!(b.waiting_time, 0);
    let a = response.result("A").unwrap();
    assert_eq!(a.finish_time, 7);
    assert_eq!(a.waiting_time, 2);
}

#[test]
fn test_srtn_equal_remaining_does_not_preempt() {
    let response = simulate(&request(Algorithm::Srtn, 1, &[("A", 0, 4), ("B", 1, 3)])).unwrap();
    let a = response.result("A").unwrap();
    assert_eq!(a.finish_time, 4);
    assert_eq!(a.waiting_time, 0);
    let b = response.result("B").unwrap();
    assert_eq!(b.finish_time, 7);
    assert_eq!(b.waiting_time, 3);
}

#[test]
fn test_fcfs_two_processors() {
    let response = simulate(&request(Algorithm::Fcfs, 2, &[("A", 0, 1), ("B", 0, 1), ("C", 0, 1)])).unwrap();
    let first = &response.snapshots[0];
    assert_eq!(first.pairs.len(), 2);
    assert_eq!((first.pairs[0].process.as_str(), first.pairs[0].processor), ("A", 0));
    assert_eq!((first.pairs[1].process.as_str(), first.pairs[1].processor), ("B", 1));
    assert_eq!(first.ready_queue.len(), 1);
    assert_eq!(first.ready_queue[0].id, "C");

    assert_eq!(start_tick(&response, "C"), 1);
    let c = response.result("C").unwrap();
    assert_eq!(c.waiting_time, 1);
    assert_eq!(c.finish_time, 2);
    let ids: Vec<&str> = response.results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["A", "B", "C"]);
}

#[test]
fn test_round_robin_quantum() {
    let response = simulate(&request(Algorithm::RoundRobin, 1, &[("A", 0, 3), ("B", 0, 2)])).unwrap();
    let ticks = running_ticks(&response);
    let a_ticks: Vec<u64> = ticks["A"].iter().map(|(t, _)| *t).collect();
    assert_eq!(a_ticks, vec![0, 1, 4]);
    let b = response.result("B").unwrap();
    assert_eq!(b.finish_time, 4);
    assert_eq!(b.waiting_time, 2);
    let a = response.result("A").unwrap();
    assert_eq!(a.finish_time, 5);
    assert_eq!(a.waiting_time, 2);
}

#[test]
fn test_round_robin_requeues_at_tail() {
    // A expires at tick 2 while B and C wait, so C runs before A
    let response = simulate(&request(
        Algorithm::RoundRobin,
        1,
        &[("A", 0, 4), ("B", 1, 2), ("C", 1, 2)],
    ))
    .unwrap();
    assert_eq!(start_tick(&response, "B"), 2);
    assert_eq!(start_tick(&response, "C"), 4);
    let a_ticks: Vec<u64> = running_ticks(&response)["A"].iter().map(|(t, _)| *t).collect();
    assert_eq!(a_ticks, vec![0, 1, 6, 7]);
}

#[test]
fn test_hrrn_prefers_long_waiting() {
    let processes = [("A", 0, 10), ("B", 1, 4), ("C", 9, 1)];
    let hrrn = simulate(&request(Algorithm::Hrrn, 1, &processes)).unwrap();
    assert_eq!(start_tick(&hrrn, "B"), 10);
    assert_eq!(start_tick(&hrrn, "C"), 14);
    let spn = simulate(&request(Algorithm::Spn, 1, &processes)).unwrap();
    assert_eq!(start_tick(&spn, "C"), 10);
    assert_eq!(start_tick(&spn, "B"), 11);
}

#[test]
fn test_power_accounting() {
    let response = simulate(&request(Algorithm::Fcfs, 1, &[("A", 0, 2), ("B", 0, 1)])).unwrap();
    let powers: Vec<f64> = response.snapshots.iter().map(|s| s.power()).collect();
    // startup, running, startup after reassignment, idle
    assert_eq!(powers, vec![0.5, 3., 0.5, 0.]);
    let totals: Vec<f64> = response.snapshots.iter().map(|s| s.total_power).collect();
    assert_eq!(totals, vec![0.5, 3.5, 4., 4.]);
    assert_eq!(response.total_power(), 4.);
    assert_eq!(response.summary().total_power, 4.);
}

#[test]
fn test_idle_processors_reported() {
    let response = simulate(&request(Algorithm::Fcfs, 3, &[("A", 0, 2)])).unwrap();
    let first = &response.snapshots[0];
    let ids: Vec<u32> = first.processors.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
    assert_eq!(first.processors[0].power, 0.5);
    assert_eq!(first.processors[1].power, 0.);
    assert_eq!(first.processors[2].power, 0.);
}

#[test]
fn test_late_arrival() {
    let response = simulate(&request(Algorithm::Fcfs, 1, &[("A", 3, 1)])).unwrap();
    assert_eq!(response.snapshots.len(), 5);
    assert!(response.snapshots[..3].iter().all(|s| s.pairs.is_empty()));
    let a = response.result("A").unwrap();
    assert_eq!(a.finish_time, 4);
    assert_eq!(a.turnaround_time, 1);
    assert_eq!(a.normalized_turnaround_time, 1.);
}

#[test]
fn test_no_processes() {
    let response = simulate(&request(Algorithm::Srtn, 2, &[])).unwrap();
    assert!(response.snapshots.is_empty());
    assert!(response.results.is_empty());
}

#[test]
fn test_invalid_request() {
    let mut r = request(Algorithm::RoundRobin, 1, &[("A", 0, 1)]);
    r.time_quantum = None;
    assert_eq!(simulate(&r).err(), Some(ValidationError::MissingTimeQuantum));
    let r = request(Algorithm::Fcfs, 0, &[("A", 0, 1)]);
    assert!(Scheduler::new(&r).is_err());
}

#[test]
fn test_stepping() {
    let mut scheduler = Scheduler::new(&request(Algorithm::Srtn, 1, &[("A", 0, 5), ("B", 2, 2)])).unwrap();
    assert_eq!(scheduler.name(), "SRTN");
    assert_eq!(scheduler.algorithm(), Algorithm::Srtn);
    assert!(scheduler.step());
    assert!(scheduler.step());
    assert_eq!(scheduler.time(), 2);
    let early = scheduler.response().snapshots.clone();
    assert_eq!(early.len(), 2);

    while scheduler.step() {}
    assert!(scheduler.is_finished());
    assert!(!scheduler.step());
    assert_eq!(scheduler.time(), 8);

    let response = scheduler.into_response();
    assert_eq!(response.snapshots[..2], early[..]);
    assert_eq!(response, simulate(&request(Algorithm::Srtn, 1, &[("A", 0, 5), ("B", 2, 2)])).unwrap());
}

#[test]
fn test_request_from_file() {
    let path = std::env::temp_dir().join("dslab-cpu-sched-request.yaml");
    std::fs::write(
        &path,
        "algorithm: SPN\nprocessors:\n  - {id: 0, startup_power: 0.5, running_power: 3}\n\
         processes:\n  - {id: A, arrival_time: 0, workload: 5}\n  - {id: B, arrival_time: 0, workload: 3}\n",
    )
    .unwrap();
    let r = Request::from_file(&path).unwrap();
    assert_eq!(r, request(Algorithm::Spn, 1, &[("A", 0, 5), ("B", 0, 3)]));
    assert!(Request::from_file(path.with_extension("toml")).is_err());
}

#[test]
fn test_save_trace() {
    let response = simulate(&request(Algorithm::RoundRobin, 2, &[("A", 0, 3), ("B", 1, 1)])).unwrap();
    let path = std::env::temp_dir().join("dslab-cpu-sched-trace.json");
    response.save_to_file(&path).unwrap();
    let trace: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(trace["snapshots"].as_array().unwrap().len(), response.snapshots.len());
    assert_eq!(trace["snapshots"][0]["pairs"][0]["process"], "A");
    assert_eq!(trace["snapshots"][0]["processors"][0]["state"], "startup");
    assert_eq!(trace["results"][0]["id"], "B");
}

// PROPERTIES //////////////////////////////////////////////////////////////////////////////////////

#[rstest]
fn test_random_properties(
    #[values(
        Algorithm::Fcfs,
        Algorithm::Spn,
        Algorithm::Srtn,
        Algorithm::RoundRobin,
        Algorithm::Hrrn
    )]
    algorithm: Algorithm,
) {
    let mut rng = Pcg64::seed_from_u64(123);
    for _ in 0..50 {
        let request = gen_request(&mut rng, algorithm);
        let response = simulate(&request).unwrap();

        // every process terminates exactly once
        let mut ids: Vec<&str> = response.results.iter().map(|r| r.id.as_str()).collect();
        ids.sort();
        let mut expected: Vec<&str> = request.processes.iter().map(|p| p.id.as_str()).collect();
        expected.sort();
        assert_eq!(ids, expected);

        // cumulative power is the running sum of per-tick draws
        let mut total = 0.;
        for (i, snapshot) in response.snapshots.iter().enumerate() {
            assert_eq!(snapshot.tick, i as u64);
            total += snapshot.power();
            assert!((snapshot.total_power - total).abs() < EPS);
            if i > 0 {
                assert!(snapshot.total_power >= response.snapshots[i - 1].total_power);
            }
            let processors: Vec<u32> = snapshot.pairs.iter().map(|p| p.processor).collect();
            assert!(processors.windows(2).all(|w| w[0] < w[1]));
        }

        // waiting time counts ticks spent in the ready queue
        let mut waited: HashMap<&str, u64> = HashMap::new();
        for snapshot in response.snapshots.iter() {
            for process in snapshot.ready_queue.iter() {
                *waited.entry(process.id.as_str()).or_default() += 1;
            }
        }
        let ticks = running_ticks(&response);
        for result in response.results.iter() {
            assert_eq!(result.waiting_time, waited.get(result.id.as_str()).copied().unwrap_or(0));
            assert_eq!(ticks[&result.id].len() as u64, result.workload);
            assert_eq!(result.turnaround_time, result.waiting_time + result.workload);
            assert_eq!(result.turnaround_time, result.finish_time - result.arrival_time);
        }

        match algorithm {
            Algorithm::Fcfs | Algorithm::Spn | Algorithm::Hrrn => {
                // no preemption: each process runs on one processor during consecutive ticks
                for runs in ticks.values() {
                    assert!(runs.windows(2).all(|w| w[1].0 == w[0].0 + 1 && w[1].1 == w[0].1));
                }
            }
            Algorithm::Srtn => {
                // no waiting process has strictly less work left than a running one
                for snapshot in response.snapshots.iter() {
                    if let Some(min_ready) = snapshot.ready_queue.iter().map(|p| p.remaining_workload).min() {
                        for pair in snapshot.pairs.iter() {
                            assert!(min_ready >= pair.remaining_workload + 1);
                        }
                    }
                }
            }
            Algorithm::RoundRobin => {
                let quantum = request.time_quantum.unwrap();
                for snapshot in response.snapshots.iter() {
                    assert!(snapshot.pairs.iter().all(|p| p.current_burst <= quantum));
                }
            }
        }
    }
}

#[rstest]
#[case(Algorithm::Fcfs, &["A", "B", "C"])]
#[case(Algorithm::Spn, &["C", "B", "A"])]
#[case(Algorithm::Srtn, &["C", "B", "A"])]
#[case(Algorithm::Hrrn, &["A", "C", "B"])]
fn test_simultaneous_arrival_order(#[case] algorithm: Algorithm, #[case] order: &[&str]) {
    let response = simulate(&request(algorithm, 1, &[("A", 0, 3), ("B", 0, 2), ("C", 0, 1)])).unwrap();
    let ids: Vec<&str> = response.results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, order);
}
