use crate::{
    cube::CubeState,
    engine::{Solution, SolverEngine},
    facelet::{self, NUM_FACELETS},
    singmaster,
    solver::SolveError,
    start, success,
};
use crossbeam::channel;
use log::{debug, info, warn};
use std::collections::BTreeMap;

/// Read a cube as either a facelet string or Singmaster cubie notation,
/// whichever `input` looks like.
///
/// # Errors
///
/// Fails if `input` is not a legal cube in the notation it was read as.
pub fn parse_cube(input: &str) -> Result<CubeState, SolveError> {
    let input = input.trim();
    if input.len() == NUM_FACELETS && !input.contains(char::is_whitespace) {
        Ok(facelet::decode(input)?)
    } else {
        Ok(singmaster::parse_singmaster(input)?)
    }
}

/// Solve every input across `threads` workers. `on_result` sees each result
/// exactly once, in input order, as soon as every earlier input has been
/// reported. A failed input is reported and does not stop the batch.
///
/// # Errors
///
/// Fails only if a worker thread panics.
pub fn solve_batch<I, F>(
    engine: &SolverEngine,
    inputs: I,
    threads: usize,
    mut on_result: F,
) -> Result<(), SolveError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
    F: FnMut(usize, Result<Solution, SolveError>),
{
    let (job_tx, job_rx) = channel::unbounded::<(usize, String)>();
    let mut total = 0;
    for (index, input) in inputs.into_iter().enumerate() {
        // The receiver is alive until the end of this function
        let _ = job_tx.send((index, input.as_ref().to_owned()));
        total += 1;
    }
    drop(job_tx);
    info!(start!("Solving {} cubes on {} threads"), total, threads.max(1));

    let (result_tx, result_rx) = channel::unbounded();
    let scope_result = crossbeam::thread::scope(|s| {
        for _ in 0..threads.max(1) {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            s.spawn(move |_| {
                for (index, input) in job_rx {
                    let result = parse_cube(&input).and_then(|state| engine.solve(&state));
                    if result_tx.send((index, result)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(result_tx);

        let mut pending = BTreeMap::new();
        let mut next = 0;
        for (index, result) in result_rx {
            pending.insert(index, result);
            while let Some(result) = pending.remove(&next) {
                if let Err(e) = &result {
                    warn!("Cube {next} failed: {e}");
                }
                on_result(next, result);
                next += 1;
            }
            if !pending.is_empty() {
                debug!("{} results waiting on cube {next}", pending.len());
            }
        }
        next
    });

    let reported = scope_result.map_err(|_| SolveError::SearchPanicked)?;
    if reported != total {
        return Err(SolveError::SearchPanicked);
    }
    info!(success!("Solved batch of {}"), total);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{facelet::encode, moves::parse_moves, singmaster::to_singmaster};

    #[test]
    fn test_parse_cube_detects_notation() {
        let state = CubeState::SOLVED.apply_moves(&parse_moves("R U F'").unwrap());
        assert_eq!(parse_cube(&encode(&state)).unwrap(), state);
        assert_eq!(parse_cube(&to_singmaster(&state)).unwrap(), state);
        assert_eq!(
            parse_cube(&format!("  {}\n", encode(&state))).unwrap(),
            state
        );
        assert!(matches!(
            parse_cube("UUU"),
            Err(SolveError::Singmaster(_))
        ));
    }
}
