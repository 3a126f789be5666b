//! Balanced distribution of work units across jobs.
//!
//! With `n` units and `J` requested jobs the first `n % J` jobs receive
//! `n / J + 1` units and the rest `n / J`. Fewer units than jobs shrinks the
//! job count to `n`; zero units is [`JobPlan::NothingToDo`].
//!
//! # Examples
//!
//! ```
//! use binsplit_core::chunk::chunk_sizes;
//!
//! assert_eq!(chunk_sizes(10, 3), vec![4, 3, 3]);
//! assert_eq!(chunk_sizes(2, 5), vec![1, 1]);
//! ```

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One job: its 1-based number and the work units (bin indices) it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// 1-based job number.
    pub number: usize,
    /// Work units in processing order.
    pub units: Vec<usize>,
}

/// Ordered jobs covering every requested work unit exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobAssignment {
    /// Jobs in job-number order.
    pub jobs: Vec<Job>,
}

impl JobAssignment {
    /// Number of jobs actually created.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Returns true if no jobs were created.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Number of units in each job.
    pub fn sizes(&self) -> Vec<usize> {
        self.jobs.iter().map(|j| j.units.len()).collect()
    }

    /// All units across jobs, in job order.
    pub fn units(&self) -> impl Iterator<Item = usize> + '_ {
        self.jobs.iter().flat_map(|j| j.units.iter().copied())
    }
}

/// Result of planning a distribution run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobPlan {
    /// Every unit is already done; no jobs are emitted.
    NothingToDo,
    /// Units to hand to external jobs.
    Jobs(JobAssignment),
}

/// Units of `0..num_bins` that are not in `completed`, ascending.
pub fn pending(num_bins: usize, completed: &BTreeSet<usize>) -> Vec<usize> {
    (0..num_bins).filter(|b| !completed.contains(b)).collect()
}

/// Sizes of the chunks for `n` units over at most `jobs` jobs.
///
/// Returns an empty vector when `n == 0` or `jobs == 0`.
pub fn chunk_sizes(n: usize, jobs: usize) -> Vec<usize> {
    if n == 0 || jobs == 0 {
        return Vec::new();
    }
    let jobs = jobs.min(n);
    let base = n / jobs;
    let remainder = n % jobs;
    (0..jobs)
        .map(|j| if j < remainder { base + 1 } else { base })
        .collect()
}

/// Splits `units` into balanced jobs, shuffling first when `rng` is given.
///
/// `jobs` is validated as nonzero at configuration load; a zero here yields
/// [`JobPlan::NothingToDo`].
pub fn assign<R: Rng + ?Sized>(
    mut units: Vec<usize>,
    jobs: usize,
    rng: Option<&mut R>,
) -> JobPlan {
    if units.is_empty() || jobs == 0 {
        return JobPlan::NothingToDo;
    }
    if let Some(rng) = rng {
        units.shuffle(rng);
    }

    let mut rest = units.as_slice();
    let mut out = Vec::new();
    for (i, size) in chunk_sizes(units.len(), jobs).into_iter().enumerate() {
        let (head, tail) = rest.split_at(size);
        out.push(Job {
            number: i + 1,
            units: head.to_vec(),
        });
        rest = tail;
    }
    JobPlan::Jobs(JobAssignment { jobs: out })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn jobs_of(plan: JobPlan) -> JobAssignment {
        match plan {
            JobPlan::Jobs(a) => a,
            JobPlan::NothingToDo => JobAssignment { jobs: Vec::new() },
        }
    }

    #[test]
    fn larger_chunks_come_first() {
        assert_eq!(chunk_sizes(10, 3), vec![4, 3, 3]);
        assert_eq!(chunk_sizes(9, 3), vec![3, 3, 3]);
        assert_eq!(chunk_sizes(11, 4), vec![3, 3, 3, 2]);
    }

    #[test]
    fn unshuffled_assignment_is_contiguous() {
        let a = jobs_of(assign::<StdRng>((0..7).collect(), 3, None));
        assert_eq!(a.jobs[0], Job { number: 1, units: vec![0, 1, 2] });
        assert_eq!(a.jobs[1], Job { number: 2, units: vec![3, 4] });
        assert_eq!(a.jobs[2], Job { number: 3, units: vec![5, 6] });
    }

    #[test]
    fn more_jobs_than_units_shrinks_job_count() {
        let a = jobs_of(assign::<StdRng>(vec![4, 9], 5, None));
        assert_eq!(a.sizes(), vec![1, 1]);
    }

    #[test]
    fn no_units_means_nothing_to_do() {
        assert_eq!(assign::<StdRng>(Vec::new(), 4, None), JobPlan::NothingToDo);
    }

    #[test]
    fn shuffle_keeps_sizes_and_coverage() {
        let mut rng = StdRng::seed_from_u64(42);
        let a = jobs_of(assign(pending(20, &BTreeSet::new()), 6, Some(&mut rng)));
        assert_eq!(a.sizes(), vec![4, 4, 3, 3, 3, 3]);
        let mut all: Vec<usize> = a.units().collect();
        all.sort_unstable();
        assert_eq!(all, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn pending_skips_completed_units() {
        let done: BTreeSet<usize> = [0, 2, 5].into_iter().collect();
        assert_eq!(pending(6, &done), vec![1, 3, 4]);
    }
}
